pub const WORD_BYTES     : u32 = 4;

pub const REGISTER_COUNT : usize = 32;

// Base opcode map (7-bit opcode field) for the subset in use.
pub const OPCODE_LOAD    : u32 = 0b000_0011;
pub const OPCODE_OP_IMM  : u32 = 0b001_0011;
pub const OPCODE_AUIPC   : u32 = 0b001_0111;
pub const OPCODE_STORE   : u32 = 0b010_0011;
pub const OPCODE_OP      : u32 = 0b011_0011;
pub const OPCODE_LUI     : u32 = 0b011_0111;
pub const OPCODE_BRANCH  : u32 = 0b110_0011;
pub const OPCODE_JALR    : u32 = 0b110_0111;
pub const OPCODE_JAL     : u32 = 0b110_1111;
pub const OPCODE_SYSTEM  : u32 = 0b111_0011;

pub const FUNCT3_ADDI    : u32 = 0b000;
pub const FUNCT3_ADD     : u32 = 0b000;
pub const FUNCT3_MUL     : u32 = 0b000;
pub const FUNCT3_LW      : u32 = 0b010;
pub const FUNCT3_SW      : u32 = 0b010;
pub const FUNCT3_BEQ     : u32 = 0b000;
pub const FUNCT3_BGEU    : u32 = 0b111;
pub const FUNCT3_JALR    : u32 = 0b000;
pub const FUNCT3_PRIV    : u32 = 0b000;

pub const FUNCT7_BASE    : u32 = 0b000_0000;
pub const FUNCT7_MULDIV  : u32 = 0b000_0001;

// funct12 values for SYSTEM instructions.
pub const FUNCT12_ECALL  : u32 = 0;
pub const FUNCT12_EBREAK : u32 = 1;

pub const OPCODE_MASK    : u32 = 0b0000000_00000_00000_000_00000_1111111;
pub const RD_MASK        : u32 = 0b0000000_00000_00000_000_11111_0000000;
pub const FUNCT3_MASK    : u32 = 0b0000000_00000_00000_111_00000_0000000;
pub const RS1_MASK       : u32 = 0b0000000_00000_11111_000_00000_0000000;
pub const RS2_MASK       : u32 = 0b0000000_11111_00000_000_00000_0000000;
pub const FUNCT7_MASK    : u32 = 0b1111111_00000_00000_000_00000_0000000;

pub const RD_OFFSET      : u32 = 7;
pub const FUNCT3_OFFSET  : u32 = 12;
pub const RS1_OFFSET     : u32 = 15;
pub const RS2_OFFSET     : u32 = 20;
pub const FUNCT7_OFFSET  : u32 = 25;
pub const IMM_I_OFFSET   : u32 = 20;
pub const IMM_U_OFFSET   : u32 = 12;
