use crate::constants::*;
use crate::Word;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::ToPrimitive;

/// General purpose registers, in ABI order (`x0` through `x31`).
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum Register {
    /// Always zero (writes are discarded).
    Zero,
    /// Return address.
    Ra,
    /// Stack pointer.
    Sp,
    /// Global pointer.
    Gp,
    /// Thread pointer.
    Tp,
    /// Temporary 0.
    T0,
    /// Temporary 1.
    T1,
    /// Temporary 2.
    T2,
    /// Saved 0 / frame pointer.
    S0,
    /// Saved 1.
    S1,
    /// Argument/return 0.
    A0,
    /// Argument/return 1.
    A1,
    /// Argument 2.
    A2,
    /// Argument 3.
    A3,
    /// Argument 4.
    A4,
    /// Argument 5.
    A5,
    /// Argument 6.
    A6,
    /// Argument 7.
    A7,
    /// Saved 2.
    S2,
    /// Saved 3.
    S3,
    /// Saved 4.
    S4,
    /// Saved 5.
    S5,
    /// Saved 6.
    S6,
    /// Saved 7.
    S7,
    /// Saved 8.
    S8,
    /// Saved 9.
    S9,
    /// Saved 10.
    S10,
    /// Saved 11.
    S11,
    /// Temporary 3.
    T3,
    /// Temporary 4.
    T4,
    /// Temporary 5.
    T5,
    /// Temporary 6.
    T6,
}

#[inline]
pub fn enum_to_u32<T: ToPrimitive + Copy>(val: T) -> u32 {
    val.to_u32().unwrap()
}

#[inline]
pub fn register_index(id: Register) -> usize {
    enum_to_u32(id) as usize
}

// Format encoders. Operands are masked to their field widths; range
// checking belongs to the caller, which knows whether a displacement is
// final or a first-pass placeholder.

/// Constructs an R-format instruction.
#[inline]
pub fn r_instruction(
    opcode: u32,
    rd: Register,
    funct3: u32,
    rs1: Register,
    rs2: Register,
    funct7: u32,
) -> Word {
    (opcode & OPCODE_MASK)
        | ((enum_to_u32(rd) << RD_OFFSET) & RD_MASK)
        | ((funct3 << FUNCT3_OFFSET) & FUNCT3_MASK)
        | ((enum_to_u32(rs1) << RS1_OFFSET) & RS1_MASK)
        | ((enum_to_u32(rs2) << RS2_OFFSET) & RS2_MASK)
        | ((funct7 << FUNCT7_OFFSET) & FUNCT7_MASK)
}

/// Constructs an I-format instruction with a sign-extended 12-bit immediate.
#[inline]
pub fn i_instruction(opcode: u32, rd: Register, funct3: u32, rs1: Register, immediate: i32) -> Word {
    (opcode & OPCODE_MASK)
        | ((enum_to_u32(rd) << RD_OFFSET) & RD_MASK)
        | ((funct3 << FUNCT3_OFFSET) & FUNCT3_MASK)
        | ((enum_to_u32(rs1) << RS1_OFFSET) & RS1_MASK)
        | ((immediate as u32) << IMM_I_OFFSET)
}

/// Constructs an S-format instruction; the immediate is split over bits
/// 31:25 and 11:7.
#[inline]
pub fn s_instruction(opcode: u32, funct3: u32, rs1: Register, rs2: Register, immediate: i32) -> Word {
    let imm = immediate as u32;
    (opcode & OPCODE_MASK)
        | ((imm & 0x1F) << RD_OFFSET)
        | ((funct3 << FUNCT3_OFFSET) & FUNCT3_MASK)
        | ((enum_to_u32(rs1) << RS1_OFFSET) & RS1_MASK)
        | ((enum_to_u32(rs2) << RS2_OFFSET) & RS2_MASK)
        | (((imm >> 5) & 0x7F) << FUNCT7_OFFSET)
}

/// Constructs a B-format instruction; `offset` is a byte displacement
/// relative to this instruction, scattered as imm[12|10:5] and imm[4:1|11].
#[inline]
pub fn b_instruction(opcode: u32, funct3: u32, rs1: Register, rs2: Register, offset: i32) -> Word {
    let imm = offset as u32;
    (opcode & OPCODE_MASK)
        | (((imm >> 11) & 0x1) << 7)
        | (((imm >> 1) & 0xF) << 8)
        | ((funct3 << FUNCT3_OFFSET) & FUNCT3_MASK)
        | ((enum_to_u32(rs1) << RS1_OFFSET) & RS1_MASK)
        | ((enum_to_u32(rs2) << RS2_OFFSET) & RS2_MASK)
        | (((imm >> 5) & 0x3F) << FUNCT7_OFFSET)
        | (((imm >> 12) & 0x1) << 31)
}

/// Constructs a U-format instruction from the upper 20-bit value (the
/// quantity that lands in bits 31:12).
#[inline]
pub fn u_instruction(opcode: u32, rd: Register, upper: i32) -> Word {
    (opcode & OPCODE_MASK)
        | ((enum_to_u32(rd) << RD_OFFSET) & RD_MASK)
        | ((upper as u32) << IMM_U_OFFSET)
}

/// Constructs a J-format instruction; `offset` is a byte displacement
/// relative to this instruction, scattered as imm[20|10:1|11|19:12].
#[inline]
pub fn j_instruction(opcode: u32, rd: Register, offset: i32) -> Word {
    let imm = offset as u32;
    (opcode & OPCODE_MASK)
        | ((enum_to_u32(rd) << RD_OFFSET) & RD_MASK)
        | (imm & 0x000F_F000)
        | (((imm >> 11) & 0x1) << 20)
        | (((imm >> 1) & 0x3FF) << 21)
        | (((imm >> 20) & 0x1) << 31)
}

/// `rd = rs1 + immediate`.
#[inline]
pub fn addi(rd: Register, rs1: Register, immediate: i32) -> Word {
    i_instruction(OPCODE_OP_IMM, rd, FUNCT3_ADDI, rs1, immediate)
}

/// `rd = rs1 + rs2`.
#[inline]
pub fn add(rd: Register, rs1: Register, rs2: Register) -> Word {
    r_instruction(OPCODE_OP, rd, FUNCT3_ADD, rs1, rs2, FUNCT7_BASE)
}

/// `rd = rs1 * rs2` (low 32 bits).
#[inline]
pub fn mul(rd: Register, rs1: Register, rs2: Register) -> Word {
    r_instruction(OPCODE_OP, rd, FUNCT3_MUL, rs1, rs2, FUNCT7_MULDIV)
}

/// `rd = upper << 12`.
#[inline]
pub fn lui(rd: Register, upper: i32) -> Word {
    u_instruction(OPCODE_LUI, rd, upper)
}

/// `rd = pc + (upper << 12)`.
#[inline]
pub fn auipc(rd: Register, upper: i32) -> Word {
    u_instruction(OPCODE_AUIPC, rd, upper)
}

/// `rd = memory[rs1 + offset]` (32-bit word).
#[inline]
pub fn lw(rd: Register, rs1: Register, offset: i32) -> Word {
    i_instruction(OPCODE_LOAD, rd, FUNCT3_LW, rs1, offset)
}

/// `memory[rs1 + offset] = rs2` (32-bit word).
#[inline]
pub fn sw(rs2: Register, rs1: Register, offset: i32) -> Word {
    s_instruction(OPCODE_STORE, FUNCT3_SW, rs1, rs2, offset)
}

/// `rd = pc + 4; pc += offset`.
#[inline]
pub fn jal(rd: Register, offset: i32) -> Word {
    j_instruction(OPCODE_JAL, rd, offset)
}

/// `rd = pc + 4; pc = (rs1 + offset) & !1`.
#[inline]
pub fn jalr(rd: Register, rs1: Register, offset: i32) -> Word {
    i_instruction(OPCODE_JALR, rd, FUNCT3_JALR, rs1, offset)
}

/// `if rs1 == rs2 { pc += offset }`.
#[inline]
pub fn beq(rs1: Register, rs2: Register, offset: i32) -> Word {
    b_instruction(OPCODE_BRANCH, FUNCT3_BEQ, rs1, rs2, offset)
}

/// `if rs1 >= rs2 { pc += offset }` (unsigned comparison).
#[inline]
pub fn bgeu(rs1: Register, rs2: Register, offset: i32) -> Word {
    b_instruction(OPCODE_BRANCH, FUNCT3_BGEU, rs1, rs2, offset)
}

/// Trap to the host.
#[inline]
pub fn ebreak() -> Word {
    i_instruction(
        OPCODE_SYSTEM,
        Register::Zero,
        FUNCT3_PRIV,
        Register::Zero,
        FUNCT12_EBREAK as i32,
    )
}

/// `pc = ra`.
#[inline]
pub fn ret() -> Word {
    jalr(Register::Zero, Register::Ra, 0)
}
