use crate::constants;
use crate::decode::{self, Opcode};
use crate::encode::{register_index, Register};
use crate::{Endian, Word};
use byteorder::ByteOrder;

/// Why the processor stopped.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StopCause {
    /// EBREAK was executed; control returns to the host.
    Break,
    /// Opcode or funct fields were not recognized.
    InvalidInstruction(Word),
    /// Load or store touched memory outside the image or off a word
    /// boundary.
    BadMemoryAccess(u32),
    /// Instruction fetch left the image.
    BadJump(u32),
    /// Jump target was not aligned to a word boundary.
    BadAlignment(u32),
}

enum TickResult {
    Next,
    Jump(u32),
    Stop(StopCause),
}

/// A bare RV32IM hart executing against a flat byte image mapped at
/// address zero. The image is both code and data; execution starts at
/// whatever the program counter holds and continues until a stop cause.
pub struct Processor {
    registers: [u32; constants::REGISTER_COUNT],
    program_counter: u32,
}

impl Default for Processor {
    fn default() -> Processor {
        Processor::new()
    }
}

impl Processor {
    pub fn new() -> Processor {
        Processor {
            registers: [0; constants::REGISTER_COUNT],
            program_counter: 0,
        }
    }

    pub fn zero_registers(&mut self) {
        self.registers = [0; constants::REGISTER_COUNT];
    }

    pub fn register(&self, id: Register) -> u32 {
        self.registers[register_index(id)]
    }

    pub fn set_register(&mut self, id: Register, value: u32) {
        self.write_register(register_index(id), value);
    }

    pub fn program_counter(&self) -> u32 {
        self.program_counter
    }

    pub fn set_program_counter(&mut self, pc: u32) {
        self.program_counter = pc;
    }

    /// Runs until the program traps or faults.
    pub fn run(&mut self, memory: &mut [u8]) -> StopCause {
        loop {
            let pc = self.program_counter;
            let instr = match read_word(memory, pc) {
                Some(word) => word,
                None => return StopCause::BadJump(pc),
            };

            match self.tick(instr, pc, memory) {
                TickResult::Next => {
                    self.program_counter = pc.wrapping_add(constants::WORD_BYTES);
                }
                TickResult::Jump(target) => {
                    if target % constants::WORD_BYTES != 0 {
                        return StopCause::BadAlignment(target);
                    }
                    self.program_counter = target;
                }
                TickResult::Stop(cause) => return cause,
            }
        }
    }

    fn tick(&mut self, instr: Word, pc: u32, memory: &mut [u8]) -> TickResult {
        let opcode = match decode::opcode(instr) {
            Some(opcode) => opcode,
            None => return TickResult::Stop(StopCause::InvalidInstruction(instr)),
        };

        let rd = decode::rd(instr);
        let rs1 = self.registers[decode::rs1(instr)];
        let rs2 = self.registers[decode::rs2(instr)];
        let funct3 = decode::funct3(instr);

        match opcode {
            Opcode::Lui => {
                self.write_register(rd, decode::u_immediate(instr) as u32);
                TickResult::Next
            }

            Opcode::Auipc => {
                self.write_register(rd, pc.wrapping_add(decode::u_immediate(instr) as u32));
                TickResult::Next
            }

            Opcode::OpImm => match funct3 {
                constants::FUNCT3_ADDI => {
                    self.write_register(rd, rs1.wrapping_add(decode::i_immediate(instr) as u32));
                    TickResult::Next
                }
                _ => TickResult::Stop(StopCause::InvalidInstruction(instr)),
            },

            Opcode::Op => match (funct3, decode::funct7(instr)) {
                (constants::FUNCT3_ADD, constants::FUNCT7_BASE) => {
                    self.write_register(rd, rs1.wrapping_add(rs2));
                    TickResult::Next
                }
                (constants::FUNCT3_MUL, constants::FUNCT7_MULDIV) => {
                    self.write_register(rd, rs1.wrapping_mul(rs2));
                    TickResult::Next
                }
                _ => TickResult::Stop(StopCause::InvalidInstruction(instr)),
            },

            Opcode::Load => match funct3 {
                constants::FUNCT3_LW => {
                    let address = rs1.wrapping_add(decode::i_immediate(instr) as u32);
                    match read_word(memory, address) {
                        Some(value) => {
                            self.write_register(rd, value);
                            TickResult::Next
                        }
                        None => TickResult::Stop(StopCause::BadMemoryAccess(address)),
                    }
                }
                _ => TickResult::Stop(StopCause::InvalidInstruction(instr)),
            },

            Opcode::Store => match funct3 {
                constants::FUNCT3_SW => {
                    let address = rs1.wrapping_add(decode::s_immediate(instr) as u32);
                    if write_word(memory, address, rs2) {
                        TickResult::Next
                    } else {
                        TickResult::Stop(StopCause::BadMemoryAccess(address))
                    }
                }
                _ => TickResult::Stop(StopCause::InvalidInstruction(instr)),
            },

            Opcode::Branch => {
                let taken = match funct3 {
                    constants::FUNCT3_BEQ => rs1 == rs2,
                    constants::FUNCT3_BGEU => rs1 >= rs2,
                    _ => return TickResult::Stop(StopCause::InvalidInstruction(instr)),
                };
                if taken {
                    TickResult::Jump(pc.wrapping_add(decode::b_immediate(instr) as u32))
                } else {
                    TickResult::Next
                }
            }

            Opcode::Jal => {
                self.write_register(rd, pc.wrapping_add(constants::WORD_BYTES));
                TickResult::Jump(pc.wrapping_add(decode::j_immediate(instr) as u32))
            }

            Opcode::Jalr => {
                let target = rs1.wrapping_add(decode::i_immediate(instr) as u32) & !1;
                self.write_register(rd, pc.wrapping_add(constants::WORD_BYTES));
                TickResult::Jump(target)
            }

            Opcode::System => {
                if funct3 == constants::FUNCT3_PRIV
                    && decode::i_immediate(instr) as u32 == constants::FUNCT12_EBREAK
                {
                    TickResult::Stop(StopCause::Break)
                } else {
                    TickResult::Stop(StopCause::InvalidInstruction(instr))
                }
            }
        }
    }

    fn write_register(&mut self, id: usize, value: u32) {
        if id != register_index(Register::Zero) {
            self.registers[id] = value;
        }
    }
}

fn read_word(memory: &[u8], address: u32) -> Option<Word> {
    let start = address as usize;
    let end = start.checked_add(constants::WORD_BYTES as usize)?;
    if address % constants::WORD_BYTES != 0 || end > memory.len() {
        return None;
    }
    Some(Endian::read_u32(&memory[start..end]))
}

fn write_word(memory: &mut [u8], address: u32, value: Word) -> bool {
    let start = address as usize;
    let end = match start.checked_add(constants::WORD_BYTES as usize) {
        Some(end) => end,
        None => return false,
    };
    if address % constants::WORD_BYTES != 0 || end > memory.len() {
        return false;
    }
    Endian::write_u32(&mut memory[start..end], value);
    true
}
