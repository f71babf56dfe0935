//! Two-pass RV32IM emitter.
//!
//! The image starts with a jump over the register words to the first
//! rule, then one 32-bit word per register holding its initial value,
//! then the matcher/rewrite code for every rule with a non-empty LHS,
//! then the shared `end` label with `EBREAK` and `RET`.
//!
//! Pass 1 runs with every label at zero; since no pseudo-op changes
//! length based on its operands, it lays down the correct byte offsets
//! for all three label tables. Pass 2 re-emits the same shape with
//! resolved displacements, overwriting the label tables in place, so a
//! further pass is byte-identical.

use crate::initial::initial_registers;
use crate::pool::{FactSide, Obj, Pool, RuleView};
use byteorder::ByteOrder;
use rv32::constants::WORD_BYTES;
use rv32::encode::{self, Register};
use rv32::Endian;
use std::fmt;

pub const DEFAULT_MAX_IMAGE_SIZE: usize = 1 << 20;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CodegenError {
    /// The image would exceed the host-supplied size bound.
    Overflow { max_size: usize },
    /// A displacement or immediate does not fit its instruction field.
    ImmediateOutOfRange { value: i64 },
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CodegenError::Overflow { max_size } => {
                write!(f, "Image exceeds the maximum size of {} bytes", max_size)
            }
            CodegenError::ImmediateOutOfRange { value } => {
                write!(f, "Immediate {} does not fit its instruction field", value)
            }
        }
    }
}

pub struct Emitter<'p, 's> {
    pool: &'p Pool<'s>,
    register_count: u32,
    initial: Vec<u32>,
    max_size: usize,
    out: Vec<u8>,
    final_pass: bool,
    /// Byte offset of every register word.
    register_labels: Vec<u32>,
    /// Byte offset of every rule's prologue; the last entry is the `end`
    /// label and is reserved up front so fail branches can consult it
    /// before it is bound.
    rule_labels: Vec<u32>,
    /// One label per emitted LHS min-update branch, across all rules.
    skip_labels: Vec<u32>,
    skip_cursor: usize,
}

impl<'p, 's> Emitter<'p, 's> {
    /// The pool must already be interned; `register_count` is the value
    /// returned by interning.
    pub fn new(pool: &'p Pool<'s>, register_count: u32, max_size: usize) -> Emitter<'p, 's> {
        Emitter {
            pool,
            register_count,
            initial: initial_registers(pool, register_count),
            max_size,
            out: Vec::new(),
            final_pass: false,
            register_labels: vec![0; register_count as usize],
            rule_labels: vec![0; pool.rules().count() + 1],
            skip_labels: Vec::new(),
            skip_cursor: 0,
        }
    }

    /// Assembles the image: one length-establishing pass, one resolving
    /// pass.
    pub fn emit(mut self) -> Result<Vec<u8>, CodegenError> {
        self.run_pass(false)?;
        self.run_pass(true)?;
        Ok(self.out)
    }

    pub(crate) fn run_pass(&mut self, final_pass: bool) -> Result<(), CodegenError> {
        self.final_pass = final_pass;
        self.out.clear();
        self.skip_cursor = 0;

        // Execution begins at offset 0; hop over the register words.
        self.emit_jal_to(Register::Zero, self.rule_labels[0])?;

        for index in 0..self.register_labels.len() {
            self.register_labels[index] = self.here();
            let value = self.initial[index];
            self.emit_word(value)?;
        }

        let pool = self.pool;
        for (index, rule) in pool.rules().enumerate() {
            self.rule_labels[index] = self.here();
            if rule.lhs.is_empty() {
                // Initial-condition rule; its whole effect is already in
                // the register words.
                continue;
            }
            self.emit_rule(index, rule)?;
        }

        let last = self.rule_labels.len() - 1;
        self.rule_labels[last] = self.here();
        self.emit_instr(encode::ebreak())?;
        self.emit_instr(encode::ret())
    }

    fn emit_rule(&mut self, index: usize, rule: RuleView<'p, 's>) -> Result<(), CodegenError> {
        let fail = self.rule_labels[index + 1];

        // The running minimum starts at the largest unsigned value.
        self.emit_instr(encode::addi(Register::T1, Register::Zero, -1))?;

        let mut matched = Vec::new();
        for obj in rule.lhs {
            let (register, _) = lhs_fact(obj);
            if matched.contains(&register) {
                // Set semantics: one occurrence per register is matched.
                continue;
            }
            matched.push(register);

            self.emit_load(Register::T0, register)?;
            self.emit_instr(encode::addi(Register::T2, Register::Zero, 0))?;
            self.emit_beq(Register::T0, Register::T2, fail)?;
            let skip = self.skip_label_value();
            self.emit_bgeu(Register::T0, Register::T1, skip)?;
            self.emit_instr(encode::addi(Register::T1, Register::T0, 0))?;
            self.bind_skip_label();
        }

        // All facts present; t1 holds min(register[L_i]).
        let diffs = rule_diffs(&rule, self.register_count);
        for (register, &diff) in diffs.iter().enumerate() {
            if diff == 0 {
                continue;
            }
            self.emit_load(Register::T0, register as u32)?;
            self.emit_diff(Register::T2, diff)?;
            self.emit_instr(encode::mul(Register::T2, Register::T2, Register::T1))?;
            self.emit_instr(encode::add(Register::T0, Register::T0, Register::T2))?;
            self.emit_store(Register::T0, Register::T2, register as u32)?;
        }

        self.emit_instr(encode::addi(Register::A0, Register::A0, 1))?;
        let end = self.rule_labels[self.rule_labels.len() - 1];
        self.emit_jal_to(Register::Zero, end)
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.out[..]
    }

    fn here(&self) -> u32 {
        self.out.len() as u32
    }

    fn emit_word(&mut self, word: u32) -> Result<(), CodegenError> {
        if self.out.len() + WORD_BYTES as usize > self.max_size {
            return Err(CodegenError::Overflow {
                max_size: self.max_size,
            });
        }
        let start = self.out.len();
        self.out.resize(start + WORD_BYTES as usize, 0);
        Endian::write_u32(&mut self.out[start..], word);
        Ok(())
    }

    fn emit_instr(&mut self, word: u32) -> Result<(), CodegenError> {
        self.emit_word(word)
    }

    /// Loads `register[index]` into `rd` through a pc-relative
    /// `AUIPC`/`LW` pair. Always two instructions, whatever the offset.
    fn emit_load(&mut self, rd: Register, index: u32) -> Result<(), CodegenError> {
        let target = self.register_labels[index as usize];
        let (upper, lower) = self.pc_relative(target)?;
        self.emit_instr(encode::auipc(rd, upper))?;
        self.emit_instr(encode::lw(rd, rd, lower))
    }

    /// Stores `rs` into `register[index]`, clobbering `scratch` with the
    /// pc-relative base. Always two instructions.
    fn emit_store(&mut self, rs: Register, scratch: Register, index: u32) -> Result<(), CodegenError> {
        let target = self.register_labels[index as usize];
        let (upper, lower) = self.pc_relative(target)?;
        self.emit_instr(encode::auipc(scratch, upper))?;
        self.emit_instr(encode::sw(rs, scratch, lower))
    }

    // Rounded split keeping the low half inside LW/SW's sign-extended
    // 12-bit immediate.
    fn pc_relative(&self, target: u32) -> Result<(i32, i32), CodegenError> {
        let offset = i64::from(target) - i64::from(self.here());
        let upper = (offset + 0x800) >> 12;
        let lower = offset - (upper << 12);
        if self.final_pass && (upper < -(1 << 19) || upper >= (1 << 19)) {
            return Err(CodegenError::ImmediateOutOfRange { value: offset });
        }
        Ok((upper as i32, lower as i32))
    }

    // Branch and jump displacements are only meaningful on the final
    // pass; pass-1 labels all sit at zero.
    fn branch_displacement(&self, target: u32) -> Result<i32, CodegenError> {
        let displacement = i64::from(target) - i64::from(self.here());
        if self.final_pass && (displacement < -4096 || displacement > 4094) {
            return Err(CodegenError::ImmediateOutOfRange {
                value: displacement,
            });
        }
        Ok(displacement as i32)
    }

    fn emit_beq(&mut self, rs1: Register, rs2: Register, target: u32) -> Result<(), CodegenError> {
        let displacement = self.branch_displacement(target)?;
        self.emit_instr(encode::beq(rs1, rs2, displacement))
    }

    fn emit_bgeu(&mut self, rs1: Register, rs2: Register, target: u32) -> Result<(), CodegenError> {
        let displacement = self.branch_displacement(target)?;
        self.emit_instr(encode::bgeu(rs1, rs2, displacement))
    }

    fn emit_jal_to(&mut self, rd: Register, target: u32) -> Result<(), CodegenError> {
        let displacement = i64::from(target) - i64::from(self.here());
        if self.final_pass && (displacement < -(1 << 20) || displacement > (1 << 20) - 2) {
            return Err(CodegenError::ImmediateOutOfRange {
                value: displacement,
            });
        }
        self.emit_instr(encode::jal(rd, displacement as i32))
    }

    // The signed rewrite quantity is label-independent, so it is checked
    // on every pass.
    fn emit_diff(&mut self, rd: Register, diff: i64) -> Result<(), CodegenError> {
        if diff < -2048 || diff > 2047 {
            return Err(CodegenError::ImmediateOutOfRange { value: diff });
        }
        self.emit_instr(encode::addi(rd, Register::Zero, diff as i32))
    }

    fn skip_label_value(&mut self) -> u32 {
        if self.skip_cursor == self.skip_labels.len() {
            self.skip_labels.push(0);
        }
        self.skip_labels[self.skip_cursor]
    }

    fn bind_skip_label(&mut self) {
        self.skip_labels[self.skip_cursor] = self.here();
        self.skip_cursor += 1;
    }
}

fn lhs_fact(obj: &Obj) -> (u32, bool) {
    match *obj {
        Obj::Fact {
            register: Some(register),
            side: FactSide::Lhs { keep },
            ..
        } => (register, keep),
        _ => unreachable!("LHS slices hold interned LHS facts"),
    }
}

fn rhs_fact(obj: &Obj) -> (u32, u32) {
    match *obj {
        Obj::Fact {
            register: Some(register),
            side: FactSide::Rhs { count },
            ..
        } => (register, count),
        _ => unreachable!("RHS slices hold interned RHS facts"),
    }
}

/// Net signed change per register when the rule fires once with a
/// multiplier of one: minus one per distinct consumed LHS fact (the
/// first occurrence's keep flag wins), plus the count of every RHS fact
/// occurrence.
fn rule_diffs(rule: &RuleView, register_count: u32) -> Vec<i64> {
    let mut diffs = vec![0i64; register_count as usize];

    let mut seen = Vec::new();
    for obj in rule.lhs {
        let (register, keep) = lhs_fact(obj);
        if seen.contains(&register) {
            continue;
        }
        seen.push(register);
        if !keep {
            diffs[register as usize] -= 1;
        }
    }

    for obj in rule.rhs {
        let (register, count) = rhs_fact(obj);
        diffs[register as usize] += i64::from(count);
    }

    diffs
}
