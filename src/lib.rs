//! Compiler for the Vera rule language.
//!
//! A Vera program is a set of rewrite rules over *facts*: free-form,
//! possibly multi-word symbols. The first non-whitespace character of the
//! source is the delimiter for the whole program; each rule is
//! `DELIM lhs DELIM rhs`, and each side is a comma-separated (possibly
//! empty) list of facts:
//!
//! ```text
//! || sugar
//! || apples : 2
//! | apples, sugar | apple cake
//! | heat?, apple cake | baked apple cake
//! ```
//!
//! Spelling is whitespace-insensitive: `apple cake` and `apple   cake`
//! name the same fact. Every distinct fact owns one 32-bit unsigned
//! register counting how many of it exist.
//!
//! * A rule with an empty LHS is an initial condition: its RHS counts are
//!   added to the register image at compile time.
//! * An LHS fact suffixed `?` is required but not consumed.
//! * An RHS fact may carry `: N` (decimal, `0x`, `0o` or `0b`), producing
//!   `N` per matched unit; counts default to 1.
//!
//! A rule fires when every LHS register is non-zero. The smallest of
//! those registers is the multiplier: consumed facts lose that many
//! units and each RHS fact gains `N * multiplier`.
//!
//! [`compile`] turns a source into a raw RV32IM memory image for a
//! machine with RAM at address zero. Word 0 jumps over the register
//! words (words `1..=R`) into the rule code. One execution is one
//! evaluation pass: it fires at most one rule, then traps with `EBREAK`
//! leaving the fired-rule count in `a0`. A host runs a program to
//! quiescence by looping passes, clearing `a0` and resetting the PC
//! while rules still fire. Ports named at compile time occupy the lowest
//! registers, where the host can read and write them between passes.

pub mod canon;
mod codegen;
mod error;
mod initial;
mod intern;
mod parser;
mod pool;

#[cfg(test)]
mod test;

use byteorder::ByteOrder;
use rv32::constants::WORD_BYTES;
use rv32::Endian;

pub use codegen::{CodegenError, Emitter, DEFAULT_MAX_IMAGE_SIZE};
pub use error::Error;
pub use initial::initial_registers;
pub use intern::intern_strings;
pub use parser::{parse, Rule, VeraParser};
pub use pool::{FactSide, Obj, Pool, RuleView};

pub type ParseError = pest::error::Error<Rule>;

pub type Result<T> = std::result::Result<T, Error>;

/// A compiled program: the raw memory image plus the canonical spelling
/// of every register, ports first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    bytes: Vec<u8>,
    symbols: Vec<String>,
}

impl Image {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..]
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols[..]
    }

    pub fn register_count(&self) -> u32 {
        self.symbols.len() as u32
    }

    /// The initial value baked into the image for one register.
    pub fn register(&self, index: u32) -> u32 {
        register_value(&self.bytes[..], index)
    }
}

/// Reads `register[index]` out of an image (or out of the RAM of a
/// running one).
pub fn register_value(image: &[u8], index: u32) -> u32 {
    let offset = (WORD_BYTES + index * WORD_BYTES) as usize;
    Endian::read_u32(&image[offset..offset + WORD_BYTES as usize])
}

/// Compiles a source with the default image size bound.
pub fn compile(source: &str, ports: &[&str]) -> Result<Image> {
    compile_bounded(source, ports, DEFAULT_MAX_IMAGE_SIZE)
}

/// Compiles a source, failing with [`CodegenError::Overflow`] if the
/// image would exceed `max_size` bytes.
pub fn compile_bounded(source: &str, ports: &[&str], max_size: usize) -> Result<Image> {
    let mut pool = parser::parse(source, ports)?;
    let register_count = intern::intern_strings(&mut pool);
    let bytes = Emitter::new(&pool, register_count, max_size).emit()?;

    Ok(Image {
        bytes,
        symbols: symbols(&pool, register_count),
    })
}

fn symbols(pool: &Pool, register_count: u32) -> Vec<String> {
    let mut names = vec![String::new(); register_count as usize];

    for obj in pool.objects() {
        if let (Some(text), Some(register)) = (obj.symbol(), obj.register()) {
            let slot = &mut names[register as usize];
            if slot.is_empty() {
                *slot = canon::collapse(text);
            }
        }
    }

    names
}
