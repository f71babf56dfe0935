//! RV32IM support for the Vera toolchain: instruction constants, encoders
//! for the emitted subset, field-level decoding, and a small simulator
//! that executes a raw memory image loaded at address zero.

pub mod constants;
pub mod decode;
pub mod encode;
pub mod simulator;

pub type Word = u32;

pub type Endian = byteorder::LittleEndian;

pub use encode::Register;
pub use simulator::{Processor, StopCause};
