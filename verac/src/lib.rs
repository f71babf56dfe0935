//! Host side of the Vera break-instruction convention: drive a compiled
//! image through evaluation passes until no rule fires.

use rv32::{Processor, Register, StopCause};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    Compile(vera::Error),
    /// The program stopped for something other than EBREAK.
    Stopped(StopCause),
    /// Rules were still firing when the pass bound was reached.
    DidNotSettle { passes: u32 },
}

impl From<vera::Error> for Error {
    fn from(err: vera::Error) -> Error {
        Error::Compile(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Compile(err) => write!(f, "{}", err),
            Error::Stopped(cause) => write!(f, "Program stopped: {:?}", cause),
            Error::DidNotSettle { passes } => {
                write!(f, "Program still firing rules after {} passes", passes)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Evaluation passes executed, including the final quiescent one.
    pub passes: u32,
    /// Rules fired in total.
    pub fired: u32,
}

/// Runs an image loaded at address 0 until a pass fires no rule. After
/// each `EBREAK`, `a0` holds the rules fired since the previous one; the
/// break handler clears it and resumes at PC 0 while it is non-zero.
pub fn run_image(memory: &mut [u8], max_passes: u32) -> Result<RunSummary, Error> {
    let mut processor = Processor::new();
    let mut fired = 0u32;
    let mut passes = 0u32;

    while passes < max_passes {
        processor.set_program_counter(0);
        match processor.run(memory) {
            StopCause::Break => {
                passes += 1;
                let pass_fired = processor.register(Register::A0);
                if pass_fired == 0 {
                    return Ok(RunSummary { passes, fired });
                }
                fired += pass_fired;
                processor.set_register(Register::A0, 0);
            }
            cause => return Err(Error::Stopped(cause)),
        }
    }

    Err(Error::DidNotSettle { passes })
}

/// Compiles a source and runs it to quiescence, returning the summary
/// and the final register values (in register order).
pub fn compile_and_run(
    source: &str,
    ports: &[&str],
    max_passes: u32,
) -> Result<(vera::Image, RunSummary, Vec<u32>), Error> {
    let image = vera::compile(source, ports)?;
    let mut memory = image.bytes().to_vec();
    let summary = run_image(&mut memory, max_passes)?;

    let values = (0..image.register_count())
        .map(|index| vera::register_value(&memory, index))
        .collect();

    Ok((image, summary, values))
}
