use crate::codegen::CodegenError;
use crate::parser::Rule;
use pest::error::Error as PestError;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    Parse(PestError<Rule>),
    Codegen(CodegenError),
}

impl From<PestError<Rule>> for Error {
    fn from(err: PestError<Rule>) -> Error {
        Error::Parse(err)
    }
}

impl From<CodegenError> for Error {
    fn from(err: CodegenError) -> Error {
        Error::Codegen(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{}", err),
            Error::Codegen(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}
