use thiserror::Error as ThisError;

use crate::parse::ParseError;
use crate::CompileError;

/// Unified error type covering parsing, compilation, and I/O.
///
/// Returned by convenience methods like
/// [`Rulebook::load_dsl()`](crate::Rulebook::load_dsl) and
/// [`Rulebook::load_file()`](crate::Rulebook::load_file).
#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
