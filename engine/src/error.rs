//! FILENAME: engine/src/error.rs

use thiserror::Error;

use crate::formula::FormulaParseError;
use crate::position::Position;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid cell position: {0}")]
    InvalidPosition(Position),

    #[error("setting {0} would create a circular reference")]
    CircularDependency(Position),

    #[error("formula error: {0}")]
    Formula(#[from] FormulaParseError),
}
