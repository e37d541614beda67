use thiserror::Error;

use crate::enumerator::Direction;

/// Errors raised while loading, scoring or searching a PSSM
#[derive(Debug, Error)]
pub enum PssmError {
    #[error("sequence has {found} symbols, matrix expects {expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("invalid matrix shape: {0}")]
    ShapeMismatch(String),

    #[error("symbol '{0}' appears more than once in the alphabet")]
    DuplicateSymbol(char),

    #[error("symbol '{symbol}' at position {position} is not in the alphabet")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("matrix entry at row {row}, column {column} must be positive and finite, got {value}")]
    NonPositiveEntry {
        row: usize,
        column: usize,
        value: f64,
    },

    #[error("no valid sequence found searching for the {direction} score after expanding {expanded} states")]
    ExhaustedSearch { direction: Direction, expanded: usize },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PssmError>;
