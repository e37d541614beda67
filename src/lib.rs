// Library exports for pepsweep
pub mod distribution;
pub mod enumerator;
pub mod error;
pub mod matrix;
pub mod panel;
pub mod pssm_io;
pub mod range;
pub mod rules;
pub mod search;

pub use enumerator::{enumerate, Direction, Enumerator, Hit, SearchConfig, StopReason};
pub use error::PssmError;
pub use matrix::{sequence_score, Alphabet, Pssm, ScoreMatrix};
pub use range::{score_range, score_range_with, RangeConfig, ScoreRange};
pub use rules::{is_valid, SequenceRules};
