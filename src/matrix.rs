//! Position-specific scoring matrices and the sequence scorer.
//!
//! A [`ScoreMatrix`] holds one row per alphabet symbol and one column per
//! sequence position. Entries are probabilities or frequencies and must be
//! strictly positive: scores are `log2` of a product of entries, computed
//! here as a sum of cached per-entry logarithms in column order.

use indexmap::IndexSet;
use std::fmt;

use crate::error::{PssmError, Result};

/// Ordered set of single-byte symbols; row `i` of a matrix is symbol `i`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: IndexSet<u8>,
}

impl Alphabet {
    pub fn new<I: IntoIterator<Item = u8>>(symbols: I) -> Result<Self> {
        let mut set = IndexSet::new();
        for symbol in symbols {
            if !set.insert(symbol) {
                return Err(PssmError::DuplicateSymbol(symbol as char));
            }
        }
        Ok(Alphabet { symbols: set })
    }

    /// Build from a string where every byte is one symbol, e.g. `"ACDEFGHIKLMNPQRSTVWY"`
    pub fn from_symbols(symbols: &str) -> Result<Self> {
        Self::new(symbols.bytes())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol stored at `row`
    pub fn symbol(&self, row: usize) -> u8 {
        self.symbols[row]
    }

    /// Row index of `symbol`, if present
    pub fn row_of(&self, symbol: u8) -> Option<usize> {
        self.symbols.get_index_of(&symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.symbols.iter().copied()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in self.iter() {
            write!(f, "{}", symbol as char)?;
        }
        Ok(())
    }
}

/// Rectangular table of strictly positive scores, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
    log2: Vec<f64>,
}

impl ScoreMatrix {
    /// Build a matrix from its rows.
    ///
    /// Fails on an empty or ragged table and on any entry that is zero,
    /// negative or not finite.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let columns = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.is_empty() || columns == 0 {
            return Err(PssmError::ShapeMismatch(
                "matrix must have at least one row and one column".to_string(),
            ));
        }

        let mut values = Vec::with_capacity(rows.len() * columns);
        for (row, entries) in rows.iter().enumerate() {
            if entries.len() != columns {
                return Err(PssmError::ShapeMismatch(format!(
                    "row {row} has {} columns, expected {columns}",
                    entries.len()
                )));
            }
            for (column, &value) in entries.iter().enumerate() {
                if !(value.is_finite() && value > 0.0) {
                    return Err(PssmError::NonPositiveEntry { row, column, value });
                }
                values.push(value);
            }
        }

        let log2 = values.iter().map(|v| v.log2()).collect();
        Ok(ScoreMatrix {
            rows: rows.len(),
            columns,
            values,
            log2,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[row * self.columns + column]
    }

    /// `log2` of the entry, precomputed at construction
    pub fn log2(&self, row: usize, column: usize) -> f64 {
        self.log2[row * self.columns + column]
    }

    /// Entries of one column, in row order
    pub fn column(&self, column: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows).map(move |row| self.get(row, column))
    }
}

/// Score `sequence` against `matrix`: `log2` of the product of one entry per column.
pub fn sequence_score(matrix: &ScoreMatrix, alphabet: &Alphabet, sequence: &[u8]) -> Result<f64> {
    if sequence.len() != matrix.columns() {
        return Err(PssmError::LengthMismatch {
            expected: matrix.columns(),
            found: sequence.len(),
        });
    }

    let mut score = 0.0;
    for (column, &symbol) in sequence.iter().enumerate() {
        let row = alphabet.row_of(symbol).ok_or(PssmError::InvalidSymbol {
            symbol: symbol as char,
            position: column,
        })?;
        score += matrix.log2(row, column);
    }
    Ok(score)
}

/// A named matrix together with its alphabet and position labels
#[derive(Debug, Clone)]
pub struct Pssm {
    name: String,
    positions: Vec<String>,
    alphabet: Alphabet,
    matrix: ScoreMatrix,
}

impl Pssm {
    pub fn new(name: impl Into<String>, alphabet: Alphabet, matrix: ScoreMatrix) -> Result<Self> {
        if alphabet.len() != matrix.rows() {
            return Err(PssmError::ShapeMismatch(format!(
                "alphabet has {} symbols but matrix has {} rows",
                alphabet.len(),
                matrix.rows()
            )));
        }
        let positions = default_positions(matrix.columns());
        Ok(Pssm {
            name: name.into(),
            positions,
            alphabet,
            matrix,
        })
    }

    /// Replace the position labels (one per column)
    pub fn with_positions(mut self, positions: Vec<String>) -> Result<Self> {
        if positions.len() != self.matrix.columns() {
            return Err(PssmError::ShapeMismatch(format!(
                "{} position labels for {} columns",
                positions.len(),
                self.matrix.columns()
            )));
        }
        self.positions = positions;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[String] {
        &self.positions
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn matrix(&self) -> &ScoreMatrix {
        &self.matrix
    }

    /// Sequence length this matrix scores
    pub fn width(&self) -> usize {
        self.matrix.columns()
    }

    pub fn score(&self, sequence: &str) -> Result<f64> {
        self.score_bytes(sequence.as_bytes())
    }

    pub fn score_bytes(&self, sequence: &[u8]) -> Result<f64> {
        sequence_score(&self.matrix, &self.alphabet, sequence)
    }
}

/// Relative position labels centred on the phosphosite: `-5..4` for ten columns
fn default_positions(columns: usize) -> Vec<String> {
    let center = (columns / 2) as i64;
    (0..columns as i64).map(|c| (c - center).to_string()).collect()
}
