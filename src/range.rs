//! Minimum and maximum achievable score of a matrix under the sensor rules.

use log::debug;

use crate::enumerator::{Direction, Enumerator, SearchConfig};
use crate::error::{PssmError, Result};
use crate::matrix::Pssm;
use crate::rules::SequenceRules;

/// Bounds on the range probe
#[derive(Debug, Clone)]
pub struct RangeConfig {
    /// Give up once this many states have been enqueued without a valid peptide
    pub probe_limit: usize,
    pub rules: SequenceRules,
}

impl Default for RangeConfig {
    fn default() -> Self {
        RangeConfig {
            probe_limit: 1_000_000,
            rules: SequenceRules::default(),
        }
    }
}

impl RangeConfig {
    pub fn with_probe_limit(mut self, probe_limit: usize) -> Self {
        self.probe_limit = probe_limit;
        self
    }

    pub fn with_rules(mut self, rules: SequenceRules) -> Self {
        self.rules = rules;
        self
    }
}

/// Lowest and highest score any valid peptide can reach
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `score` within the range, 0.0 at `min` and 1.0 at `max`
    pub fn normalize(&self, score: f64) -> f64 {
        let span = self.span();
        if span > 0.0 {
            (score - self.min) / span
        } else {
            0.0
        }
    }

    pub fn contains(&self, score: f64) -> bool {
        self.min <= score && score <= self.max
    }
}

pub fn score_range(pssm: &Pssm) -> Result<ScoreRange> {
    score_range_with(pssm, &RangeConfig::default())
}

pub fn score_range_with(pssm: &Pssm, config: &RangeConfig) -> Result<ScoreRange> {
    let min = extreme_score(pssm, Direction::Lowest, config)?;
    let max = extreme_score(pssm, Direction::Highest, config)?;
    debug!("Score range of '{}': [{min:.4}, {max:.4}]", pssm.name());
    Ok(ScoreRange { min, max })
}

/// Score of the first valid peptide in `direction`, rescored through the scorer
fn extreme_score(pssm: &Pssm, direction: Direction, config: &RangeConfig) -> Result<f64> {
    let search_config = SearchConfig::new(direction)
        .with_rules(config.rules.clone())
        .with_max_visited(Some(config.probe_limit));
    let mut search = Enumerator::new(pssm, search_config)?;

    match search.next() {
        Some(hit) => pssm.score(&hit.sequence),
        None => Err(PssmError::ExhaustedSearch {
            direction,
            expanded: search.expanded(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{Alphabet, ScoreMatrix};

    /// Cysteine dominates every column, so the only valid peptide is all serine
    fn cysteine_pssm() -> Pssm {
        let alphabet = Alphabet::from_symbols("CS").unwrap();
        let matrix = ScoreMatrix::new(vec![vec![0.9; 10], vec![0.1; 10]]).unwrap();
        Pssm::new("cys", alphabet, matrix).unwrap()
    }

    #[test]
    fn test_range_finds_buried_peptide() {
        let range = score_range(&cysteine_pssm()).unwrap();
        let all_serine = 10.0 * 0.1f64.log2();
        assert!((range.min - all_serine).abs() < 1e-9);
        assert!((range.max - all_serine).abs() < 1e-9);
        assert_eq!(range.span(), 0.0);
        assert_eq!(range.normalize(range.max), 0.0);
    }

    #[test]
    fn test_probe_limit_reports_exhausted_search() {
        let config = RangeConfig::default().with_probe_limit(100);
        let err = score_range_with(&cysteine_pssm(), &config).unwrap_err();
        assert!(matches!(
            err,
            PssmError::ExhaustedSearch {
                direction: Direction::Highest,
                ..
            }
        ));
    }

    #[test]
    fn test_normalize() {
        let range = ScoreRange { min: -10.0, max: -2.0 };
        assert_eq!(range.span(), 8.0);
        assert_eq!(range.normalize(-6.0), 0.5);
        assert!(range.contains(-2.0));
        assert!(!range.contains(-1.0));
    }
}
