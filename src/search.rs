use anyhow::{Context, Result};
use log::{info, warn};
use std::io::Write;

use crate::enumerator::{Enumerator, SearchConfig, StopReason};
use crate::panel::{Group, KinasePanel};
use crate::range::{RangeConfig, ScoreRange};

/// Caller policy deciding how many peptides to pull from the enumerator
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    /// Maximum number of valid peptides to report
    pub max_hits: usize,
    /// Stop at the first peptide scoring past this value (below it when
    /// searching for the highest scores, above it for the lowest)
    pub score_threshold: Option<f64>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_hits: 1000,
            score_threshold: None,
        }
    }
}

/// Score of one candidate against one panel member
#[derive(Debug, Clone)]
pub struct MemberScore {
    pub kinase: String,
    pub group: Group,
    pub score: f64,
    pub range: ScoreRange,
}

/// A target peptide and how every panel member scores it
#[derive(Debug, Clone)]
pub struct SensorCandidate {
    /// 1-based position in enumeration order
    pub rank: usize,
    pub sequence: String,
    pub scores: Vec<MemberScore>,
}

impl SensorCandidate {
    /// Score against the target matrix
    pub fn target_score(&self) -> f64 {
        self.scores[0].score
    }
}

/// Enumerate sensor peptides for a panel's target and score them across the panel
pub struct SensorSearch<'a> {
    panel: &'a KinasePanel,
    config: SearchConfig,
    limits: SearchLimits,
    range_config: RangeConfig,
}

impl<'a> SensorSearch<'a> {
    pub fn new(panel: &'a KinasePanel, config: SearchConfig) -> Self {
        let range_config = RangeConfig::default().with_rules(config.rules.clone());
        SensorSearch {
            panel,
            config,
            limits: SearchLimits::default(),
            range_config,
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_probe_limit(mut self, probe_limit: usize) -> Self {
        self.range_config.probe_limit = probe_limit;
        self
    }

    pub fn run(&self) -> Result<Vec<SensorCandidate>> {
        let ranges = self.panel.ranges(&self.range_config)?;
        let members: Vec<_> = self.panel.members().zip(ranges).collect();

        let direction = self.config.direction;
        let mut search = Enumerator::new(self.panel.target(), self.config.clone())?;
        let mut candidates = Vec::new();

        for hit in search.by_ref().take(self.limits.max_hits) {
            if let Some(threshold) = self.limits.score_threshold {
                if direction.is_past(hit.score, threshold) {
                    info!("Score {:.4} passed threshold {threshold}, stopping", hit.score);
                    break;
                }
            }

            let scores = members
                .iter()
                .map(|&((group, pssm), range)| -> Result<MemberScore> {
                    let score = pssm.score(&hit.sequence).with_context(|| {
                        format!("Failed to score {} against '{}'", hit.sequence, pssm.name())
                    })?;
                    Ok(MemberScore {
                        kinase: pssm.name().to_string(),
                        group,
                        score,
                        range,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            candidates.push(SensorCandidate {
                rank: candidates.len() + 1,
                sequence: hit.sequence,
                scores,
            });
        }

        if search.stop_reason() == Some(StopReason::Exhausted)
            && candidates.len() < self.limits.max_hits
        {
            warn!(
                "Only {} valid peptides exist for '{}'",
                candidates.len(),
                self.panel.target().name()
            );
        }
        info!(
            "Reported {} peptides for '{}' ({} states expanded, {} visited)",
            candidates.len(),
            self.panel.target().name(),
            search.expanded(),
            search.visited()
        );

        Ok(candidates)
    }
}

/// Write candidates as delimited text, one row per (candidate, panel member)
pub fn write_report<W: Write>(
    candidates: &[SensorCandidate],
    writer: &mut W,
    delimiter: char,
) -> Result<()> {
    let header = [
        "rank",
        "sequence",
        "kinase",
        "group",
        "score",
        "min",
        "max",
        "range",
        "normalized",
    ];
    writeln!(writer, "{}", header.join(&delimiter.to_string()))?;

    let d = delimiter;
    for candidate in candidates {
        for member in &candidate.scores {
            writeln!(
                writer,
                "{}{d}{}{d}{}{d}{}{d}{:.6}{d}{:.6}{d}{:.6}{d}{:.6}{d}{:.6}",
                candidate.rank,
                candidate.sequence,
                member.kinase,
                member.group,
                member.score,
                member.range.min,
                member.range.max,
                member.range.span(),
                member.range.normalize(member.score),
            )?;
        }
    }
    Ok(())
}
