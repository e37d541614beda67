//! Per-kinase score distribution of a fixed set of peptides.
//!
//! Produces the flat `(kinase, sequence, score, group)` table a plotting
//! tool consumes to compare the target against sub-targets and background.

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::io::Write;

use crate::panel::{Group, KinasePanel};

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRow {
    pub kinase: String,
    pub sequence: String,
    pub score: f64,
    pub group: Group,
}

/// Score every sequence against every panel member.
///
/// Rows are grouped by sequence, in input order; within a sequence the
/// target comes first, then sub-targets, then background.
pub fn score_distribution(panel: &KinasePanel, sequences: &[String]) -> Result<Vec<DistributionRow>> {
    let width = panel.target().width();
    if let Some(bad) = sequences.iter().find(|s| s.len() != width) {
        bail!(
            "Sequence '{bad}' has {} residues, '{}' scores {width}",
            bad.len(),
            panel.target().name()
        );
    }

    let per_sequence = sequences
        .par_iter()
        .map(|sequence| {
            panel
                .members()
                .map(|(group, pssm)| -> Result<DistributionRow> {
                    let score = pssm.score(sequence).with_context(|| {
                        format!("Failed to score {sequence} against '{}'", pssm.name())
                    })?;
                    Ok(DistributionRow {
                        kinase: pssm.name().to_string(),
                        sequence: sequence.clone(),
                        score,
                        group,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(per_sequence.into_iter().flatten().collect())
}

pub fn write_distribution<W: Write>(
    rows: &[DistributionRow],
    writer: &mut W,
    delimiter: char,
) -> Result<()> {
    let d = delimiter;
    writeln!(writer, "kinase{d}seq{d}score{d}group")?;
    for row in rows {
        writeln!(
            writer,
            "{}{d}{}{d}{:.6}{d}{}",
            row.kinase, row.sequence, row.score, row.group
        )?;
    }
    Ok(())
}
