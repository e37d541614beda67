//! A target kinase together with the kinases it is compared against.
//!
//! Matrices live in one directory as `<kinase>.csv` (or `.csv.gz`). The
//! target and sub-targets are named explicitly; every other matrix in the
//! directory forms the background.

use anyhow::{bail, Context, Result};
use log::{info, warn};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::matrix::Pssm;
use crate::pssm_io::{is_pssm_file, pssm_name, read_pssm_file};
use crate::range::{score_range_with, RangeConfig, ScoreRange};

/// Role of a matrix in a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Target,
    SubTarget,
    Background,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Target => write!(f, "target"),
            Group::SubTarget => write!(f, "subtarget"),
            Group::Background => write!(f, "background"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KinasePanel {
    target: Pssm,
    sub_targets: Vec<Pssm>,
    background: Vec<Pssm>,
}

impl KinasePanel {
    /// Build a panel; every matrix must score peptides of the target's length
    pub fn new(target: Pssm, sub_targets: Vec<Pssm>, background: Vec<Pssm>) -> Result<Self> {
        for pssm in sub_targets.iter().chain(&background) {
            if pssm.width() != target.width() {
                bail!(
                    "Kinase '{}' covers positions {} but target '{}' covers {}",
                    pssm.name(),
                    position_span(pssm),
                    target.name(),
                    position_span(&target)
                );
            }
            if pssm.positions() != target.positions() {
                warn!(
                    "Kinase '{}' labels positions {} but target '{}' labels {}",
                    pssm.name(),
                    position_span(pssm),
                    target.name(),
                    position_span(&target)
                );
            }
        }
        Ok(KinasePanel {
            target,
            sub_targets,
            background,
        })
    }

    /// Load `target` and `sub_targets` from `directory`; all remaining matrices become background
    pub fn load<P: AsRef<Path>>(directory: P, target: &str, sub_targets: &[String]) -> Result<Self> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            bail!("Kinase directory {} does not exist", directory.display());
        }
        if sub_targets.iter().any(|name| name == target) {
            bail!("Target kinase '{target}' must not be listed as a sub-target");
        }

        let target_pssm = load_named(directory, target)?;
        let sub_target_pssms = sub_targets
            .iter()
            .map(|name| load_named(directory, name))
            .collect::<Result<Vec<_>>>()?;

        let mut background_paths: Vec<PathBuf> = Vec::new();
        let entries = std::fs::read_dir(directory)
            .with_context(|| format!("Failed to list {}", directory.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to read an entry of {}", directory.display()))?
                .path();
            if !path.is_file() || !is_pssm_file(&path) {
                continue;
            }
            let name = pssm_name(&path);
            if name != target && !sub_targets.contains(&name) {
                background_paths.push(path);
            }
        }
        // plain .csv sorts before .csv.gz of the same kinase and wins, as in load_named
        background_paths.sort_by_key(|path| (pssm_name(path), is_gzipped(path)));
        background_paths.dedup_by(|later, kept| {
            let duplicate = pssm_name(&*later) == pssm_name(&*kept);
            if duplicate {
                warn!("Ignoring {}, already loaded from {}", later.display(), kept.display());
            }
            duplicate
        });

        let background = background_paths
            .par_iter()
            .map(|path| {
                read_pssm_file(path).with_context(|| format!("Failed to load {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Loaded target '{}' with {} sub-targets and {} background kinases",
            target,
            sub_target_pssms.len(),
            background.len()
        );

        Self::new(target_pssm, sub_target_pssms, background)
    }

    pub fn target(&self) -> &Pssm {
        &self.target
    }

    pub fn sub_targets(&self) -> &[Pssm] {
        &self.sub_targets
    }

    pub fn background(&self) -> &[Pssm] {
        &self.background
    }

    pub fn member_count(&self) -> usize {
        1 + self.sub_targets.len() + self.background.len()
    }

    /// Every matrix with its group: target first, then sub-targets, then background
    pub fn members(&self) -> impl Iterator<Item = (Group, &Pssm)> {
        std::iter::once((Group::Target, &self.target))
            .chain(self.sub_targets.iter().map(|p| (Group::SubTarget, p)))
            .chain(self.background.iter().map(|p| (Group::Background, p)))
    }

    /// Score range of every member, in `members` order, computed in parallel
    pub fn ranges(&self, config: &RangeConfig) -> Result<Vec<ScoreRange>> {
        let members: Vec<&Pssm> = self.members().map(|(_, pssm)| pssm).collect();
        members
            .par_iter()
            .map(|pssm| {
                score_range_with(pssm, config)
                    .with_context(|| format!("Failed to compute score range of '{}'", pssm.name()))
            })
            .collect()
    }
}

/// Find `<name>.csv` or `<name>.csv.gz` in `directory` and load it
fn load_named(directory: &Path, name: &str) -> Result<Pssm> {
    let candidates = [
        directory.join(format!("{name}.csv")),
        directory.join(format!("{name}.csv.gz")),
    ];
    let Some(path) = candidates.iter().find(|p| p.is_file()) else {
        bail!("No matrix file for kinase '{name}' in {}", directory.display());
    };
    read_pssm_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn is_gzipped(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// `-5..4` style summary of a matrix's column labels
fn position_span(pssm: &Pssm) -> String {
    match (pssm.positions().first(), pssm.positions().last()) {
        (Some(first), Some(last)) => format!("{first}..{last}"),
        _ => String::from("(none)"),
    }
}
