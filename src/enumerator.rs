//! Best-first enumeration of peptides in strict score order.
//!
//! Every column of the matrix is ranked independently (best entry first for
//! the requested direction). A search state is the vector of per-column
//! ranks; its neighbours increment one non-fixed column by one rank. Since
//! ranks are sorted, a neighbour never scores better than its parent, so
//! popping states from a min-heap yields them in score order without ever
//! materializing the `R^C` space.

use log::{debug, warn};
use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::fmt;

use crate::error::{PssmError, Result};
use crate::matrix::Pssm;
use crate::rules::SequenceRules;

/// Which end of the score distribution to enumerate from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Highest,
    Lowest,
}

impl Direction {
    /// Multiplier turning a score into a min-heap key
    fn key_sign(self) -> f64 {
        match self {
            Direction::Highest => -1.0,
            Direction::Lowest => 1.0,
        }
    }

    /// Order two matrix entries so the preferred one comes first
    fn prefer(self, a: f64, b: f64) -> Ordering {
        match self {
            Direction::Highest => OrderedFloat(b).cmp(&OrderedFloat(a)),
            Direction::Lowest => OrderedFloat(a).cmp(&OrderedFloat(b)),
        }
    }

    /// True when `score` lies beyond `threshold` on the unwanted side
    pub fn is_past(self, score: f64, threshold: f64) -> bool {
        match self {
            Direction::Highest => score < threshold,
            Direction::Lowest => score > threshold,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Highest => write!(f, "highest"),
            Direction::Lowest => write!(f, "lowest"),
        }
    }
}

/// Enumerator configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub direction: Direction,
    /// Stop once this many states have been enqueued. `None` = unbounded
    pub max_visited: Option<usize>,
    pub rules: SequenceRules,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            direction: Direction::Highest,
            max_visited: None,
            rules: SequenceRules::default(),
        }
    }
}

impl SearchConfig {
    pub fn new(direction: Direction) -> Self {
        SearchConfig {
            direction,
            ..Default::default()
        }
    }

    pub fn with_max_visited(mut self, max_visited: Option<usize>) -> Self {
        self.max_visited = max_visited;
        self
    }

    pub fn with_rules(mut self, rules: SequenceRules) -> Self {
        self.rules = rules;
        self
    }
}

/// A valid peptide produced by the enumerator
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub sequence: String,
    /// `log2` of the product of the selected entries
    pub score: f64,
    /// Per-column rank vector this peptide was resolved from
    pub ranks: Vec<usize>,
}

/// Why an enumerator stopped producing hits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every reachable state has been expanded
    Exhausted,
    /// `max_visited` was reached; later hits could no longer be guaranteed in order
    StateBudget,
}

/// Queue entry. Ordered by key, then resolved sequence, then ranks.
#[derive(Debug, Clone)]
struct Node {
    key: OrderedFloat<f64>,
    sequence: Vec<u8>,
    // alphabets are single bytes, so ranks always fit in u8
    ranks: Vec<u8>,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.sequence.cmp(&other.sequence))
            .then_with(|| self.ranks.cmp(&other.ranks))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

/// Lazy best-first generator of valid peptides for one matrix and direction.
///
/// Each call to `next` does bounded work and resumes where the previous one
/// stopped. The queue and visited set live as long as the enumerator; there
/// is no internal limit unless `max_visited` is set, so callers must bound
/// how many items they pull.
pub struct Enumerator<'a> {
    pssm: &'a Pssm,
    config: SearchConfig,
    /// `ranking[column][rank]` = matrix row
    ranking: Vec<Vec<usize>>,
    /// Row forced by the rules for each column, if any
    fixed_rows: Vec<Option<usize>>,
    heap: BinaryHeap<Reverse<Node>>,
    visited: HashSet<Vec<u8>>,
    expanded: usize,
    stop: Option<StopReason>,
}

impl<'a> Enumerator<'a> {
    pub fn new(pssm: &'a Pssm, config: SearchConfig) -> Result<Self> {
        let width = pssm.width();
        let rows = pssm.matrix().rows();

        if config.rules.length != width {
            return Err(PssmError::ShapeMismatch(format!(
                "matrix '{}' has {width} columns but peptides are {} residues long",
                pssm.name(),
                config.rules.length
            )));
        }
        if rows > u8::MAX as usize + 1 {
            return Err(PssmError::ShapeMismatch(format!(
                "matrix '{}' has {rows} rows, at most 256 are supported",
                pssm.name()
            )));
        }

        let mut fixed_rows = vec![None; width];
        for &(column, symbol) in &config.rules.fixed {
            if column >= width {
                return Err(PssmError::ShapeMismatch(format!(
                    "fixed position {column} is outside a {width}-column matrix"
                )));
            }
            let row = pssm
                .alphabet()
                .row_of(symbol)
                .ok_or(PssmError::InvalidSymbol {
                    symbol: symbol as char,
                    position: column,
                })?;
            if fixed_rows[column].is_some_and(|existing| existing != row) {
                return Err(PssmError::ShapeMismatch(format!(
                    "position {column} is fixed to more than one symbol"
                )));
            }
            fixed_rows[column] = Some(row);
        }

        let direction = config.direction;
        let ranking = (0..width)
            .map(|column| {
                let entries: Vec<f64> = pssm.matrix().column(column).collect();
                let mut order: Vec<usize> = (0..rows).collect();
                // stable: equal entries keep row order
                order.sort_by(|&a, &b| direction.prefer(entries[a], entries[b]));
                order
            })
            .collect();

        let mut enumerator = Enumerator {
            pssm,
            config,
            ranking,
            fixed_rows,
            heap: BinaryHeap::new(),
            visited: HashSet::new(),
            expanded: 0,
            stop: None,
        };

        let root = vec![0u8; width];
        let node = enumerator.node(root.clone());
        enumerator.visited.insert(root);
        enumerator.heap.push(Reverse(node));

        debug!(
            "Enumerating '{}' ({} x {}) for {} scores",
            pssm.name(),
            rows,
            width,
            direction
        );

        Ok(enumerator)
    }

    pub fn direction(&self) -> Direction {
        self.config.direction
    }

    /// Number of states popped from the queue so far, valid or not
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Number of distinct states enqueued so far
    pub fn visited(&self) -> usize {
        self.visited.len()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    /// Resolve a rank vector to its peptide and heap key
    fn node(&self, ranks: Vec<u8>) -> Node {
        let matrix = self.pssm.matrix();
        let alphabet = self.pssm.alphabet();

        let mut sequence = Vec::with_capacity(ranks.len());
        let mut score = 0.0;
        for (column, &rank) in ranks.iter().enumerate() {
            let row = self.fixed_rows[column].unwrap_or(self.ranking[column][rank as usize]);
            sequence.push(alphabet.symbol(row));
            score += matrix.log2(row, column);
        }

        Node {
            key: OrderedFloat(self.config.direction.key_sign() * score),
            sequence,
            ranks,
        }
    }

    /// Push every unvisited neighbour of `ranks`
    fn expand(&mut self, ranks: &[u8]) {
        let rows = self.pssm.matrix().rows();

        for column in 0..ranks.len() {
            if self.fixed_rows[column].is_some() || ranks[column] as usize + 1 >= rows {
                continue;
            }

            let mut next = ranks.to_vec();
            next[column] += 1;
            if self.visited.contains(&next) {
                continue;
            }

            if let Some(limit) = self.config.max_visited {
                if self.visited.len() >= limit {
                    warn!(
                        "Search over '{}' reached the limit of {} visited states after {} expansions",
                        self.pssm.name(),
                        limit,
                        self.expanded
                    );
                    self.stop = Some(StopReason::StateBudget);
                    return;
                }
            }

            let node = self.node(next.clone());
            self.visited.insert(next);
            self.heap.push(Reverse(node));
        }
    }
}

impl Iterator for Enumerator<'_> {
    type Item = Hit;

    fn next(&mut self) -> Option<Hit> {
        while self.stop.is_none() {
            let Some(Reverse(node)) = self.heap.pop() else {
                debug!(
                    "Search over '{}' exhausted after {} expansions",
                    self.pssm.name(),
                    self.expanded
                );
                self.stop = Some(StopReason::Exhausted);
                break;
            };
            self.expanded += 1;
            self.expand(&node.ranks);

            if self.config.rules.is_valid(&node.sequence) {
                return Some(Hit {
                    sequence: node.sequence.iter().map(|&s| s as char).collect(),
                    score: self.config.direction.key_sign() * node.key.into_inner(),
                    ranks: node.ranks.iter().map(|&r| r as usize).collect(),
                });
            }
        }
        None
    }
}

/// Enumerate valid peptides of `pssm` in `direction` order using the default rules
pub fn enumerate(pssm: &Pssm, direction: Direction) -> Result<Enumerator<'_>> {
    Enumerator::new(pssm, SearchConfig::new(direction))
}
