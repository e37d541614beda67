//! Biological validity rules for kinase sensor peptides.
//!
//! Sequences are ten residues long, positions `-5..4`, with the
//! phosphoacceptor at position 0 (index 5).

/// Constraints a candidate peptide must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRules {
    /// Required sequence length
    pub length: usize,
    /// Index of position 0; splits the peptide into negative and positive halves
    pub center: usize,
    /// Positions forced to a symbol, both during enumeration and validation
    pub fixed: Vec<(usize, u8)>,
    /// Symbols never allowed anywhere
    pub forbidden: Vec<u8>,
    /// Symbols not allowed directly next to the center
    pub forbidden_flanking: Vec<u8>,
    /// Charged symbols that may appear on one side of the center only
    pub one_sided: Vec<u8>,
}

impl Default for SequenceRules {
    fn default() -> Self {
        SequenceRules {
            length: 10,
            center: 5,
            fixed: vec![(5, b'S')],
            forbidden: vec![b'C'],
            forbidden_flanking: vec![b'K'],
            one_sided: vec![b'K', b'R'],
        }
    }
}

impl SequenceRules {
    pub fn is_valid(&self, sequence: &[u8]) -> bool {
        if sequence.iter().any(|s| self.forbidden.contains(s)) {
            return false;
        }
        if sequence.len() != self.length {
            return false;
        }
        if self
            .fixed
            .iter()
            .any(|&(idx, symbol)| sequence.get(idx) != Some(&symbol))
        {
            return false;
        }

        let flanks = [self.center.checked_sub(1), Some(self.center + 1)];
        for idx in flanks.into_iter().flatten() {
            if let Some(s) = sequence.get(idx) {
                if self.forbidden_flanking.contains(s) {
                    return false;
                }
            }
        }

        let center = self.center.min(sequence.len());
        let negative = &sequence[..center];
        let positive = sequence.get(center + 1..).unwrap_or(&[]);
        let charged = |half: &[u8]| half.iter().any(|s| self.one_sided.contains(s));
        !(charged(negative) && charged(positive))
    }
}

/// Check `sequence` against the default sensor rules
pub fn is_valid(sequence: &str) -> bool {
    SequenceRules::default().is_valid(sequence.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_cases() {
        assert!(!is_valid("AAAAASKAAA"), "K at +1");
        assert!(is_valid("AAAAASAAAA"));
        assert!(!is_valid("RAAAASAAAR"), "R on both sides");
    }

    #[test]
    fn test_cysteine_rejected_anywhere() {
        assert!(!is_valid("CAAAASAAAA"));
        assert!(!is_valid("AAAAASAAAC"));
    }

    #[test]
    fn test_length_and_center() {
        assert!(!is_valid("AAAASAAAA"));
        assert!(!is_valid("AAAAASAAAAA"));
        assert!(!is_valid("AAAAATAAAA"));
        assert!(!is_valid(""));
    }

    #[test]
    fn test_lysine_flanks() {
        assert!(!is_valid("AAAAKSAAAA"));
        // R is allowed next to the center
        assert!(is_valid("AAAARSAAAA"));
        assert!(is_valid("AAAASSRAAA"));
        // K further away is fine on a single side
        assert!(is_valid("KAAAASAAAA"));
        assert!(is_valid("AAAAASAAKA"));
    }

    #[test]
    fn test_charged_residues_one_side_only() {
        assert!(!is_valid("KAAAASAAAR"));
        assert!(!is_valid("AAARASAARA"));
        assert!(is_valid("KRAAASAAAA"));
        assert!(is_valid("AAAAASARRA"));
    }
}
