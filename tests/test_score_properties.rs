/// Property-based tests for scoring and range invariants
///
/// Uses proptest to check invariants that must hold for any strictly
/// positive matrix, not just hand-picked examples.
use pepsweep::{enumerate, is_valid, score_range, Alphabet, Direction, Pssm, ScoreMatrix};
use proptest::prelude::*;

const SYMBOLS: &str = "AEKRSTC";

fn matrix_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(0.01f64..1.0, 10), SYMBOLS.len())
}

fn build(rows: Vec<Vec<f64>>) -> Pssm {
    let alphabet = Alphabet::from_symbols(SYMBOLS).unwrap();
    Pssm::new("prop", alphabet, ScoreMatrix::new(rows).unwrap()).unwrap()
}

/// Property: enumerated scores never improve and always match the scorer
#[test]
fn prop_enumeration_is_monotonic_and_exact() {
    proptest!(ProptestConfig::with_cases(32), |(rows in matrix_strategy())| {
        let pssm = build(rows);
        for direction in [Direction::Highest, Direction::Lowest] {
            let hits: Vec<_> = enumerate(&pssm, direction).unwrap().take(200).collect();
            prop_assert!(!hits.is_empty());

            for pair in hits.windows(2) {
                match direction {
                    Direction::Highest => {
                        prop_assert!(pair[0].score >= pair[1].score)
                    }
                    Direction::Lowest => {
                        prop_assert!(pair[0].score <= pair[1].score)
                    }
                }
            }
            for hit in &hits {
                prop_assert!(is_valid(&hit.sequence));
                let rescored = pssm.score(&hit.sequence).unwrap();
                prop_assert!((hit.score - rescored).abs() < 1e-9,
                    "{} scored {} by enumerator, {} by scorer",
                    hit.sequence, hit.score, rescored);
            }
        }
    });
}

/// Property: every valid sequence scores inside the computed range
#[test]
fn prop_valid_sequences_fall_inside_range() {
    proptest!(ProptestConfig::with_cases(32), |(
        rows in matrix_strategy(),
        picks in prop::collection::vec(prop::collection::vec(0usize..SYMBOLS.len(), 10), 50)
    )| {
        let pssm = build(rows);
        let range = score_range(&pssm).unwrap();
        prop_assert!(range.min <= range.max);

        let symbols = SYMBOLS.as_bytes();
        for pick in picks {
            let mut seq: Vec<u8> = pick.iter().map(|&i| symbols[i]).collect();
            seq[5] = b'S';
            let seq = String::from_utf8(seq).unwrap();
            if !is_valid(&seq) {
                continue;
            }
            let score = pssm.score(&seq).unwrap();
            prop_assert!(range.min - 1e-9 <= score && score <= range.max + 1e-9,
                "{} scored {} outside [{}, {}]", seq, score, range.min, range.max);
        }
    });
}

/// Property: the scorer equals log2 of the product of the selected entries
#[test]
fn prop_score_is_log2_of_product() {
    proptest!(|(
        rows in matrix_strategy(),
        pick in prop::collection::vec(0usize..SYMBOLS.len(), 10)
    )| {
        let pssm = build(rows.clone());
        let seq: String = pick.iter().map(|&i| SYMBOLS.as_bytes()[i] as char).collect();
        let product: f64 = pick.iter().enumerate().map(|(c, &r)| rows[r][c]).product();
        let score = pssm.score(&seq).unwrap();
        prop_assert!((score - product.log2()).abs() < 1e-9);
    });
}
