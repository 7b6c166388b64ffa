use tracing::debug;

use super::{Candidate, ResolvedEntity};

/// Greedy earliest-start sweep to a non-overlapping, start-sorted subset.
///
/// Candidates are stably sorted by start, so on an exact start tie the one
/// emitted first wins. A candidate is kept iff it starts at or after the end
/// of the last kept one. A long early match therefore shadows any shorter,
/// later-starting match inside it, however specific the latter is.
pub fn resolve_overlaps(mut candidates: Vec<Candidate>) -> Vec<ResolvedEntity> {
    candidates.sort_by_key(|c| c.start);

    let total = candidates.len();
    let mut prev_end = 0;
    let resolved: Vec<ResolvedEntity> = candidates
        .into_iter()
        .filter(|c| {
            if c.start >= prev_end {
                prev_end = c.end;
                true
            } else {
                false
            }
        })
        .collect();

    debug!("Resolved {} candidate(s) down to {}", total, resolved.len());
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pii::EntityType;

    fn cand(start: usize, end: usize, ty: EntityType) -> Candidate {
        Candidate {
            start,
            end,
            entity_type: ty,
            text: "x".repeat(end - start),
        }
    }

    #[test]
    fn test_earliest_start_wins() {
        let resolved = resolve_overlaps(vec![
            cand(4, 7, EntityType::CVV_NO),
            cand(0, 19, EntityType::CREDIT_DEBIT_NO),
            cand(25, 30, EntityType::EXPIRY_NO),
        ]);
        let spans: Vec<(usize, usize)> = resolved.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(spans, vec![(0, 19), (25, 30)]);
    }

    #[test]
    fn test_start_tie_keeps_first_emitted() {
        let resolved = resolve_overlaps(vec![
            cand(0, 14, EntityType::PHONE_NUMBER),
            cand(0, 19, EntityType::CREDIT_DEBIT_NO),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].entity_type, EntityType::PHONE_NUMBER);
    }

    #[test]
    fn test_adjacent_spans_are_both_kept() {
        let resolved = resolve_overlaps(vec![cand(3, 6, EntityType::CVV_NO), cand(0, 3, EntityType::CVV_NO)]);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].start, 0);
        assert_eq!(resolved[1].start, 3);
    }

    #[test]
    fn test_output_never_overlaps() {
        // Deterministic pseudo-random spans
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut candidates = Vec::new();
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let start = (seed % 400) as usize;
            let len = 1 + ((seed >> 32) % 25) as usize;
            candidates.push(cand(start, start + len, EntityType::DOB));
        }

        let resolved = resolve_overlaps(candidates);
        assert!(!resolved.is_empty());
        for pair in resolved.windows(2) {
            assert!(pair[0].start < pair[1].start);
            assert!(!pair[0].overlaps(&pair[1]));
        }
        for (i, a) in resolved.iter().enumerate() {
            for b in &resolved[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_overlaps(Vec::new()).is_empty());
    }
}
