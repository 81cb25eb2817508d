//! Overlap resolution: non-overlapping cover of one array
//!
//! The scanner hands over every valid candidate for an array, including the
//! many overlapping explanations one repeat stretch produces. Resolution
//! sorts the whole pool by quality, walks it greedily against an occupancy
//! mask over monomer indices, and keeps only candidates whose span is still
//! entirely free. The result is a partition of a subset of the array: no two
//! retained runs share a monomer, and monomers may remain uncovered.

use crate::scan::PatternCandidate;

/// Occupancy mask over the monomer indices of one array.
///
/// Private to a single array's resolution pass; no locking is needed.
struct IndexMask {
    occupied: Vec<bool>,
}

impl IndexMask {
    fn new(n: usize) -> Self {
        Self {
            occupied: vec![false; n],
        }
    }

    fn is_range_free(&self, start: usize, end: usize) -> bool {
        self.occupied[start..end.min(self.occupied.len())]
            .iter()
            .all(|&taken| !taken)
    }

    fn claim(&mut self, start: usize, end: usize) {
        let end = end.min(self.occupied.len());
        for slot in &mut self.occupied[start..end] {
            *slot = true;
        }
    }
}

/// Resolve an array's candidate pool to a conflict-free subset.
///
/// Priority order: quality score descending, then shorter unit, then more
/// copies, then start index (a deterministic final key). A candidate
/// overlapping an already-claimed index is discarded whole, never truncated
/// and retried. Retained candidates come back sorted by start index.
pub fn resolve_overlaps(
    array_len: usize,
    mut candidates: Vec<PatternCandidate>,
) -> Vec<PatternCandidate> {
    if candidates.is_empty() {
        return candidates;
    }

    candidates.sort_by(|a, b| {
        b.quality_score
            .total_cmp(&a.quality_score)
            .then_with(|| a.unit_length().cmp(&b.unit_length()))
            .then_with(|| b.copies.cmp(&a.copies))
            .then_with(|| a.start_index.cmp(&b.start_index))
    });

    let mut mask = IndexMask::new(array_len);
    let mut retained = Vec::new();

    for candidate in candidates {
        if mask.is_range_free(candidate.start_index, candidate.span_index_end) {
            mask.claim(candidate.start_index, candidate.span_index_end);
            retained.push(candidate);
        }
    }

    retained.sort_by_key(|c| c.start_index);
    retained
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(
        start: usize,
        end: usize,
        unit_len: usize,
        quality: f64,
        copies: usize,
    ) -> PatternCandidate {
        PatternCandidate {
            unit: vec![3; unit_len],
            start_index: start,
            span_index_end: end,
            copies,
            purity: 1.0,
            max_gap: 0,
            mean_gap: 0.0,
            gap_std: 0.0,
            quality_score: quality,
        }
    }

    #[test]
    fn test_empty_pool() {
        assert!(resolve_overlaps(100, Vec::new()).is_empty());
    }

    #[test]
    fn test_quality_wins_over_scan_order() {
        // Lower-quality candidate listed first must lose the overlap
        let pool = vec![
            candidate(0, 30, 5, 80.0, 6),
            candidate(0, 30, 3, 95.0, 10),
        ];
        let kept = resolve_overlaps(30, pool);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].unit_length(), 3);
    }

    #[test]
    fn test_equal_quality_prefers_shorter_unit() {
        let pool = vec![
            candidate(0, 30, 6, 90.0, 5),
            candidate(0, 30, 3, 90.0, 10),
        ];
        let kept = resolve_overlaps(30, pool);
        assert_eq!(kept[0].unit_length(), 3);
    }

    #[test]
    fn test_equal_quality_and_unit_prefers_more_copies() {
        let pool = vec![
            candidate(3, 30, 3, 90.0, 9),
            candidate(0, 30, 3, 90.0, 10),
        ];
        let kept = resolve_overlaps(30, pool);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].start_index, 0);
    }

    #[test]
    fn test_disjoint_candidates_all_kept() {
        let pool = vec![
            candidate(30, 60, 3, 70.0, 10),
            candidate(0, 30, 3, 90.0, 10),
        ];
        let kept = resolve_overlaps(60, pool);
        assert_eq!(kept.len(), 2);
        // Output ordered by start index
        assert_eq!(kept[0].start_index, 0);
        assert_eq!(kept[1].start_index, 30);
    }

    #[test]
    fn test_rejected_candidate_not_truncated() {
        // The loser overlaps in [15, 30) only; its free prefix [0, 15) must
        // not resurface as a truncated run.
        let pool = vec![
            candidate(15, 45, 3, 95.0, 10),
            candidate(0, 30, 3, 80.0, 10),
        ];
        let kept = resolve_overlaps(45, pool);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].start_index, 15);
    }

    #[test]
    fn test_partial_cover_allowed() {
        let pool = vec![candidate(10, 40, 3, 90.0, 10)];
        let kept = resolve_overlaps(100, pool);
        assert_eq!(kept.len(), 1);
        // Indices outside [10, 40) simply stay uncovered
    }

    #[test]
    fn test_claimed_span_blocks_later_candidates() {
        // The winner's claim must mark every index of its span, including
        // one ending exactly at the array bound
        let pool = vec![
            candidate(10, 40, 3, 95.0, 10),
            candidate(30, 40, 3, 80.0, 3),
            candidate(0, 12, 3, 70.0, 4),
        ];
        let kept = resolve_overlaps(40, pool);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].start_index, 10);
        assert_eq!(kept[0].span_index_end, 40);
    }

    #[test]
    fn test_pairwise_disjoint_invariant() {
        // Dense overlapping pool; retained spans must never intersect
        let mut pool = Vec::new();
        for start in 0..20 {
            pool.push(candidate(start, start + 12, 3, 60.0 + start as f64, 4));
        }
        let kept = resolve_overlaps(40, pool);
        for pair in kept.windows(2) {
            assert!(pair[0].span_index_end <= pair[1].start_index);
        }
    }
}
