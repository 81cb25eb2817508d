//! Quality scoring for candidate repeat runs
//!
//! The composite score weighs purity at 50 points, run length at 30, and
//! unit simplicity at 20. Gap statistics are descriptive only: they are
//! reported alongside each HOR for downstream filtering but carry no weight
//! in the score.

use crate::array::MonomerArray;

/// Descriptive statistics over the inter-monomer gaps inside a span
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GapStats {
    /// Largest gap, in bp
    pub max_gap: u64,
    /// Mean gap, in bp
    pub mean_gap: f64,
    /// Population standard deviation of the gaps, in bp
    pub gap_std: f64,
}

/// Gap statistics over the consecutive-monomer gaps in `[start, end)`.
///
/// A span of one monomer has no internal gap and reports zeros.
pub fn gap_stats(array: &MonomerArray, start: usize, end: usize) -> GapStats {
    if end <= start + 1 {
        return GapStats::default();
    }

    let gaps: Vec<u64> = (start..end - 1).map(|i| array.gap(i)).collect();
    let max_gap = gaps.iter().copied().max().unwrap_or(0);
    let mean = gaps.iter().sum::<u64>() as f64 / gaps.len() as f64;
    let variance = gaps
        .iter()
        .map(|&g| {
            let d = g as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / gaps.len() as f64;

    GapStats {
        max_gap,
        mean_gap: mean,
        gap_std: variance.sqrt(),
    }
}

/// Copy-count reward on a logarithmic scale, saturating at 1.0.
///
/// 3 copies land near 0.66, 10 near 0.83, and the term caps out above
/// ~32 copies so that very long runs stop accumulating advantage.
pub fn copy_term(copies: usize) -> f64 {
    if copies == 0 {
        return 0.0;
    }
    (((copies as f64).log10() + 1.5) / 3.0).clamp(0.0, 1.0)
}

/// Simplicity reward: 1.0 at the shortest allowed unit, decreasing with
/// unit length down to a 0.25 floor.
pub fn simplicity_term(unit_length: usize, min_monomers: usize) -> f64 {
    let excess = unit_length.saturating_sub(min_monomers) as f64;
    (1.0 - excess / 20.0).max(0.25)
}

/// Composite quality score on a 0-100 scale
pub fn quality_score(purity: f64, copies: usize, unit_length: usize, min_monomers: usize) -> f64 {
    let score = 50.0 * purity
        + 30.0 * copy_term(copies)
        + 20.0 * simplicity_term(unit_length, min_monomers);
    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ClassifiedMonomer;

    fn uniform_array(n: usize, gap: u64) -> MonomerArray {
        let step = 178 + gap;
        MonomerArray {
            source_id: "chr1".to_string(),
            array_id: "a0".to_string(),
            monomers: (0..n as u64)
                .map(|i| ClassifiedMonomer {
                    family: 3,
                    start: i * step,
                    end: i * step + 178,
                })
                .collect(),
        }
    }

    #[test]
    fn test_gap_stats_uniform() {
        let array = uniform_array(10, 20);
        let stats = gap_stats(&array, 0, 10);
        assert_eq!(stats.max_gap, 20);
        assert!((stats.mean_gap - 20.0).abs() < 1e-9);
        assert!(stats.gap_std.abs() < 1e-9);
    }

    #[test]
    fn test_gap_stats_degenerate_span() {
        let array = uniform_array(5, 0);
        assert_eq!(gap_stats(&array, 2, 3), GapStats::default());
        assert_eq!(gap_stats(&array, 3, 3), GapStats::default());
    }

    #[test]
    fn test_gap_stats_mixed() {
        let mut array = uniform_array(3, 0);
        // Shift the last monomer to open a 100 bp gap
        array.monomers[2].start += 100;
        array.monomers[2].end += 100;
        let stats = gap_stats(&array, 0, 3);
        assert_eq!(stats.max_gap, 100);
        assert!((stats.mean_gap - 50.0).abs() < 1e-9);
        assert!((stats.gap_std - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_copy_term_monotonic_and_saturating() {
        let mut prev = 0.0;
        for copies in [1, 3, 10, 50, 100, 500, 1000, 10_000] {
            let term = copy_term(copies);
            assert!(term >= prev, "copy_term not monotonic at {}", copies);
            assert!(term <= 1.0);
            prev = term;
        }
        assert!((copy_term(1000) - 1.0).abs() < 1e-9);
        assert_eq!(copy_term(10_000), 1.0);
    }

    #[test]
    fn test_simplicity_term_shape() {
        assert!((simplicity_term(3, 3) - 1.0).abs() < 1e-9);
        let mut prev = f64::INFINITY;
        for l in 3..=40 {
            let term = simplicity_term(l, 3);
            assert!(term <= prev);
            assert!(term >= 0.25);
            prev = term;
        }
        assert_eq!(simplicity_term(40, 3), 0.25);
    }

    #[test]
    fn test_quality_score_perfect_long_run() {
        // Scenario A shape: perfect, 356 copies, shortest unit
        let score = quality_score(1.0, 356, 3, 3);
        assert!(score > 95.0);
        assert!(score <= 100.0);
    }

    #[test]
    fn test_quality_score_passes_default_gate() {
        // Minimal accepted run: 3 perfect copies of the shortest unit
        let score = quality_score(1.0, 3, 3, 3);
        assert!(score >= 50.0);
    }

    #[test]
    fn test_quality_score_bounds() {
        assert!(quality_score(0.0, 1, 40, 3) >= 0.0);
        assert!(quality_score(1.0, 1_000_000, 3, 3) <= 100.0);
    }
}
