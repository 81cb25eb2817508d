//! Pattern scanning: candidate repeat runs over one array
//!
//! For each candidate period the scanner slides a window over the family
//! sequence and grows maximal runs of consecutive unit occurrences,
//! respecting the configured coordinate-gap bound. All structurally valid
//! candidates across every `(period, start)` pair are collected into one
//! pool; no occupancy bookkeeping happens here. Conflicts between
//! overlapping explanations of the same stretch are settled later by the
//! resolver, which needs global visibility of the pool to let quality, not
//! scan order, decide.

use crate::array::MonomerArray;
use crate::error::{HorScanError, Result};
use crate::monomer::FamilyId;
use crate::score::{gap_stats, quality_score};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Detection parameters consumed by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParams {
    /// Minimum monomers per repeat unit
    pub min_monomers: usize,
    /// Maximum monomers per repeat unit
    pub max_pattern_length: usize,
    /// Minimum consecutive unit occurrences for a run to count
    pub min_copies: usize,
    /// Maximum allowed coordinate gap between adjacent monomers, in bp
    pub max_gap: u64,
    /// Minimum fraction of perfect windows in an accepted run
    pub min_purity: f64,
    /// Minimum composite quality score of an accepted run
    pub min_score: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            min_monomers: 3,
            max_pattern_length: 20,
            min_copies: 3,
            max_gap: 500,
            min_purity: 0.9,
            min_score: 50.0,
        }
    }
}

impl ScanParams {
    /// Validate parameter ranges. These invalidate every array's result,
    /// so the pipeline fails fast on the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.min_monomers < 1 {
            return Err(HorScanError::invalid_params("min_monomers must be >= 1"));
        }
        if self.max_pattern_length < self.min_monomers {
            return Err(HorScanError::invalid_params(format!(
                "max_pattern_length {} is below min_monomers {}",
                self.max_pattern_length, self.min_monomers
            )));
        }
        if self.min_copies < 1 {
            return Err(HorScanError::invalid_params("min_copies must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.min_purity) {
            return Err(HorScanError::invalid_params(format!(
                "min_purity {} outside [0, 1]",
                self.min_purity
            )));
        }
        if !(0.0..=100.0).contains(&self.min_score) {
            return Err(HorScanError::invalid_params(format!(
                "min_score {} outside [0, 100]",
                self.min_score
            )));
        }
        Ok(())
    }
}

/// One candidate repeat run, transient between scanning and resolution
#[derive(Debug, Clone, PartialEq)]
pub struct PatternCandidate {
    /// The repeat unit: family labels of one period
    pub unit: Vec<FamilyId>,
    /// First monomer index covered by the run
    pub start_index: usize,
    /// One past the last monomer index covered
    pub span_index_end: usize,
    /// Number of unit-length windows in the run
    pub copies: usize,
    /// Fraction of windows equal to the unit
    pub purity: f64,
    /// Largest inter-monomer gap inside the span, in bp
    pub max_gap: u64,
    /// Mean inter-monomer gap inside the span, in bp
    pub mean_gap: f64,
    /// Standard deviation of the gaps, in bp
    pub gap_std: f64,
    /// Composite quality score, 0-100
    pub quality_score: f64,
}

impl PatternCandidate {
    pub fn unit_length(&self) -> usize {
        self.unit.len()
    }

    pub fn total_monomers(&self) -> usize {
        self.copies * self.unit.len()
    }

    /// Monomer indices covered by this run
    pub fn index_range(&self) -> Range<usize> {
        self.start_index..self.span_index_end
    }
}

/// Find every structurally valid repeat run in one array.
///
/// Periods are enumerated shortest first; within a period every start
/// position is tried, so one physical repeat stretch produces many
/// overlapping candidates. Arrays shorter than the minimum span yield an
/// empty pool, not an error.
pub fn scan_array(array: &MonomerArray, params: &ScanParams) -> Vec<PatternCandidate> {
    let families = array.families();
    let n = families.len();
    if n < params.min_monomers * params.min_copies {
        return Vec::new();
    }

    let max_period = params.max_pattern_length.min(n / params.min_copies);
    let mut pool = Vec::new();

    for period in params.min_monomers..=max_period {
        let last_start = n - period * params.min_copies;
        for start in 0..=last_start {
            if let Some(candidate) = grow_run(array, &families, start, period, params) {
                pool.push(candidate);
            }
        }
    }

    pool
}

/// Grow one run window-by-window from `start` and gate it on the
/// acceptance thresholds. Returns None when the run never reaches
/// `min_copies` or fails a gate.
fn grow_run(
    array: &MonomerArray,
    families: &[FamilyId],
    start: usize,
    period: usize,
    params: &ScanParams,
) -> Option<PatternCandidate> {
    let n = families.len();
    let unit = &families[start..start + period];

    // The seed window is the unit itself, so it is always perfect.
    let mut copies = 1usize;
    let mut perfect = 1usize;
    let mut trailing_copies = copies;
    let mut pos = start + period;

    while pos + period <= n {
        // A gap beyond the bound ends the run here; this is what splits one
        // physically long array into separate HORs at structural gaps.
        if array.gap(pos - 1) > params.max_gap {
            break;
        }

        let window = &families[pos..pos + period];
        let is_perfect = window == unit;
        if !is_perfect {
            // Absorb an imperfect window only while the run purity stays
            // above the acceptance threshold.
            let projected = perfect as f64 / (copies + 1) as f64;
            if projected < params.min_purity {
                break;
            }
        }

        copies += 1;
        if is_perfect {
            perfect += 1;
            trailing_copies = copies;
        }
        pos += period;
    }

    // A run always ends on a perfect window; drop absorbed trailing
    // mismatches so the genomic span stays meaningful.
    copies = trailing_copies;
    if copies < params.min_copies {
        return None;
    }

    let span_end = start + copies * period;
    let purity = perfect as f64 / copies as f64;
    if purity < params.min_purity {
        return None;
    }

    // The growth rule only inspects window-boundary gaps; the full-span
    // statistics also cover gaps inside windows of period >= 2.
    let stats = gap_stats(array, start, span_end);
    if stats.max_gap > params.max_gap {
        return None;
    }

    let score = quality_score(purity, copies, period, params.min_monomers);
    if score < params.min_score {
        return None;
    }

    Some(PatternCandidate {
        unit: unit.to_vec(),
        start_index: start,
        span_index_end: span_end,
        copies,
        purity,
        max_gap: stats.max_gap,
        mean_gap: stats.mean_gap,
        gap_std: stats.gap_std,
        quality_score: score,
    })
}
