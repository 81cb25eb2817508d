//! HOR records: classification, unit rendering, large duplications
//!
//! A retained candidate becomes a `Hor` by deriving its genomic span from
//! the first and last monomer it covers, and its type from the cardinality
//! of its unit's family labels. These are the only persisted outputs of the
//! core: written once, never mutated.

use crate::array::MonomerArray;
use crate::monomer::FamilyId;
use crate::scan::PatternCandidate;
use serde::Serialize;
use std::fmt;

/// Homogeneous (single-family unit) vs heterogeneous (mixed unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HorType {
    #[serde(rename = "homHOR")]
    Hom,
    #[serde(rename = "hetHOR")]
    Het,
}

impl fmt::Display for HorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HorType::Hom => write!(f, "homHOR"),
            HorType::Het => write!(f, "hetHOR"),
        }
    }
}

/// One retained higher-order repeat
#[derive(Debug, Clone, PartialEq)]
pub struct Hor {
    pub source_id: String,
    pub array_id: String,
    pub unit: Vec<FamilyId>,
    pub start_index: usize,
    pub span_index_end: usize,
    pub copies: usize,
    pub purity: f64,
    pub max_gap: u64,
    pub mean_gap: f64,
    pub gap_std: f64,
    pub quality_score: f64,
    pub hor_type: HorType,
    pub genomic_start: u64,
    pub genomic_end: u64,
}

impl Hor {
    pub fn unit_length(&self) -> usize {
        self.unit.len()
    }

    pub fn total_monomers(&self) -> usize {
        self.copies * self.unit.len()
    }

    pub fn length_bp(&self) -> u64 {
        self.genomic_end - self.genomic_start
    }

    pub fn length_kb(&self) -> f64 {
        self.length_bp() as f64 / 1000.0
    }

    /// Rendered repeat unit, e.g. `3F3` or `2F1-1F7`
    pub fn unit_string(&self) -> String {
        format_unit(&self.unit)
    }
}

/// Derive the persisted HOR record for one retained candidate.
///
/// The candidate's span is guaranteed non-empty and inside the array by the
/// scanner, so first/last monomer lookups cannot fail.
pub fn classify(array: &MonomerArray, candidate: &PatternCandidate) -> Hor {
    let first = &array.monomers[candidate.start_index];
    let last = &array.monomers[candidate.span_index_end - 1];

    let mut distinct = candidate.unit.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    let hor_type = if distinct.len() == 1 {
        HorType::Hom
    } else {
        HorType::Het
    };

    Hor {
        source_id: array.source_id.clone(),
        array_id: array.array_id.clone(),
        unit: candidate.unit.clone(),
        start_index: candidate.start_index,
        span_index_end: candidate.span_index_end,
        copies: candidate.copies,
        purity: candidate.purity,
        max_gap: candidate.max_gap,
        mean_gap: candidate.mean_gap,
        gap_std: candidate.gap_std,
        quality_score: candidate.quality_score,
        hor_type,
        genomic_start: first.start,
        genomic_end: last.end,
    }
}

/// Render a repeat unit in run-length form: per maximal run of one family,
/// `<count>F<family>`, runs joined by hyphens. A period-3 unit of family 3
/// renders as `3F3`; a mixed unit `[1, 1, 7]` as `2F1-1F7`.
pub fn format_unit(unit: &[FamilyId]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut iter = unit.iter();
    let mut current = match iter.next() {
        Some(&family) => family,
        None => return String::new(),
    };
    let mut count = 1usize;

    for &family in iter {
        if family == current {
            count += 1;
        } else {
            parts.push(format!("{}F{}", count, current));
            current = family;
            count = 1;
        }
    }
    parts.push(format!("{}F{}", count, current));
    parts.join("-")
}

/// Filter HORs down to large duplications: genomic span at least
/// `threshold_kb` kilobases, ordered by descending span length.
pub fn extract_large_duplications(hors: &[Hor], threshold_kb: f64) -> Vec<Hor> {
    let threshold_bp = threshold_kb * 1000.0;
    let mut large: Vec<Hor> = hors
        .iter()
        .filter(|h| h.length_bp() as f64 >= threshold_bp)
        .cloned()
        .collect();
    large.sort_by(|a, b| b.length_bp().cmp(&a.length_bp()));
    large
}
