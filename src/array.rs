//! Array building from classified monomer records
//!
//! Groups the monomer table by `(source_id, array_id)`, drops unclassified
//! rows, and orders each group by within-array rank. Arrays are immutable
//! once built; everything downstream works off the family sequence and the
//! genomic spans stored here.
//!
//! A group that violates the table shape (non-monotonic indices, overlapping
//! spans) is skipped and counted, never fatal: one bad array must not take
//! down the rest of the run.

use crate::monomer::{FamilyId, MonomerRecord};
use ahash::AHashMap;
use tracing::warn;

/// One classified monomer inside an array, after filtering and re-ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedMonomer {
    pub family: FamilyId,
    pub start: u64,
    pub end: u64,
}

/// An ordered run of classified monomers sharing one `(source_id, array_id)`
#[derive(Debug, Clone)]
pub struct MonomerArray {
    pub source_id: String,
    pub array_id: String,
    pub monomers: Vec<ClassifiedMonomer>,
}

impl MonomerArray {
    pub fn len(&self) -> usize {
        self.monomers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monomers.is_empty()
    }

    /// Family label sequence, in array order
    pub fn families(&self) -> Vec<FamilyId> {
        self.monomers.iter().map(|m| m.family).collect()
    }

    /// Coordinate gap between monomer `i` and monomer `i + 1`
    ///
    /// Panics if `i + 1` is out of bounds. Monomers never overlap, so the
    /// subtraction cannot underflow on well-formed arrays; a saturating sub
    /// keeps a zero gap on adjacent monomers that share a boundary.
    pub fn gap(&self, i: usize) -> u64 {
        self.monomers[i + 1].start.saturating_sub(self.monomers[i].end)
    }
}

/// Accounting for one array-building pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayBuildReport {
    /// Rows read from the table
    pub total_records: usize,
    /// Rows dropped for having no family assignment
    pub unclassified_records: usize,
    /// Arrays that passed shape validation
    pub arrays_built: usize,
    /// Arrays rejected for shape violations
    pub arrays_skipped: usize,
    /// True when the whole table held no classified monomer at all
    pub no_classified_monomers: bool,
}

/// Group classified monomers into ordered arrays.
///
/// Output order is deterministic: arrays are sorted by `(source_id,
/// array_id)`. Empty input is valid and produces zero arrays with
/// `no_classified_monomers` set.
pub fn build_arrays(records: &[MonomerRecord]) -> (Vec<MonomerArray>, ArrayBuildReport) {
    let mut report = ArrayBuildReport {
        total_records: records.len(),
        ..Default::default()
    };

    let mut groups: AHashMap<(&str, &str), Vec<&MonomerRecord>> = AHashMap::new();
    for record in records {
        if record.family.is_none() {
            report.unclassified_records += 1;
            continue;
        }
        groups.entry(record.array_key()).or_default().push(record);
    }

    if groups.is_empty() {
        report.no_classified_monomers = true;
        return (Vec::new(), report);
    }

    let mut keys: Vec<(&str, &str)> = groups.keys().copied().collect();
    keys.sort_unstable();

    let mut arrays = Vec::with_capacity(keys.len());
    for key in keys {
        let mut group = groups.remove(&key).unwrap_or_default();
        group.sort_by_key(|r| r.index);

        if let Some(reason) = shape_violation(&group) {
            warn!(
                source_id = key.0,
                array_id = key.1,
                reason, "skipping malformed array"
            );
            report.arrays_skipped += 1;
            continue;
        }

        let monomers = group
            .iter()
            .map(|r| ClassifiedMonomer {
                family: r.family.unwrap_or_default(),
                start: r.start,
                end: r.end,
            })
            .collect();

        arrays.push(MonomerArray {
            source_id: key.0.to_string(),
            array_id: key.1.to_string(),
            monomers,
        });
        report.arrays_built += 1;
    }

    (arrays, report)
}

/// Check one sorted group for table-shape violations.
///
/// Indices must be strictly increasing (the original ranks may have holes
/// where unclassified monomers were dropped, but never duplicates or
/// reversals) and spans must be ordered and non-overlapping.
fn shape_violation(group: &[&MonomerRecord]) -> Option<&'static str> {
    for pair in group.windows(2) {
        if pair[1].index <= pair[0].index {
            return Some("non-monotonic monomer indices");
        }
        if pair[1].start < pair[0].end {
            return Some("overlapping monomer coordinates");
        }
    }
    None
}
