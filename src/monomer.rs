//! Classified monomer records and monomer table reading
//!
//! The monomer table is the hand-off point from the upstream classification
//! step: one tab-separated row per monomer with its source sequence, tandem
//! array, within-array rank, genomic span, and family label. Rows without a
//! family assignment carry an empty field or `NA` and are kept here as
//! `family: None`; the array builder drops them.

use crate::error::{HorScanError, Result};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

/// Monomer family label assigned by the upstream classifier
pub type FamilyId = u32;

/// One row of the classified monomer table
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MonomerRecord {
    /// Unique monomer identifier
    pub monomer_id: String,
    /// Source sequence (chromosome, contig, or read) identifier
    pub source_id: String,
    /// Tandem array identifier within the source sequence
    pub array_id: String,
    /// 0-based rank within the array, strictly increasing
    pub index: usize,
    /// Genomic start coordinate
    pub start: u64,
    /// Genomic end coordinate (exclusive, > start)
    pub end: u64,
    /// Family label, None for unclassified monomers
    #[serde(deserialize_with = "family_field")]
    pub family: Option<FamilyId>,
}

impl MonomerRecord {
    /// Grouping key shared by all monomers of one array
    pub fn array_key(&self) -> (&str, &str) {
        (&self.source_id, &self.array_id)
    }
}

/// Parse the family column. Classifiers hand us either an integer, an
/// integral float (pandas renders the column as `3.0` once NaNs appear),
/// or a missing-value sentinel.
fn family_field<'de, D>(deserializer: D) -> std::result::Result<Option<FamilyId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let raw = match raw {
        Some(s) => s,
        None => return Ok(None),
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    if let Ok(id) = trimmed.parse::<FamilyId>() {
        return Ok(Some(id));
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as FamilyId)),
        _ => Err(serde::de::Error::custom(format!(
            "invalid family label: {:?}",
            trimmed
        ))),
    }
}

/// Read a classified monomer table from a tab-separated file with header.
///
/// Extra columns are ignored; a missing required column fails the whole run
/// with the offending line in the message. An empty table (header only) is
/// valid and yields an empty vector.
pub fn read_monomer_table<P: AsRef<Path>>(path: P) -> Result<Vec<MonomerRecord>> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .comment(Some(b'#'))
        .from_path(path)?;
    read_records(reader)
}

/// Read a classified monomer table from any reader (used by tests)
pub fn read_monomer_reader<R: Read>(input: R) -> Result<Vec<MonomerRecord>> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .comment(Some(b'#'))
        .from_reader(input);
    read_records(reader)
}

fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<MonomerRecord>> {
    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<MonomerRecord>().enumerate() {
        let record = row.map_err(|e| match e.position() {
            Some(pos) => HorScanError::invalid_table(pos.line() as usize, e.to_string()),
            None => HorScanError::invalid_table(i + 2, e.to_string()),
        })?;
        if record.end <= record.start {
            return Err(HorScanError::invalid_table(
                i + 2,
                format!(
                    "monomer {} has end {} <= start {}",
                    record.monomer_id, record.end, record.start
                ),
            ));
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "monomer_id\tsource_id\tarray_id\tindex\tstart\tend\tfamily\n";

    #[test]
    fn test_read_basic_table() {
        let table = format!(
            "{}m0\tchr1\ta0\t0\t100\t278\t3\nm1\tchr1\ta0\t1\t278\t456\t3\n",
            HEADER
        );
        let records = read_monomer_reader(table.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].family, Some(3));
        assert_eq!(records[1].index, 1);
        assert_eq!(records[0].array_key(), ("chr1", "a0"));
    }

    #[test]
    fn test_unclassified_sentinels() {
        let table = format!(
            "{}m0\tchr1\ta0\t0\t0\t178\t\nm1\tchr1\ta0\t1\t178\t356\tNA\nm2\tchr1\ta0\t2\t356\t534\tnan\n",
            HEADER
        );
        let records = read_monomer_reader(table.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.family.is_none()));
    }

    #[test]
    fn test_pandas_float_family() {
        let table = format!("{}m0\tchr1\ta0\t0\t0\t178\t3.0\n", HEADER);
        let records = read_monomer_reader(table.as_bytes()).unwrap();
        assert_eq!(records[0].family, Some(3));
    }

    #[test]
    fn test_fractional_family_rejected() {
        let table = format!("{}m0\tchr1\ta0\t0\t0\t178\t3.5\n", HEADER);
        assert!(read_monomer_reader(table.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_column_rejected() {
        let table = "monomer_id\tsource_id\tarray_id\tindex\tstart\tend\nm0\tchr1\ta0\t0\t0\t178\n";
        let err = read_monomer_reader(table.as_bytes()).unwrap_err();
        match err {
            HorScanError::InvalidTable { .. } => (),
            other => panic!("expected InvalidTable, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_coordinates_rejected() {
        let table = format!("{}m0\tchr1\ta0\t0\t500\t178\t3\n", HEADER);
        assert!(read_monomer_reader(table.as_bytes()).is_err());
    }

    #[test]
    fn test_extra_columns_ignored() {
        let table = "monomer_id\tsource_id\tarray_id\tindex\tstart\tend\tfamily\tstrand\n\
                     m0\tchr1\ta0\t0\t0\t178\t3\t+\n";
        let records = read_monomer_reader(table.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_empty_table() {
        let records = read_monomer_reader(HEADER.as_bytes()).unwrap();
        assert!(records.is_empty());
    }
}
