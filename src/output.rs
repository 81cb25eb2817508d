//! Output tables: HOR and large-duplication TSV export
//!
//! Both tables share one schema and one writer. Files carry an optional
//! `#`-prefixed metadata header (timestamp, version, parameters, counts)
//! followed by the column header; empty results still produce the headers,
//! never an absent file. Gzip compression is available for large runs.

use crate::config::{DetectionSettings, OutputSettings};
use crate::error::{HorScanError, Result};
use crate::hor::Hor;
use crate::pipeline::RunSummary;
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Run-level information rendered into the table headers
#[derive(Debug, Clone)]
pub struct OutputMetadata {
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub input_file: PathBuf,
    pub detection: DetectionSettings,
    pub arrays_processed: usize,
    pub arrays_skipped: usize,
}

impl OutputMetadata {
    pub fn new(input_file: impl Into<PathBuf>, detection: DetectionSettings) -> Self {
        Self {
            timestamp: Utc::now(),
            version: crate::VERSION.to_string(),
            input_file: input_file.into(),
            detection,
            arrays_processed: 0,
            arrays_skipped: 0,
        }
    }

    pub fn with_counts(mut self, processed: usize, skipped: usize) -> Self {
        self.arrays_processed = processed;
        self.arrays_skipped = skipped;
        self
    }
}

/// Writer that optionally gzips its output
pub enum TableWriter {
    Plain(BufWriter<File>),
    Gzip(BufWriter<GzEncoder<File>>),
}

impl TableWriter {
    pub fn create(path: &Path, gzip: bool) -> Result<Self> {
        let file = File::create(path)
            .map_err(|e| HorScanError::io_error(format!("failed to create output file: {}", e)))?;

        Ok(if gzip {
            Self::Gzip(BufWriter::new(GzEncoder::new(file, Compression::new(6))))
        } else {
            Self::Plain(BufWriter::new(file))
        })
    }

    /// Flush and, for gzip, finish the stream
    pub fn finish(self) -> Result<()> {
        match self {
            Self::Plain(mut writer) => writer.flush()?,
            Self::Gzip(writer) => {
                let encoder = writer
                    .into_inner()
                    .map_err(|e| HorScanError::io_error(format!("flush error: {}", e)))?;
                encoder.finish()?;
            }
        }
        Ok(())
    }
}

impl Write for TableWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(writer) => writer.write(buf),
            Self::Gzip(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Plain(writer) => writer.flush(),
            Self::Gzip(writer) => writer.flush(),
        }
    }
}

/// Column header shared by both tables
pub const TABLE_COLUMNS: &str = "source_id\tarray_id\tgenomic_start\tgenomic_end\tunit\t\
unit_length\tcopies\ttotal_monomers\thor_type\tpurity\tquality_score\t\
max_gap\tmean_gap\tgap_std\tlength_bp\tlength_kb";

/// Write one table of HOR rows to `path`
pub fn write_hor_table(
    path: &Path,
    hors: &[Hor],
    metadata: Option<&OutputMetadata>,
    gzip: bool,
) -> Result<()> {
    let mut writer = TableWriter::create(path, gzip)?;

    if let Some(meta) = metadata {
        writeln!(writer, "# horscan higher-order repeat detection")?;
        writeln!(writer, "# Generated: {}", meta.timestamp.to_rfc3339())?;
        writeln!(writer, "# Version: {}", meta.version)?;
        writeln!(writer, "# Input: {}", meta.input_file.display())?;
        writeln!(
            writer,
            "# Parameters: min_monomers={}, max_pattern_length={}, min_copies={}, max_gap={}, min_purity={:.2}, min_score={:.0}",
            meta.detection.min_monomers,
            meta.detection.max_pattern_length,
            meta.detection.min_copies,
            meta.detection.max_gap,
            meta.detection.min_purity,
            meta.detection.min_score,
        )?;
        writeln!(
            writer,
            "# Arrays: {} processed, {} skipped",
            meta.arrays_processed, meta.arrays_skipped
        )?;
        writeln!(writer, "# Rows: {}", hors.len())?;
    }

    writeln!(writer, "{}", TABLE_COLUMNS)?;
    for hor in hors {
        write_row(&mut writer, hor)?;
    }

    writer.finish()
}

fn write_row<W: Write>(writer: &mut W, hor: &Hor) -> Result<()> {
    writeln!(
        writer,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.3}\t{:.1}\t{}\t{:.2}\t{:.2}\t{}\t{:.3}",
        hor.source_id,
        hor.array_id,
        hor.genomic_start,
        hor.genomic_end,
        hor.unit_string(),
        hor.unit_length(),
        hor.copies,
        hor.total_monomers(),
        hor.hor_type,
        hor.purity,
        hor.quality_score,
        hor.max_gap,
        hor.mean_gap,
        hor.gap_std,
        hor.length_bp(),
        hor.length_kb(),
    )?;
    Ok(())
}

/// Write both tables for a finished run. Returns the paths written, the HOR
/// table first.
pub fn write_tables(
    summary: &RunSummary,
    settings: &OutputSettings,
    metadata: &OutputMetadata,
) -> Result<Vec<PathBuf>> {
    let dir = settings
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)?;

    let suffix = if settings.gzip { ".tsv.gz" } else { ".tsv" };
    let hor_path = dir.join(format!("{}_hors{}", settings.file_prefix, suffix));
    let dup_path = dir.join(format!(
        "{}_large_duplications{}",
        settings.file_prefix, suffix
    ));

    let meta = settings.include_metadata.then_some(metadata);
    write_hor_table(&hor_path, &summary.hors, meta, settings.gzip)?;
    write_hor_table(&dup_path, &summary.large_duplications, meta, settings.gzip)?;

    Ok(vec![hor_path, dup_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hor::HorType;
    use tempfile::TempDir;

    fn sample_hor() -> Hor {
        Hor {
            source_id: "chr1".to_string(),
            array_id: "a0".to_string(),
            unit: vec![3, 3, 3],
            start_index: 0,
            span_index_end: 1068,
            copies: 356,
            purity: 1.0,
            max_gap: 0,
            mean_gap: 0.0,
            gap_std: 0.0,
            quality_score: 100.0,
            hor_type: HorType::Hom,
            genomic_start: 0,
            genomic_end: 190_104,
        }
    }

    #[test]
    fn test_row_format() {
        let mut buffer = Vec::new();
        write_row(&mut buffer, &sample_hor()).unwrap();
        let row = String::from_utf8(buffer).unwrap();

        let fields: Vec<&str> = row.trim_end().split('\t').collect();
        assert_eq!(fields.len(), TABLE_COLUMNS.split('\t').count());
        assert_eq!(fields[0], "chr1");
        assert_eq!(fields[4], "3F3");
        assert_eq!(fields[5], "3");
        assert_eq!(fields[6], "356");
        assert_eq!(fields[7], "1068");
        assert_eq!(fields[8], "homHOR");
        assert_eq!(fields[9], "1.000");
        assert_eq!(fields[14], "190104");
        assert_eq!(fields[15], "190.104");
    }

    #[test]
    fn test_table_with_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        let meta = OutputMetadata::new("monomers.tsv", DetectionSettings::default())
            .with_counts(3, 1);

        write_hor_table(&path, &[sample_hor()], Some(&meta), false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.starts_with("# horscan"));
        assert!(content.contains("# Arrays: 3 processed, 1 skipped"));
        assert!(content.contains(TABLE_COLUMNS));
        assert_eq!(content.lines().count(), 7 + 1 + 1);
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.tsv");

        write_hor_table(&path, &[], None, false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), TABLE_COLUMNS);
    }

    #[test]
    fn test_gzip_output_is_gzip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv.gz");

        write_hor_table(&path, &[sample_hor()], None, true).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        // Gzip magic
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_write_tables_paths() {
        let dir = TempDir::new().unwrap();
        let settings = OutputSettings {
            output_dir: Some(dir.path().to_path_buf()),
            file_prefix: "sample".to_string(),
            gzip: false,
            include_metadata: false,
        };
        let summary = RunSummary {
            hors: vec![sample_hor()],
            ..Default::default()
        };
        let meta = OutputMetadata::new("monomers.tsv", DetectionSettings::default());

        let paths = write_tables(&summary, &settings, &meta).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("sample_hors.tsv"));
        assert!(paths[1].ends_with("sample_large_duplications.tsv"));
        assert!(paths.iter().all(|p| p.exists()));

        // Large-duplication table is header-only here
        let dup_content = std::fs::read_to_string(&paths[1]).unwrap();
        assert_eq!(dup_content.trim_end(), TABLE_COLUMNS);
    }
}
