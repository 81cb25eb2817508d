//! horscan: higher-order repeat detection over classified monomer tables
//!
//! The crate takes a table of family-classified satellite monomers (one row
//! per monomer with its source sequence, tandem array, within-array rank,
//! genomic span, and family label) and finds higher-order repeats: periodic,
//! possibly imperfect repetitions of a short unit of family labels, scored
//! for structural quality. Two TSV tables come out: all retained HORs and
//! the subset large enough to count as large duplications.
//!
//! Processing order per array: scan every `(period, start)` pair into a
//! candidate pool, resolve overlaps by quality, classify the survivors.
//! Arrays are independent and processed in parallel.

pub mod array;
pub mod config;
pub mod error;
pub mod hor;
pub mod logging;
pub mod monomer;
pub mod output;
pub mod pipeline;
pub mod resolve;
pub mod scan;
pub mod score;

pub use array::{build_arrays, ArrayBuildReport, MonomerArray};
pub use error::{HorScanError, Result};
pub use hor::{extract_large_duplications, Hor, HorType};
pub use monomer::{read_monomer_table, FamilyId, MonomerRecord};
pub use pipeline::{HorPipeline, PipelineConfig, RunSummary};
pub use scan::{scan_array, PatternCandidate, ScanParams};

/// Crate version, rendered into output table headers
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
