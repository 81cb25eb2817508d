//! Detection pipeline: scan, resolve, classify, per array
//!
//! Arrays are mutually independent, so the pipeline maps the per-array
//! stages over them in parallel with rayon and concatenates the results.
//! Within one array the stages are strictly sequential: resolution needs
//! the complete candidate pool before its priority sort. No state is shared
//! between arrays.

use crate::array::{ArrayBuildReport, MonomerArray};
use crate::error::{HorScanError, Result};
use crate::hor::{classify, extract_large_duplications, Hor};
use crate::resolve::resolve_overlaps;
use crate::scan::{scan_array, ScanParams};
use rayon::prelude::*;
use tracing::{debug, info};

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub params: ScanParams,
    /// Minimum genomic span, in kb, for the large-duplication table
    pub large_dup_threshold_kb: f64,
    /// Worker threads for the cross-array map; 0 uses the global rayon pool
    pub num_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            params: ScanParams::default(),
            large_dup_threshold_kb: 40.0,
            num_workers: 0,
        }
    }
}

/// Results and accounting of one detection run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub hors: Vec<Hor>,
    pub large_duplications: Vec<Hor>,
    pub arrays_processed: usize,
    /// Arrays rejected by the builder for shape violations
    pub arrays_skipped: usize,
    /// True when the input table held no classified monomer at all
    pub no_classified_monomers: bool,
}

pub struct HorPipeline {
    config: PipelineConfig,
}

impl HorPipeline {
    /// Create a pipeline, failing fast on invalid parameters since they
    /// would invalidate every array's result.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.params.validate()?;
        if config.large_dup_threshold_kb <= 0.0 {
            return Err(HorScanError::invalid_params(format!(
                "large_dup_threshold_kb {} must be positive",
                config.large_dup_threshold_kb
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full per-array pipeline on one array.
    ///
    /// Arrays shorter than the minimum span contribute zero HORs; that is a
    /// normal outcome, not an error.
    pub fn detect_in_array(&self, array: &MonomerArray) -> Vec<Hor> {
        let candidates = scan_array(array, &self.config.params);
        debug!(
            source_id = %array.source_id,
            array_id = %array.array_id,
            monomers = array.len(),
            candidates = candidates.len(),
            "scanned array"
        );

        let retained = resolve_overlaps(array.len(), candidates);
        retained
            .iter()
            .map(|candidate| classify(array, candidate))
            .collect()
    }

    /// Run detection over all arrays and assemble the final tables.
    pub fn run(&self, arrays: &[MonomerArray], report: &ArrayBuildReport) -> Result<RunSummary> {
        let mut hors = self.detect_all(arrays)?;

        // Cross-array order is not semantically significant; sort for
        // reproducible output.
        hors.sort_by(|a, b| {
            (&a.source_id, &a.array_id, a.genomic_start).cmp(&(
                &b.source_id,
                &b.array_id,
                b.genomic_start,
            ))
        });

        let large_duplications =
            extract_large_duplications(&hors, self.config.large_dup_threshold_kb);

        info!(
            arrays = arrays.len(),
            skipped = report.arrays_skipped,
            hors = hors.len(),
            large_duplications = large_duplications.len(),
            "detection finished"
        );

        Ok(RunSummary {
            hors,
            large_duplications,
            arrays_processed: arrays.len(),
            arrays_skipped: report.arrays_skipped,
            no_classified_monomers: report.no_classified_monomers,
        })
    }

    fn detect_all(&self, arrays: &[MonomerArray]) -> Result<Vec<Hor>> {
        if self.config.num_workers == 0 {
            return Ok(arrays
                .par_iter()
                .flat_map(|array| self.detect_in_array(array))
                .collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_workers)
            .build()?;
        Ok(pool.install(|| {
            arrays
                .par_iter()
                .flat_map(|array| self.detect_in_array(array))
                .collect()
        }))
    }
}
