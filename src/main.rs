use clap::Parser;
use horscan::array::build_arrays;
use horscan::config::ConfigManager;
use horscan::error::Result;
use horscan::logging::init_logging;
use horscan::monomer::read_monomer_table;
use horscan::output::{write_tables, OutputMetadata};
use horscan::pipeline::HorPipeline;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

/// Command line arguments for horscan.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Classified monomer table (TSV)
    #[arg(long)]
    input: PathBuf,

    /// Output file name prefix
    #[arg(long)]
    output: Option<String>,

    /// Output directory
    #[arg(long = "outdir")]
    output_dir: Option<PathBuf>,

    /// Configuration file (.toml, .yaml, .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in parameter profile (strict, sensitive)
    #[arg(long)]
    profile: Option<String>,

    /// Minimum monomers per repeat unit
    #[arg(long = "minmonomers")]
    min_monomers: Option<usize>,

    /// Maximum monomers per repeat unit
    #[arg(long = "maxpattern")]
    max_pattern_length: Option<usize>,

    /// Minimum consecutive unit copies
    #[arg(long = "mincopies")]
    min_copies: Option<usize>,

    /// Maximum gap between adjacent monomers (bp)
    #[arg(long = "maxgap")]
    max_gap: Option<u64>,

    /// Minimum purity of an accepted repeat (0-1)
    #[arg(long = "minpurity")]
    min_purity: Option<f64>,

    /// Minimum quality score of an accepted repeat (0-100)
    #[arg(long = "minscore")]
    min_score: Option<f64>,

    /// Minimum span for the large-duplication table (kb)
    #[arg(long = "dupkb")]
    large_dup_threshold_kb: Option<f64>,

    /// Number of worker threads (0 = all cores)
    #[arg(long = "pa")]
    workers: Option<usize>,

    /// Gzip-compress the output tables
    #[arg(long)]
    gzip: bool,

    /// Verbose output
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("horscan: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let mut manager = match &args.config {
        Some(path) => ConfigManager::load_from_file(path)?,
        None => ConfigManager::new(),
    };

    if let Some(profile) = &args.profile {
        manager.apply_profile(profile)?;
    }
    manager.load_from_env()?;
    apply_cli_overrides(&mut manager, &args);
    manager.config().validate()?;

    init_logging(&manager.config().logging)?;
    let config = manager.config();

    info!(input = %args.input.display(), "reading monomer table");
    let records = read_monomer_table(&args.input)?;
    let (arrays, report) = build_arrays(&records);

    if report.no_classified_monomers {
        info!("no classified monomers in input, writing empty tables");
    }
    if report.arrays_skipped > 0 {
        warn!(skipped = report.arrays_skipped, "some arrays were malformed");
    }
    info!(
        records = report.total_records,
        unclassified = report.unclassified_records,
        arrays = report.arrays_built,
        "built arrays"
    );

    let pipeline = HorPipeline::new(config.to_pipeline_config())?;
    let summary = pipeline.run(&arrays, &report)?;

    let metadata = OutputMetadata::new(&args.input, config.detection.clone())
        .with_counts(summary.arrays_processed, summary.arrays_skipped);
    let paths = write_tables(&summary, &config.output, &metadata)?;

    for path in &paths {
        info!(path = %path.display(), "wrote output table");
    }
    info!(
        hors = summary.hors.len(),
        large_duplications = summary.large_duplications.len(),
        "run complete"
    );

    Ok(())
}

fn apply_cli_overrides(manager: &mut ConfigManager, args: &Args) {
    let config = manager.config_mut();

    if let Some(v) = args.min_monomers {
        config.detection.min_monomers = v;
    }
    if let Some(v) = args.max_pattern_length {
        config.detection.max_pattern_length = v;
    }
    if let Some(v) = args.min_copies {
        config.detection.min_copies = v;
    }
    if let Some(v) = args.max_gap {
        config.detection.max_gap = v;
    }
    if let Some(v) = args.min_purity {
        config.detection.min_purity = v;
    }
    if let Some(v) = args.min_score {
        config.detection.min_score = v;
    }
    if let Some(v) = args.large_dup_threshold_kb {
        config.detection.large_dup_threshold_kb = v;
    }
    if let Some(v) = args.workers {
        config.pipeline.num_workers = v;
    }
    if let Some(prefix) = &args.output {
        config.output.file_prefix = prefix.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output.output_dir = Some(dir.clone());
    }
    if args.gzip {
        config.output.gzip = true;
    }
    if args.verbose {
        config.logging.level = horscan::logging::LogLevel::Debug;
    }
}
