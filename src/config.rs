//! Configuration management for horscan
//!
//! Loads configuration from TOML/YAML/JSON files, applies `HORSCAN_*`
//! environment overrides, and offers built-in profiles for the two common
//! ways this tool gets run: strict (publication-grade calls) and sensitive
//! (exploratory scans of noisy reads).

use crate::error::{HorScanError, Result};
use crate::logging::{LogLevel, LoggingConfig};
use crate::pipeline::PipelineConfig;
use crate::scan::ScanParams;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Main configuration structure for horscan
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HorScanConfig {
    pub logging: LoggingConfig,
    pub detection: DetectionSettings,
    pub pipeline: PipelineSettings,
    pub output: OutputSettings,
}

/// Detection thresholds, the knobs of the core algorithm
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct DetectionSettings {
    /// Minimum monomers per repeat unit
    #[validate(range(min = 1, max = 64))]
    pub min_monomers: usize,

    /// Maximum monomers per repeat unit
    #[validate(range(min = 1, max = 256))]
    pub max_pattern_length: usize,

    /// Minimum consecutive unit copies
    #[validate(range(min = 1, max = 1000))]
    pub min_copies: usize,

    /// Maximum allowed gap between adjacent monomers, in bp
    pub max_gap: u64,

    /// Minimum purity of an accepted run
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_purity: f64,

    /// Minimum composite quality score of an accepted run
    #[validate(range(min = 0.0, max = 100.0))]
    pub min_score: f64,

    /// Minimum genomic span for the large-duplication table, in kb
    #[validate(range(min = 0.001))]
    pub large_dup_threshold_kb: f64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        let params = ScanParams::default();
        Self {
            min_monomers: params.min_monomers,
            max_pattern_length: params.max_pattern_length,
            min_copies: params.min_copies,
            max_gap: params.max_gap,
            min_purity: params.min_purity,
            min_score: params.min_score,
            large_dup_threshold_kb: 40.0,
        }
    }
}

impl DetectionSettings {
    pub fn to_scan_params(&self) -> ScanParams {
        ScanParams {
            min_monomers: self.min_monomers,
            max_pattern_length: self.max_pattern_length,
            min_copies: self.min_copies,
            max_gap: self.max_gap,
            min_purity: self.min_purity,
            min_score: self.min_score,
        }
    }
}

/// Pipeline execution settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    /// Worker threads for the cross-array map (0 = global rayon pool)
    #[validate(range(min = 0, max = 256))]
    pub num_workers: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { num_workers: 0 }
    }
}

/// Output location and format settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    /// Output directory (current directory when unset)
    pub output_dir: Option<PathBuf>,
    /// Output file prefix
    pub file_prefix: String,
    /// Gzip-compress the output tables
    pub gzip: bool,
    /// Include `#`-prefixed metadata headers in the tables
    pub include_metadata: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_prefix: "horscan".to_string(),
            gzip: false,
            include_metadata: true,
        }
    }
}

impl HorScanConfig {
    /// Validate field ranges and the cross-field parameter rules
    pub fn validate(&self) -> Result<()> {
        self.detection
            .validate()
            .map_err(|e| HorScanError::config(format!("detection settings: {}", e)))?;
        self.pipeline
            .validate()
            .map_err(|e| HorScanError::config(format!("pipeline settings: {}", e)))?;
        // Range checks cannot express max_pattern_length >= min_monomers
        self.detection.to_scan_params().validate()?;
        Ok(())
    }

    /// Assemble the pipeline configuration
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            params: self.detection.to_scan_params(),
            large_dup_threshold_kb: self.detection.large_dup_threshold_kb,
            num_workers: self.pipeline.num_workers,
        }
    }
}

/// A named configuration preset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigProfile {
    pub name: String,
    pub description: String,
    pub config: HorScanConfig,
}

/// Configuration manager: current config plus the built-in profiles
pub struct ConfigManager {
    config: HorScanConfig,
    profiles: HashMap<String, ConfigProfile>,
}

impl ConfigManager {
    pub fn new() -> Self {
        let mut manager = Self {
            config: HorScanConfig::default(),
            profiles: HashMap::new(),
        };
        manager.load_builtin_profiles();
        manager
    }

    /// Load configuration from a file, format selected by extension
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| HorScanError::config(format!("failed to read config file: {}", e)))?;

        let config: HorScanConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| HorScanError::config(format!("TOML parse error: {}", e)))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| HorScanError::config(format!("YAML parse error: {}", e)))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| HorScanError::config(format!("JSON parse error: {}", e)))?,
            _ => {
                return Err(HorScanError::config(
                    "unsupported config file format, use .toml, .yaml, .yml, or .json",
                ))
            }
        };

        config.validate()?;

        let mut manager = Self {
            config,
            profiles: HashMap::new(),
        };
        manager.load_builtin_profiles();
        Ok(manager)
    }

    /// Apply `HORSCAN_*` environment variable overrides
    pub fn load_from_env(&mut self) -> Result<()> {
        if let Ok(workers) = env::var("HORSCAN_WORKERS") {
            self.config.pipeline.num_workers = workers
                .parse()
                .map_err(|e| HorScanError::config(format!("invalid HORSCAN_WORKERS: {}", e)))?;
        }

        if let Ok(level) = env::var("HORSCAN_LOG_LEVEL") {
            self.config.logging.level = LogLevel::parse(&level)?;
        }

        if let Ok(json_logs) = env::var("HORSCAN_JSON_LOGS") {
            self.config.logging.json_format = json_logs
                .parse()
                .map_err(|e| HorScanError::config(format!("invalid HORSCAN_JSON_LOGS: {}", e)))?;
        }

        if let Ok(output_dir) = env::var("HORSCAN_OUTPUT_DIR") {
            self.config.output.output_dir = Some(PathBuf::from(output_dir));
        }

        self.config.validate()
    }

    /// Replace the current configuration with a named profile
    pub fn apply_profile(&mut self, profile_name: &str) -> Result<()> {
        let profile = self
            .profiles
            .get(profile_name)
            .ok_or_else(|| HorScanError::config(format!("unknown profile: {}", profile_name)))?
            .clone();

        self.config = profile.config;
        self.config.validate()
    }

    pub fn config(&self) -> &HorScanConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut HorScanConfig {
        &mut self.config
    }

    pub fn list_profiles(&self) -> Vec<&str> {
        self.profiles.keys().map(|s| s.as_str()).collect()
    }

    pub fn profile_description(&self, name: &str) -> Option<&str> {
        self.profiles.get(name).map(|p| p.description.as_str())
    }

    /// Save the current configuration, format selected by extension
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::to_string_pretty(&self.config)
                .map_err(|e| HorScanError::config(format!("TOML serialize error: {}", e)))?,
            Some("yaml") | Some("yml") => serde_yaml::to_string(&self.config)
                .map_err(|e| HorScanError::config(format!("YAML serialize error: {}", e)))?,
            Some("json") => serde_json::to_string_pretty(&self.config)
                .map_err(|e| HorScanError::config(format!("JSON serialize error: {}", e)))?,
            _ => {
                return Err(HorScanError::config(
                    "unsupported config file format, use .toml, .yaml, .yml, or .json",
                ))
            }
        };

        std::fs::write(path, content)
            .map_err(|e| HorScanError::io_error(format!("failed to write config file: {}", e)))
    }

    fn load_builtin_profiles(&mut self) {
        // Strict mode: fewer, cleaner calls for assembly-grade input
        let strict = ConfigProfile {
            name: "strict".to_string(),
            description: "High-confidence calls with tight purity and score gates".to_string(),
            config: HorScanConfig {
                detection: DetectionSettings {
                    min_purity: 0.95,
                    min_score: 60.0,
                    max_gap: 200,
                    ..Default::default()
                },
                ..Default::default()
            },
        };

        // Sensitive mode: tolerate noisy classification on raw reads
        let sensitive = ConfigProfile {
            name: "sensitive".to_string(),
            description: "Exploratory scanning of noisy reads with relaxed gates".to_string(),
            config: HorScanConfig {
                detection: DetectionSettings {
                    min_purity: 0.8,
                    min_score: 40.0,
                    max_gap: 1000,
                    ..Default::default()
                },
                ..Default::default()
            },
        };

        self.profiles.insert(strict.name.clone(), strict);
        self.profiles.insert(sensitive.name.clone(), sensitive);
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
