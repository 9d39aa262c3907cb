//! Layered configuration (SPEC_FULL.md §10.3): compiled-in defaults, a project-local
//! `.htmlindex/settings.json`, and `HTMLIDX_*` environment overrides, merged in
//! ascending priority into a flat `ResolvedIndexConfig`. Mirrors the three-tier
//! precedence this codebase already uses for its own configuration layer.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw, partially-specified configuration as read from a settings file. Every field is
/// optional so that a file only needs to mention what it overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub build: Option<BuildConfig>,
    #[serde(default)]
    pub retrieval: Option<RetrievalConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Spill every this many admitted documents (SPEC_FULL.md §4.5, default 15,000).
    pub spill_threshold: Option<usize>,
    /// SimHash Hamming distance threshold for near-duplicate detection (default 3).
    pub hamming_threshold: Option<u32>,
    /// Whether near-duplicates are excluded from indexing (default false).
    pub skip_duplicates: Option<bool>,
    /// Directory holding the on-disk index artifacts.
    pub index_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Default number of results returned by a query (default 20).
    pub top_k: Option<usize>,
    /// Multiplier applied to bigram/trigram score contributions (default 1.5).
    pub ngram_boost: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub log_level: Option<String>,
    pub json: Option<bool>,
}

/// Flat, `Option`-free configuration used by the rest of the crate after resolution.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub build: ResolvedBuildConfig,
    pub retrieval: ResolvedRetrievalConfig,
    pub logging: ResolvedLoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ResolvedBuildConfig {
    pub spill_threshold: usize,
    pub hamming_threshold: u32,
    pub skip_duplicates: bool,
    pub index_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ResolvedRetrievalConfig {
    pub top_k: usize,
    pub ngram_boost: f64,
}

#[derive(Debug, Clone)]
pub struct ResolvedLoggingConfig {
    pub log_level: String,
    pub json: bool,
}

impl IndexConfig {
    /// Loads and merges every config source in ascending priority order, applies
    /// environment overrides, and resolves defaults.
    pub fn load() -> Result<ResolvedConfig> {
        let mut merged = IndexConfig::default();
        for config in Self::load_all_configs()? {
            merged = Self::merge_configs(merged, config);
        }
        merged.apply_env_overrides();
        Ok(merged.resolve_with_defaults())
    }

    /// All configuration file paths, lowest to highest priority.
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".htmlindex").join("settings.json"));
        }

        paths.push(PathBuf::from(".htmlindex").join("settings.json"));

        if let Ok(custom_path) = env::var("HTMLIDX_CONFIG_PATH") {
            paths.push(PathBuf::from(custom_path));
        }

        paths
    }

    fn load_all_configs() -> Result<Vec<IndexConfig>> {
        let mut configs = Vec::new();
        for path in Self::get_config_paths() {
            match fs::metadata(&path) {
                Ok(metadata) if metadata.is_file() => {
                    configs.push(Self::load_from_file(&path)?);
                }
                _ => continue,
            }
        }
        Ok(configs)
    }

    fn load_from_file(path: &Path) -> Result<IndexConfig> {
        let contents = fs::read_to_string(path).context(format!("failed to read config file: {path:?}"))?;
        serde_json::from_str(&contents).context(format!("failed to parse config file: {path:?}"))
    }

    /// Merges `other` over `base`, with `other`'s present fields taking precedence.
    fn merge_configs(mut base: IndexConfig, other: IndexConfig) -> IndexConfig {
        if let Some(other_build) = other.build {
            let base_build = base.build.get_or_insert_with(BuildConfig::default);
            if other_build.spill_threshold.is_some() {
                base_build.spill_threshold = other_build.spill_threshold;
            }
            if other_build.hamming_threshold.is_some() {
                base_build.hamming_threshold = other_build.hamming_threshold;
            }
            if other_build.skip_duplicates.is_some() {
                base_build.skip_duplicates = other_build.skip_duplicates;
            }
            if other_build.index_dir.is_some() {
                base_build.index_dir = other_build.index_dir;
            }
        }
        if let Some(other_retrieval) = other.retrieval {
            let base_retrieval = base.retrieval.get_or_insert_with(RetrievalConfig::default);
            if other_retrieval.top_k.is_some() {
                base_retrieval.top_k = other_retrieval.top_k;
            }
            if other_retrieval.ngram_boost.is_some() {
                base_retrieval.ngram_boost = other_retrieval.ngram_boost;
            }
        }
        if let Some(other_logging) = other.logging {
            let base_logging = base.logging.get_or_insert_with(LoggingConfig::default);
            if other_logging.log_level.is_some() {
                base_logging.log_level = other_logging.log_level;
            }
            if other_logging.json.is_some() {
                base_logging.json = other_logging.json;
            }
        }
        base
    }

    /// Applies `HTMLIDX_*` environment variable overrides, highest precedence.
    fn apply_env_overrides(&mut self) {
        let build = self.build.get_or_insert_with(BuildConfig::default);
        if let Ok(v) = env::var("HTMLIDX_SPILL_THRESHOLD") {
            if let Ok(v) = v.parse() {
                build.spill_threshold = Some(v);
            }
        }
        if let Ok(v) = env::var("HTMLIDX_HAMMING_THRESHOLD") {
            if let Ok(v) = v.parse() {
                build.hamming_threshold = Some(v);
            }
        }
        if let Ok(v) = env::var("HTMLIDX_SKIP_DUPLICATES") {
            build.skip_duplicates = Some(v == "1" || v.eq_ignore_ascii_case("true"));
        }
        if let Ok(v) = env::var("HTMLIDX_INDEX_DIR") {
            build.index_dir = Some(PathBuf::from(v));
        }

        let retrieval = self.retrieval.get_or_insert_with(RetrievalConfig::default);
        if let Ok(v) = env::var("HTMLIDX_TOP_K") {
            if let Ok(v) = v.parse() {
                retrieval.top_k = Some(v);
            }
        }
        if let Ok(v) = env::var("HTMLIDX_NGRAM_BOOST") {
            if let Ok(v) = v.parse() {
                retrieval.ngram_boost = Some(v);
            }
        }

        let logging = self.logging.get_or_insert_with(LoggingConfig::default);
        if let Ok(v) = env::var("HTMLIDX_LOG_LEVEL") {
            logging.log_level = Some(v);
        }
        if let Ok(v) = env::var("HTMLIDX_LOG_JSON") {
            logging.json = Some(v == "1" || v.eq_ignore_ascii_case("true"));
        }
    }

    fn resolve_with_defaults(self) -> ResolvedConfig {
        let build = self.build.unwrap_or_default();
        let retrieval = self.retrieval.unwrap_or_default();
        let logging = self.logging.unwrap_or_default();

        ResolvedConfig {
            build: ResolvedBuildConfig {
                spill_threshold: build.spill_threshold.unwrap_or(15_000),
                hamming_threshold: build.hamming_threshold.unwrap_or(3),
                skip_duplicates: build.skip_duplicates.unwrap_or(false),
                index_dir: build.index_dir.unwrap_or_else(|| PathBuf::from("./index")),
            },
            retrieval: ResolvedRetrievalConfig {
                top_k: retrieval.top_k.unwrap_or(20),
                ngram_boost: retrieval.ngram_boost.unwrap_or(1.5),
            },
            logging: ResolvedLoggingConfig {
                log_level: logging.log_level.unwrap_or_else(|| "info".to_string()),
                json: logging.json.unwrap_or(false),
            },
        }
    }
}

/// Process-wide resolved configuration, loaded on first access.
pub fn get_config() -> &'static ResolvedConfig {
    use std::sync::OnceLock;
    static CONFIG: OnceLock<ResolvedConfig> = OnceLock::new();
    CONFIG.get_or_init(|| IndexConfig::load().unwrap_or_else(|_| IndexConfig::default().resolve_with_defaults()))
}
