//! Nimlab Run Configuration
//!
//! Handles parsing and management of nimlab.toml configuration files.
//!
//! ```toml
//! [run]
//! seed = 42
//! n_train = 10000
//! n_eval = 1000
//! sampling = "per_variant"
//!
//! [[variants]]
//! game = "nim"
//! max_remove = 3
//! max_coins = 400
//!
//! [[variants]]
//! game = "wythoff"
//! max_pile_size = 30
//!
//! [naming]
//! policy = "shortcut"
//! target = 2
//! occurrences = 2
//! palette = [["Alice", "Bob"], ["Eve", "Frank"]]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::assemble::{AssemblerConfig, VariantSampling, DEFAULT_MAX_CONSECUTIVE_DUPLICATES};
use crate::game::RulesConfig;
use crate::naming::NamingPolicy;

/// File name searched for by [`NimlabConfig::find_and_load`].
pub const CONFIG_FILE: &str = "nimlab.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching nimlab.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NimlabConfig {
    /// Run-wide settings
    #[serde(default)]
    pub run: RunConfig,

    /// Game variants to draw from
    #[serde(default = "default_variants")]
    pub variants: Vec<RulesConfig>,

    /// Player and vocabulary policy
    #[serde(default)]
    pub naming: NamingPolicy,
}

fn default_variants() -> Vec<RulesConfig> {
    vec![RulesConfig::nim(3, 400)]
}

impl Default for NimlabConfig {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            variants: default_variants(),
            naming: NamingPolicy::default(),
        }
    }
}

impl NimlabConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: NimlabConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    ///
    /// Falls back to the defaults when no file exists up to the root.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                return Ok(Self::default());
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Assembler settings for this configuration.
    pub fn assembler_config(&self) -> AssemblerConfig {
        AssemblerConfig {
            variants: self.variants.clone(),
            sampling: self.run.sampling,
            n_train: self.run.n_train,
            n_eval: self.run.n_eval,
            seed: self.run.seed,
            naming: self.naming.clone(),
            max_consecutive_duplicates: self.run.max_consecutive_duplicates,
        }
    }

    /// Directory the dataset files are written to.
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.run.output_dir)
    }
}

/// Run-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Seed of the run's only RNG
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Unique training examples
    #[serde(default = "default_n_train")]
    pub n_train: usize,

    /// Unique evaluation examples, disjoint from training prompts
    #[serde(default = "default_n_eval")]
    pub n_eval: usize,

    /// How examples are spread over variants
    #[serde(default)]
    pub sampling: VariantSampling,

    /// Output directory
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File name prefix: `{prefix}_train.jsonl`, `{prefix}_eval.jsonl`
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Consecutive duplicate prompts tolerated before the run fails
    #[serde(default = "default_max_consecutive_duplicates")]
    pub max_consecutive_duplicates: u64,
}

fn default_seed() -> u64 {
    42
}

fn default_n_train() -> usize {
    10_000
}

fn default_n_eval() -> usize {
    1_000
}

fn default_output_dir() -> String {
    "data".to_string()
}

fn default_prefix() -> String {
    "nim".to_string()
}

fn default_max_consecutive_duplicates() -> u64 {
    DEFAULT_MAX_CONSECUTIVE_DUPLICATES
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            n_train: default_n_train(),
            n_eval: default_n_eval(),
            sampling: VariantSampling::default(),
            output_dir: default_output_dir(),
            prefix: default_prefix(),
            max_consecutive_duplicates: default_max_consecutive_duplicates(),
        }
    }
}
