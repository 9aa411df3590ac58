//! Layered application configuration.
//!
//! Settings are merged in this order, later layers winning:
//!
//! 1. built-in defaults
//! 2. TOML file (`--config`, or `config.toml` in the platform config directory)
//! 3. environment variables prefixed with `DEDUP_DRIVE_` (e.g. `DEDUP_DRIVE_WORKERS=4`)
//! 4. command-line flags
//!
//! ```toml
//! workers = 8
//! algorithm = "sha256"
//! follow_symlinks = false
//! trash = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::DeleteConfig;
use crate::cli::Cli;
use crate::duplicates::{FinderConfig, DEFAULT_WORKERS};
use crate::scanner::{DigestAlgorithm, WalkerConfig};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DEDUP_DRIVE_";

/// Errors raised while building the run configuration. All are fatal.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// No root directory was given.
    #[error("Must specify --directory")]
    MissingDirectory,

    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    /// A layer could not be parsed or had the wrong shape.
    #[error("Invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// The worker count was zero.
    #[error("workers must be at least 1")]
    ZeroWorkers,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of hashing workers.
    pub workers: usize,
    /// Content digest algorithm.
    pub algorithm: DigestAlgorithm,
    /// Follow symbolic links while scanning.
    pub follow_symlinks: bool,
    /// Move duplicates to the trash instead of removing them.
    pub trash: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            algorithm: DigestAlgorithm::default(),
            follow_symlinks: false,
            trash: false,
        }
    }
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// With `path` set the file must exist. Without it the platform default
    /// is used when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing or any layer is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
        }

        let file = path.map(Path::to_path_buf).or_else(Self::default_path);
        let config: Self = Self::figment(file.as_deref())
            .extract()
            .map_err(Box::new)?;

        config.validate()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Build the provider stack without extracting it.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            log::debug!("Reading config file {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dedup-drive", "dedup-drive")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line overrides on top of the loaded layers.
    #[must_use]
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(workers) = cli.workers {
            self.workers = workers;
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if cli.follow_symlinks {
            self.follow_symlinks = true;
        }
        if cli.trash {
            self.trash = true;
        }
        self
    }

    /// Check values the type system does not rule out.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWorkers`] if `workers` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Engine configuration for this run.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_workers(self.workers)
            .with_algorithm(self.algorithm)
            .with_walker_config(WalkerConfig::new(self.follow_symlinks))
    }

    /// Deletion configuration for this run.
    #[must_use]
    pub fn delete_config(&self) -> DeleteConfig {
        DeleteConfig { trash: self.trash }
    }
}
