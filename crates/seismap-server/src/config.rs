//! Service configuration: YAML file, command line and defaults.

use clap::{Args, Parser, Subcommand};
use seismap_grid::Bbox;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Deepest grid the service will build. The bottom rasters hold
/// `4^(nr_levels - 1)` cells per product.
pub const MAX_SERVICE_LEVELS: u32 = 12;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration of the tile service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP server listens on.
    pub bind: SocketAddr,

    /// Number of grid levels; the synthetic rasters cover the bottom level.
    pub nr_levels: u32,

    /// Geographic bounds of the root tile.
    pub bbox: Bbox,

    /// Seed for the synthetic rasters and refinement order.
    /// If None, one is drawn from entropy at startup.
    pub seed: Option<u64>,

    /// Tiles per side aimed for when a request has no `z`.
    pub target_tiles_per_side: u32,

    /// Time budget for refining the tiles of one response (milliseconds).
    /// Tiles not reached in time report their latest estimate unchanged.
    pub poll_deadline_ms: u64,

    /// Address of the Prometheus scrape endpoint, if any.
    pub metrics_bind: Option<SocketAddr>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            nr_levels: 10,
            bbox: Bbox::WORLD,
            seed: None,
            target_tiles_per_side: 8,
            poll_deadline_ms: 2000,
            metrics_bind: None,
        }
    }
}

impl ServiceConfig {
    /// Load a configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the configuration for values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nr_levels == 0 || self.nr_levels > MAX_SERVICE_LEVELS {
            return Err(ConfigError::Invalid(format!(
                "nr_levels must be 1-{}, got {}",
                MAX_SERVICE_LEVELS, self.nr_levels
            )));
        }
        self.bbox
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.bbox.width() <= 0.0 || self.bbox.height() <= 0.0 {
            return Err(ConfigError::Invalid(format!("bbox {} has zero area", self.bbox)));
        }
        if self.target_tiles_per_side == 0 {
            return Err(ConfigError::Invalid("target_tiles_per_side must be positive".to_string()));
        }
        Ok(())
    }
}

/// Seismic hazard tile server.
#[derive(Debug, Parser)]
#[command(name = "seismap", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve intensity, exposure and updated exposure tiles over HTTP.
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, overriding the configuration file.
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Number of grid levels, overriding the configuration file.
    #[arg(short, long)]
    pub levels: Option<u32>,

    /// Random seed, overriding the configuration file.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Log filter (e.g. "info", "seismap_pyramid=debug"). RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl ServeArgs {
    /// The effective configuration: file (or defaults) with flags applied on top.
    pub fn to_config(&self) -> Result<ServiceConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::load(path)?,
            None => ServiceConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(levels) = self.levels {
            config.nr_levels = levels;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}
