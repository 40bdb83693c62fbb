//! Configuration for package extraction
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (registry-metadata.toml)
//! - Environment variables (REGISTRY_METADATA__*)
//!
//! ## Example config file (registry-metadata.toml):
//! ```toml
//! [ingestion]
//! max_package_size_gib = 8
//!
//! [output]
//! format = "compact"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

const BYTES_PER_GIB: u64 = 1024 * 1024 * 1024;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Ingestion limits
    #[serde(default)]
    pub ingestion: IngestionConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Packages larger than this are rejected
    #[serde(default = "default_max_package_size_gib")]
    pub max_package_size_gib: u32,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_max_package_size_gib() -> u32 {
    8
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_package_size_gib: default_max_package_size_gib(),
        }
    }
}

impl MetadataConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "registry-metadata.toml",
            ".registry-metadata.toml",
            "config/registry-metadata.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "registry-metadata") {
            let xdg_config = config_dir.config_dir().join("registry-metadata.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("REGISTRY_METADATA")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Maximum package size in bytes
    pub fn max_package_size_bytes(&self) -> u64 {
        u64::from(self.ingestion.max_package_size_gib) * BYTES_PER_GIB
    }
}
