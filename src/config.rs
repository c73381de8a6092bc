use crate::domains::editor::EditorSettings;
use crate::domains::greenhouse::GreenhouseConfig;
use crate::domains::logger::LogLevel;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `GREENHOUSE__EDITOR__STEP_SIZE=0.01`.
pub const ENV_PREFIX: &str = "GREENHOUSE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorSettings,
    /// Greenhouse the editor starts with.
    pub greenhouse: GreenhouseConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
    /// Editor log file written through `fast_log`. Console only when unset.
    pub file: Option<String>,
    pub file_level: LogLevel,
    /// Queue size of the non-blocking domain logger.
    pub buffer_capacity: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            file_level: LogLevel::Info,
            buffer_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for saved maps; `GREENHOUSE_MAP_DIR` takes precedence.
    pub map_dir: String,
    pub command_buffer: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            map_dir: "maps".to_string(),
            command_buffer: 64,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file at `path` if it exists, then `GREENHOUSE__*` variables.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file directly, without environment overrides.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.editor
            .validate()
            .map_err(|e| anyhow!("invalid [editor] settings: {}", e))?;
        self.greenhouse
            .validate()
            .map_err(|e| anyhow!("invalid [greenhouse] settings: {}", e))?;
        Ok(())
    }
}
