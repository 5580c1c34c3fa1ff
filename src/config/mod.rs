// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File};
use tracing_subscriber::EnvFilter;

use crate::model::device::DevicePreference;
use crate::predict::GenerationParams;

pub mod presets;

pub use presets::{get_config, GradientCheckpointing, Mode, ModelConfig, Precision};

/// Instruction used when the user does not type one.
pub const DEFAULT_INSTRUCTION: &str =
    "You are an expert radiographer. Describe accurately what you see in this image";

/// Which model preset to load
#[derive(Debug, Deserialize, Clone)]
pub struct ModelSettings {
    /// Mode selector, `inference` or `finetuning`. Unknown values load the
    /// inference preset.
    pub mode: String,
}

/// Where the interactive driver looks for images
#[derive(Debug, Deserialize, Clone)]
pub struct ImageSettings {
    /// Directory scanned for the image menu
    pub directory: PathBuf,
    /// Extension appended to the chosen image name
    pub extension: String,
    /// Instruction used when the prompt is left blank
    pub default_instruction: String,
}

impl ImageSettings {
    /// Path of the image file for a menu name, `<directory>/<name>.<extension>`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", name, self.extension))
    }
}

/// Compute device selection
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceSettings {
    /// auto, cpu, cuda or metal
    pub preference: DevicePreference,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace) or a filter directive such
    /// as `radigenius=debug,mistralrs=warn`
    pub level: String,
    /// Directory for the daily rolling log files
    pub directory: PathBuf,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Model preset selection
    pub model: ModelSettings,
    /// Image directory settings
    pub images: ImageSettings,
    /// Decoding parameters
    pub generation: GenerationParams,
    /// Compute device settings
    pub device: DeviceSettings,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

impl Settings {
    /// Creates a new Settings instance from the `config` directory under the
    /// current working directory.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(
                format!("Failed to get current directory: {}", e)
            ))?
            .join("config");

        Self::load_from(&config_dir)
    }

    /// Loads settings from multiple sources in the following order of
    /// precedence (highest to lowest):
    /// 1. Environment variables prefixed with RADIGENIUS_ (nested keys use `__`)
    /// 2. Local config file (local.toml) if present
    /// 3. Default config file (default.toml) if present
    /// 4. Built-in defaults
    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let default_config = config_dir.join("default.toml");
        let local_config = config_dir.join("local.toml");

        let defaults = GenerationParams::default();

        let settings = Config::builder()
            .set_default("model.mode", "inference")?
            .set_default("images.directory", "images")?
            .set_default("images.extension", "jpg")?
            .set_default("images.default_instruction", DEFAULT_INSTRUCTION)?
            .set_default("generation.max_new_tokens", defaults.max_new_tokens as i64)?
            .set_default("generation.temperature", defaults.temperature as f64)?
            .set_default("generation.min_p", defaults.min_p as f64)?
            .set_default("device.preference", "auto")?
            .set_default("logging.level", "info")?
            .set_default("logging.directory", "logs")?
            .add_source(File::from(default_config).required(false))
            .add_source(File::from(local_config).required(false))
            .add_source(
                Environment::with_prefix("RADIGENIUS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Selected model mode
    pub fn mode(&self) -> Mode {
        Mode::from_selector(Some(&self.model.mode))
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.max_new_tokens == 0 {
            return Err(ConfigError::Message(
                "max_new_tokens must be greater than 0".to_string()
            ));
        }

        if !self.generation.temperature.is_finite() || self.generation.temperature < 0.0 {
            return Err(ConfigError::Message(
                format!("Temperature must be a non-negative number, got: {}", self.generation.temperature)
            ));
        }

        if !(0.0..=1.0).contains(&self.generation.min_p) {
            return Err(ConfigError::Message(
                format!("min_p must be between 0.0 and 1.0, got: {}", self.generation.min_p)
            ));
        }

        if self.images.extension.trim().is_empty() {
            return Err(ConfigError::Message(
                "images.extension must not be empty".to_string()
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Message("logging.level must not be empty".to_string()));
        }

        EnvFilter::try_new(&self.logging.level).map_err(|e| ConfigError::Message(
            format!("Invalid logging level or filter '{}': {}", self.logging.level, e)
        ))?;

        Ok(())
    }
}
