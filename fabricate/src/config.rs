//! Configuration types for seeding pipelines and tuning retry and uniqueness behavior.

use std::cell::RefCell;

/// Default number of attempts a filter makes before giving up
pub const DEFAULT_FILTER_THRESHOLD: usize = 10_000;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid filter threshold (must be > 0)
    #[error("Invalid filter threshold: {0} (must be > 0)")]
    InvalidFilterThreshold(usize),
    /// A configuration document could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
    /// A configuration file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(String),
}

/// Configuration for a generation pipeline
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeneratorConfig {
    /// Seed for the pipeline's random source; `None` draws from entropy
    pub seed: Option<u64>,
    /// Maximum attempts a filter makes per draw
    pub filter_threshold: usize,
    /// Whether capacity-limited builders track issued values
    pub unique_tracking: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            filter_threshold: DEFAULT_FILTER_THRESHOLD,
            unique_tracking: true,
        }
    }
}

impl GeneratorConfig {
    /// Create a new generator configuration with validation
    pub fn new(
        seed: Option<u64>,
        filter_threshold: usize,
        unique_tracking: bool,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            seed,
            filter_threshold,
            unique_tracking,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration pinned to a seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Validate the generator configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filter_threshold == 0 {
            return Err(ConfigError::InvalidFilterThreshold(self.filter_threshold));
        }
        Ok(())
    }

    /// Merge this configuration with a global configuration, with this config taking precedence
    /// for non-default values
    pub fn merge_with(self, global: &GlobalConfig) -> Self {
        let fallback = &global.generator_config;
        Self {
            seed: self.seed.or(global.default_seed).or(fallback.seed),
            filter_threshold: if self.filter_threshold != DEFAULT_FILTER_THRESHOLD {
                self.filter_threshold
            } else {
                fallback.filter_threshold
            },
            unique_tracking: self.unique_tracking && fallback.unique_tracking,
        }
    }

    /// Create a configuration from global defaults with optional overrides
    pub fn from_global_with_overrides(
        global: &GlobalConfig,
        seed: Option<u64>,
        filter_threshold: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            seed: seed.or(global.default_seed),
            filter_threshold: filter_threshold
                .unwrap_or(global.generator_config.filter_threshold),
            unique_tracking: global.generator_config.unique_tracking,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a JSON document
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    #[cfg(feature = "serde")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&contents)
    }
}

/// Global configuration for default pipeline behavior
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalConfig {
    /// Default seed applied to configurations that carry none
    pub default_seed: Option<u64>,
    /// Default generator configuration
    pub generator_config: GeneratorConfig,
}

impl GlobalConfig {
    /// Create a new global configuration with validation
    pub fn new(
        default_seed: Option<u64>,
        generator_config: GeneratorConfig,
    ) -> Result<Self, ConfigError> {
        generator_config.validate()?;
        Ok(Self {
            default_seed,
            generator_config,
        })
    }

    /// Validate the global configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator_config.validate()
    }
}

/// Holder for the global configuration
pub struct ConfigManager {
    global_config: GlobalConfig,
}

impl ConfigManager {
    /// Create a new configuration manager with default global configuration
    pub fn new() -> Self {
        Self {
            global_config: GlobalConfig::default(),
        }
    }

    /// Create a new configuration manager with custom global configuration
    pub fn with_global_config(global_config: GlobalConfig) -> Result<Self, ConfigError> {
        global_config.validate()?;
        Ok(Self { global_config })
    }

    /// Get the current global configuration
    pub fn global_config(&self) -> &GlobalConfig {
        &self.global_config
    }

    /// Update the global configuration
    pub fn set_global_config(&mut self, global_config: GlobalConfig) -> Result<(), ConfigError> {
        global_config.validate()?;
        self.global_config = global_config;
        Ok(())
    }

    /// Create a generator configuration that inherits from global defaults
    pub fn create_generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::from_global_with_overrides(&self.global_config, None, None)
            .unwrap_or_default()
    }

    /// Create a generator configuration with specific overrides
    pub fn create_generator_config_with_overrides(
        &self,
        seed: Option<u64>,
        filter_threshold: Option<usize>,
    ) -> Result<GeneratorConfig, ConfigError> {
        GeneratorConfig::from_global_with_overrides(&self.global_config, seed, filter_threshold)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

// Pipelines are single-threaded, so the manager lives per thread.
thread_local! {
    static CONFIG_MANAGER: RefCell<ConfigManager> = RefCell::new(ConfigManager::new());
}

/// Get the current global configuration
pub fn get_global_config() -> GlobalConfig {
    CONFIG_MANAGER.with(|manager| manager.borrow().global_config().clone())
}

/// Set the global configuration
pub fn set_global_config(config: GlobalConfig) -> Result<(), ConfigError> {
    config.validate()?;
    CONFIG_MANAGER.with(|manager| manager.borrow_mut().set_global_config(config))
}

/// Create a generator configuration that inherits from global defaults
pub fn create_generator_config() -> GeneratorConfig {
    CONFIG_MANAGER.with(|manager| manager.borrow().create_generator_config())
}

/// Create a generator configuration with specific overrides
pub fn create_generator_config_with_overrides(
    seed: Option<u64>,
    filter_threshold: Option<usize>,
) -> Result<GeneratorConfig, ConfigError> {
    CONFIG_MANAGER.with(|manager| {
        manager
            .borrow()
            .create_generator_config_with_overrides(seed, filter_threshold)
    })
}
