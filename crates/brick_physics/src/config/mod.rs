//! Configuration system
//!
//! Physical constants are compile-time values in
//! [`crate::physics::constants`]; what lives here are the knobs of the
//! reference tick driver, loadable from TOML or RON.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        Self::from_str_with_format(&contents, path)
    }

    /// Parse configuration text, picking the format from `path`'s extension
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of its allowed range
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// # Simulation Configuration
///
/// Tunables of [`crate::physics::PhysicsWorld`]. None of these change the
/// collision math; they only decide how often the driver runs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Check/Bounce/Separate passes per tick
    pub resolution_passes: u32,
    /// Whether bodies are resolved against the brick world
    pub resolve_bricks: bool,
    /// Default log filter applied by [`SimulationConfig::init_logging`]
    pub log_level: String,
}

impl SimulationConfig {
    /// Create a new simulation configuration
    pub fn new() -> Self {
        Self {
            resolution_passes: 3,
            resolve_bricks: true,
            log_level: "warn".to_string(),
        }
    }

    /// Set the number of resolution passes per tick
    pub fn with_resolution_passes(mut self, passes: u32) -> Self {
        self.resolution_passes = passes;
        self
    }

    /// Enable or disable brick resolution
    pub fn with_bricks(mut self, enabled: bool) -> Self {
        self.resolve_bricks = enabled;
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Install the `env_logger` backend with `log_level` as the default
    /// filter. `RUST_LOG` still wins when set; calls after the first are ignored.
    pub fn init_logging(&self) {
        crate::foundation::logging::init_with_level(&self.log_level);
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution_passes == 0 {
            return Err(ConfigError::Invalid("resolution_passes must be at least 1".to_string()));
        }
        if self.resolution_passes > 32 {
            return Err(ConfigError::Invalid(
                "resolution_passes should not exceed 32 for a real-time tick".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for SimulationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let text = "resolution_passes = 5\nresolve_bricks = false\n";
        let config = SimulationConfig::from_str_with_format(text, "sim.toml").unwrap();

        assert_eq!(config.resolution_passes, 5);
        assert!(!config.resolve_bricks);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_parse_ron() {
        let text = "(resolution_passes: 2, log_level: \"debug\")";
        let config = SimulationConfig::from_str_with_format(text, "sim.ron").unwrap();

        assert_eq!(config.resolution_passes, 2);
        assert!(config.resolve_bricks);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_unsupported_format() {
        let result = SimulationConfig::from_str_with_format("", "sim.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip_on_disk() {
        let path = std::env::temp_dir().join("brick_physics_sim_config_test.toml");
        let path = path.to_string_lossy().to_string();
        let config = SimulationConfig::new().with_resolution_passes(7);

        config.save_to_file(&path).unwrap();
        let loaded = SimulationConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        let config = SimulationConfig::new().with_log_level("debug");
        config.init_logging();
        config.init_logging();
        log::debug!("logging initialised from {:?}", config.log_level);
    }

    #[test]
    fn test_validate_rejects_zero_passes() {
        let config = SimulationConfig::new().with_resolution_passes(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(SimulationConfig::default().validate().is_ok());
    }
}
