use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

/// Maximum number of reachability checks in flight at once
pub const DEFAULT_MAX_CONCURRENT_CHECKS: usize = 10;

/// Per-probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Records whose type starts with this token are never probed
pub const DEFAULT_BYPASS_CATEGORY: &str = "Traffic";

/// Fixed output file, written to the current working directory
pub const OUTPUT_FILE_NAME: &str = "deduplicatedCameras.xml";

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Read-only settings for one run, decided at startup
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Whether camera URLs are probed at all
    pub verify: bool,
    pub max_concurrent_checks: usize,
    pub probe_timeout: Duration,
    pub bypass_category: String,
    pub output_file: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            verify: false,
            max_concurrent_checks: DEFAULT_MAX_CONCURRENT_CHECKS,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            bypass_category: DEFAULT_BYPASS_CATEGORY.to_string(),
            output_file: PathBuf::from(OUTPUT_FILE_NAME),
        }
    }
}

impl PipelineConfig {
    pub fn with_verify(verify: bool) -> Self {
        Self {
            verify,
            ..Default::default()
        }
    }
}

/// Configuration manager for layering environment overrides on defaults
pub struct ConfigManager;

impl ConfigManager {
    /// Build the run configuration: defaults -> environment -> validation
    pub fn load_config(verify: bool) -> ConfigResult<PipelineConfig> {
        Self::load_config_with(&SystemEnvProvider, verify)
    }

    /// Build the run configuration against a custom environment provider
    pub fn load_config_with(env: &impl EnvProvider, verify: bool) -> ConfigResult<PipelineConfig> {
        let config =
            Self::apply_environment_overrides_with(env, PipelineConfig::with_verify(verify))?;
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: PipelineConfig) -> ConfigResult<PipelineConfig> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    ///
    /// The overrides exist for diagnosing slow or flaky networks. Without them the pool size
    /// and probe timeout are the fixed defaults.
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: PipelineConfig,
    ) -> ConfigResult<PipelineConfig> {
        if let Some(workers) = env.get("CAMERA_DEDUP_WORKERS") {
            config.max_concurrent_checks = workers.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid CAMERA_DEDUP_WORKERS value: {}", workers))
            })?;
            warn!(
                workers = config.max_concurrent_checks,
                "CAMERA_DEDUP_WORKERS overrides the default pool size"
            );
        }

        if let Some(timeout) = env.get("CAMERA_DEDUP_TIMEOUT") {
            let seconds: u64 = timeout.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid CAMERA_DEDUP_TIMEOUT value: {}", timeout))
            })?;
            config.probe_timeout = Duration::from_secs(seconds);
            warn!(seconds, "CAMERA_DEDUP_TIMEOUT overrides the default probe timeout");
        }

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate_config(config: &PipelineConfig) -> ConfigResult<()> {
        if config.max_concurrent_checks == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_checks".to_string(),
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if config.probe_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "probe_timeout".to_string(),
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
