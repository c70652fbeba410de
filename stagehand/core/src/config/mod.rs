//! TOML Configuration File Support
//!
//! Hosts describe their tick rate and a catalogue of named transitions in a
//! TOML file at `~/.config/stagehand/stagehand.toml`. Each named entry can be
//! turned into a fresh transition with [`StageConfig::build_transition`].
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables (`STAGEHAND_TPS`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/stagehand/stagehand.toml` (typically `~/.config/stagehand/stagehand.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [stage]
//! ticks_per_second = 60
//!
//! [transitions.intro]
//! effect = "fade"
//! factor = 0.05
//!
//! [transitions.swipe]
//! effect = "slide"
//! duration_ms = 800
//! pacing = "elapsed"
//! direction = "right-to-left"
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::SharedClock;
use crate::transition::{FadeTransition, Pacing, SlideDirection, SlideTransition, TransitionRef};

/// Environment variable overriding the tick rate
pub const TPS_ENV_VAR: &str = "STAGEHAND_TPS";

/// Tick rate used when nothing else sets one
pub const DEFAULT_TICKS_PER_SECOND: f64 = 60.0;

/// Fastest accepted tick rate; keeps the tick interval at one millisecond or more
pub const MAX_TICKS_PER_SECOND: f64 = 1000.0;

/// Tick interval for `tps`, or why the rate is unusable
fn interval_for(tps: f64) -> Result<Duration, String> {
    if !tps.is_finite() || tps <= 0.0 {
        return Err(format!("ticks_per_second must be a positive number, got {tps}"));
    }
    if tps > MAX_TICKS_PER_SECOND {
        return Err(format!(
            "ticks_per_second must be at most {MAX_TICKS_PER_SECOND}, got {tps}"
        ));
    }
    Duration::try_from_secs_f64(1.0 / tps)
        .map_err(|_| format!("ticks_per_second {tps} gives an unrepresentable tick interval"))
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Visual effect of a configured transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionEffect {
    /// Fade through black
    Fade,
    /// Slide the scenes past each other
    Slide,
}

/// How a duration-based transition measures its progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacingMode {
    /// Elapsed time on the clock
    #[default]
    Elapsed,
    /// A per-step factor derived from the tick rate
    Ticks,
}

/// Stage section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSectionToml {
    /// Host tick rate
    pub ticks_per_second: Option<f64>,
}

/// One `[transitions.<name>]` entry of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionToml {
    /// Which effect to build
    pub effect: Option<TransitionEffect>,

    /// Progress added per step
    pub factor: Option<f64>,

    /// Total duration in milliseconds
    pub duration_ms: Option<u64>,

    /// How a duration is measured
    pub pacing: Option<PacingMode>,

    /// Direction of travel (slides only)
    pub direction: Option<SlideDirection>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageToml {
    /// Stage configuration section
    pub stage: StageSectionToml,

    /// Named transitions
    pub transitions: BTreeMap<String, TransitionToml>,
}

// =============================================================================
// Transition Specs
// =============================================================================

/// How fast a configured transition runs
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionTiming {
    /// Fixed increment per step
    Factor(f64),
    /// Fixed total duration
    Duration {
        /// Total duration across all phases
        duration: Duration,
        /// How the duration is measured
        pacing: PacingMode,
    },
}

/// A validated transition entry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionSpec {
    /// Which effect to build
    pub effect: TransitionEffect,

    /// How fast it runs
    pub timing: TransitionTiming,

    /// Direction of travel; ignored by fades
    pub direction: SlideDirection,
}

impl TransitionSpec {
    /// Build a fresh transition from this entry
    ///
    /// `ticks_per_second` is only consulted for [`PacingMode::Ticks`] and
    /// `clock` only for [`PacingMode::Elapsed`].
    #[must_use]
    pub fn build<T: 'static>(
        &self,
        ticks_per_second: f64,
        clock: &SharedClock,
    ) -> TransitionRef<T> {
        let pacing = match self.timing {
            TransitionTiming::Factor(factor) => Pacing::stepped(factor),
            TransitionTiming::Duration {
                duration,
                pacing: PacingMode::Elapsed,
            } => Pacing::timed_with_clock(duration, clock.clone()),
            TransitionTiming::Duration {
                duration,
                pacing: PacingMode::Ticks,
            } => Pacing::ticks(ticks_per_second, duration),
        };

        match self.effect {
            TransitionEffect::Fade => TransitionRef::new(FadeTransition::<T>::with_pacing(pacing)),
            TransitionEffect::Slide => {
                TransitionRef::new(SlideTransition::<T>::with_pacing(self.direction, pacing))
            }
        }
    }

    fn from_toml(name: &str, toml: &TransitionToml) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| {
            ConfigError::ValidationError(format!("transition '{name}': {reason}"))
        };

        let effect = toml.effect.ok_or_else(|| invalid("missing effect"))?;

        if toml.direction.is_some() && effect != TransitionEffect::Slide {
            return Err(invalid("direction only applies to slides"));
        }

        let timing = match (toml.factor, toml.duration_ms) {
            (Some(_), Some(_)) => return Err(invalid("set either factor or duration_ms, not both")),
            (None, None) => return Err(invalid("one of factor or duration_ms is required")),
            (Some(factor), None) => {
                if toml.pacing.is_some() {
                    return Err(invalid("pacing only applies with duration_ms"));
                }
                if !factor.is_finite() || factor <= 0.0 {
                    return Err(invalid("factor must be a positive number"));
                }
                TransitionTiming::Factor(factor)
            }
            (None, Some(ms)) => {
                if ms == 0 {
                    return Err(invalid("duration_ms must be greater than zero"));
                }
                TransitionTiming::Duration {
                    duration: Duration::from_millis(ms),
                    pacing: toml.pacing.unwrap_or_default(),
                }
            }
        };

        Ok(Self {
            effect,
            timing,
            direction: toml.direction.unwrap_or_default(),
        })
    }
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Centralized configuration for a stage host
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct StageConfig {
    /// Host tick rate
    pub ticks_per_second: f64,

    /// Named, validated transitions
    pub transitions: BTreeMap<String, TransitionSpec>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of the tick rate
    source: ConfigSource,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            transitions: BTreeMap::new(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl StageConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the tick rate came from
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Time between two host ticks
    ///
    /// Falls back to the default rate's interval when the tick rate does not
    /// pass [`validate`](Self::validate).
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        interval_for(self.ticks_per_second).unwrap_or_else(|reason| {
            tracing::warn!(%reason, "Using the default tick interval");
            Duration::from_secs_f64(1.0 / DEFAULT_TICKS_PER_SECOND)
        })
    }

    /// Look up a named transition
    #[must_use]
    pub fn transition(&self, name: &str) -> Option<&TransitionSpec> {
        self.transitions.get(name)
    }

    /// Build a fresh transition from the entry called `name`
    #[must_use]
    pub fn build_transition<T: 'static>(
        &self,
        name: &str,
        clock: &SharedClock,
    ) -> Option<TransitionRef<T>> {
        self.transition(name)
            .map(|spec| spec.build(self.ticks_per_second, clock))
    }

    /// Check values that may have been set after loading
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the tick rate is not a
    /// positive number up to [`MAX_TICKS_PER_SECOND`] with a representable
    /// tick interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        interval_for(self.ticks_per_second)
            .map(|_| ())
            .map_err(|reason| ConfigError::ValidationError(format!("{reason} ({})", self.source)))
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/stagehand/stagehand.toml` or
/// `~/.config/stagehand/stagehand.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("stagehand").join("stagehand.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed or
/// fails validation. A missing config file is not an error.
pub fn load_config() -> Result<StageConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<StageConfig, ConfigError> {
    let mut config = StageConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: StageToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());

            tracing::info!(
                path = %config_path.display(),
                transitions = config.transitions.len(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok());
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut StageConfig, toml: &StageToml) -> Result<(), ConfigError> {
    if let Some(tps) = toml.stage.ticks_per_second {
        config.ticks_per_second = tps;
        config.source = ConfigSource::File;
        config.validate()?;
    }

    for (name, entry) in &toml.transitions {
        let spec = TransitionSpec::from_toml(name, entry)?;
        config.transitions.insert(name.clone(), spec);
    }

    Ok(())
}

/// Apply environment variable overrides to the config
///
/// Unparseable or out-of-range values are ignored with a warning.
fn apply_env_config(config: &mut StageConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(raw) = lookup(TPS_ENV_VAR) {
        match raw.trim().parse::<f64>() {
            Ok(tps) if interval_for(tps).is_ok() => {
                config.ticks_per_second = tps;
                config.source = ConfigSource::Env;
            }
            _ => tracing::warn!(
                var = TPS_ENV_VAR,
                value = %raw,
                "Ignoring invalid tick rate from environment"
            ),
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides,
/// then call [`StageConfig::validate`].
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Tick rate override
    pub ticks_per_second: Option<f64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set tick rate override
    #[must_use]
    pub fn with_ticks_per_second(mut self, tps: f64) -> Self {
        self.ticks_per_second = Some(tps);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut StageConfig) {
        if let Some(tps) = self.ticks_per_second {
            config.ticks_per_second = tps;
            config.source = ConfigSource::Cli;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
