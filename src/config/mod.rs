// Copyright (c) 2025 the rust-signalbench contributors
// This file is part of the rust-signalbench project and is licensed under the
// MIT license (see LICENSE.md for details).

//! # Configuration Management
//!
//! Configuration for the signal-analysis core, loaded from YAML files. The
//! core itself persists nothing; this module exists so an embedding
//! application can describe an analysis setup declaratively and validate it
//! before handing it to a [`crate::processing::SpectrumProcessor`].
//!
//! ## Structure
//!
//! - `spectral`: windowing and framing options ([`SpectralConfig`])
//! - `metrics`: harmonic/noise decomposition parameters
//!   ([`crate::spectral::metrics::MetricsConfig`])
//!
//! Every field has a default, so a partial (or empty) YAML document is a
//! valid configuration.
//!
//! ## Usage
//!
//! ```
//! use rust_signalbench::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_yaml(
//!     r#"
//! spectral:
//!   window:
//!     kind: hanning
//!     length: 2048
//!   remove_dc: true
//! metrics:
//!   bits: 16
//!   max_harmonics: 8
//! "#,
//! )
//! .unwrap();
//! assert_eq!(config.metrics.bits, 16);
//! assert_eq!(config.metrics.bins_dc, 1); // default
//! ```

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::spectral::metrics::MetricsConfig;
use crate::spectral::window::WindowKind;

pub mod spectral;

pub use spectral::SpectralConfig;

/// Semantic validation failures, beyond what serde can express
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("window length {0} is too short (minimum 2)")]
    WindowTooShort(usize),

    #[error("gaussian window needs a positive std-dev fraction, got {0}")]
    InvalidGaussianSigma(f64),

    #[error("tukey taper ratio {0} is outside [0, 1]")]
    InvalidTukeyRatio(f64),

    #[error("converter resolution {0} bits is outside 1..=32")]
    InvalidBits(u32),

    #[error("at least one harmonic order (the fundamental) is required")]
    InvalidHarmonicCount,
}

/// Top-level configuration for one analysis lane
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Windowing and framing options
    #[serde(default)]
    pub spectral: SpectralConfig,

    /// Harmonic/noise decomposition parameters
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl AnalysisConfig {
    /// Load and validate a configuration file, parsed as JSON when the path
    /// ends in `.json` and as YAML otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let config = if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        debug!("loaded analysis configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration from a YAML string
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Self =
            serde_yml::from_str(contents).context("Failed to parse YAML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration from a JSON string
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(contents).context("Failed to parse JSON configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Serialize the configuration to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize configuration to JSON")
    }

    /// Check constraints the type system and serde defaults cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = &self.spectral.window;
        if window.length < 2 {
            return Err(ConfigError::WindowTooShort(window.length));
        }
        match window.kind {
            WindowKind::Gaussian if window.option <= 0.0 => {
                return Err(ConfigError::InvalidGaussianSigma(window.option));
            }
            WindowKind::Tukey if !(0.0..=1.0).contains(&window.option) => {
                return Err(ConfigError::InvalidTukeyRatio(window.option));
            }
            _ => {}
        }
        if self.metrics.bits < 1 || self.metrics.bits > 32 {
            return Err(ConfigError::InvalidBits(self.metrics.bits));
        }
        if self.metrics.max_harmonics < 1 {
            return Err(ConfigError::InvalidHarmonicCount);
        }
        Ok(())
    }
}
