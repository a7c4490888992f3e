// Copyright (c) 2025 the rust-signalbench contributors
// This file is part of the rust-signalbench project and is licensed under the
// MIT license (see LICENSE.md for details).

//! Analysis window descriptors and coefficient generation
//!
//! Windows taper the edges of an analysis frame to reduce spectral leakage.
//! Each supported window type produces a closed-form coefficient per sample
//! index; the table is generated once per configuration and cached by
//! [`super::transform::SpectrumTransform`] until the descriptor changes.
//!
//! `None` and `Boxcar` are deliberately distinct: `None` means the transform
//! skips the multiplication pass entirely, while `Boxcar` is an explicit
//! all-ones table that still goes through the windowed code path.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Available analysis window types
///
/// `Gaussian` and `Tukey` take a shape parameter through
/// [`WindowConfig::option`] (the standard-deviation fraction and the taper
/// ratio respectively); the parameter is silently ignored by the fixed-shape
/// types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// No window (the transform leaves the frame untouched)
    None,
    /// Explicit all-ones window
    Boxcar,
    /// Triangular (Bartlett) window
    Triangle,
    /// Gaussian window, shape parameter = std-dev fraction
    Gaussian,
    /// Tukey (tapered cosine) window, shape parameter = taper ratio
    Tukey,
    /// Hamming window (0.54/0.46)
    Hamming,
    /// Hanning window (raised cosine)
    Hanning,
}

/// Window descriptor: type, length and optional shape parameter
///
/// The length is either fixed or, when the owning transform runs in
/// adjust-to-input mode, silently resynced to the current input length
/// before the next transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window type
    #[serde(default = "default_kind")]
    pub kind: WindowKind,

    /// Window length in samples (>= 2)
    #[serde(default = "default_length")]
    pub length: usize,

    /// Shape parameter, used only by `Gaussian` and `Tukey`
    #[serde(default = "default_option")]
    pub option: f64,
}

fn default_kind() -> WindowKind {
    WindowKind::Hanning
}

fn default_length() -> usize {
    1024
}

fn default_option() -> f64 {
    0.5
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            length: default_length(),
            option: default_option(),
        }
    }
}

/// Generate the coefficient table for a window descriptor
///
/// Returns an empty table for [`WindowKind::None`]; the transform treats an
/// empty table as "skip windowing". All formulas use the symmetric
/// `length - 1` denominator so the first and last coefficients sit on the
/// window edges.
pub fn generate(config: &WindowConfig) -> Vec<f64> {
    let len = config.length;
    match config.kind {
        WindowKind::None => Vec::new(),
        WindowKind::Boxcar => vec![1.0; len],
        WindowKind::Triangle => {
            let half = (len - 1) as f64 / 2.0;
            (0..len)
                .map(|i| 1.0 - ((i as f64 - half) / half).abs())
                .collect()
        }
        WindowKind::Gaussian => {
            let center = (len - 1) as f64 / 2.0;
            let sigma = config.option.max(f64::MIN_POSITIVE);
            (0..len)
                .map(|i| {
                    let x = (i as f64 - center) / (sigma * center);
                    (-0.5 * x * x).exp()
                })
                .collect()
        }
        WindowKind::Tukey => {
            let ratio = config.option.clamp(0.0, 1.0);
            let n = (len - 1) as f64;
            let taper = ratio * n / 2.0;
            (0..len)
                .map(|i| {
                    let i = i as f64;
                    if i < taper {
                        0.5 * (1.0 + (PI * (2.0 * i / (ratio * n) - 1.0)).cos())
                    } else if i > n - taper {
                        0.5 * (1.0 + (PI * (2.0 * (n - i) / (ratio * n) - 1.0)).cos())
                    } else {
                        1.0
                    }
                })
                .collect()
        }
        WindowKind::Hamming => (0..len)
            .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (len - 1) as f64).cos())
            .collect(),
        WindowKind::Hanning => (0..len)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / (len - 1) as f64).cos()))
            .collect(),
    }
}
