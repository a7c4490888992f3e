// Copyright (c) 2025 the rust-signalbench contributors
// This file is part of the rust-signalbench project and is licensed under the
// MIT license (see LICENSE.md for details).

//! Spectral transform configuration section

use serde::{Deserialize, Serialize};

use crate::spectral::window::WindowConfig;

/// Windowing and framing options for the spectrum transform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Analysis window descriptor
    #[serde(default)]
    pub window: WindowConfig,

    /// Subtract the frame mean before windowing
    #[serde(default)]
    pub remove_dc: bool,

    /// Tie the window length to the input length instead of keeping it fixed
    #[serde(default = "default_adjust_window_to_input")]
    pub adjust_window_to_input: bool,
}

fn default_adjust_window_to_input() -> bool {
    true
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            remove_dc: false,
            adjust_window_to_input: default_adjust_window_to_input(),
        }
    }
}
