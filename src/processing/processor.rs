// Copyright (c) 2025 the rust-signalbench contributors
// This file is part of the rust-signalbench project and is licensed under the
// MIT license (see LICENSE.md for details).

//! The serialized "transform + calculate" processing unit
//!
//! [`SpectrumProcessor`] owns one [`SpectrumTransform`] and one
//! [`SignalMetricsEngine`] and runs reconfigure + transform + metrics as a
//! single pass under `&mut self`, which makes at-most-one-in-flight per
//! instance a compile-time property. An orchestrator running on a worker
//! thread hands in sample frames; results are returned directly and also
//! published into a [`SharedAnalysisState`] that display collaborators poll.
//!
//! # Usage
//!
//! ```
//! use rust_signalbench::processing::SpectrumProcessor;
//! use rust_signalbench::spectral::metrics::MetricsConfig;
//! use rust_signalbench::spectral::window::WindowKind;
//!
//! let mut processor = SpectrumProcessor::new("bench".to_string())
//!     .with_metrics_config(MetricsConfig {
//!         bits: 16,
//!         ..MetricsConfig::default()
//!     });
//!
//! let frame: Vec<i16> = (0..1024)
//!     .map(|i| {
//!         let phase = 2.0 * std::f64::consts::PI * 100.0 * i as f64 / 1024.0;
//!         (32767.0 * phase.sin()).round() as i16
//!     })
//!     .collect();
//! let metrics = processor.process(&frame).unwrap();
//! assert!(metrics.fundamental_db.abs() < 0.01);
//!
//! let shared = processor.get_shared_state();
//! let state = shared.read().unwrap();
//! assert_eq!(state.sequence, 1);
//! ```

use anyhow::{anyhow, Context, Result};
use log::debug;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use super::{AnalysisSharedData, SharedAnalysisState};
use crate::config::AnalysisConfig;
use crate::spectral::metrics::{MetricsConfig, SignalMetricsEngine, SpectrumMetrics};
use crate::spectral::transform::{Sample, SpectrumTransform};
use crate::spectral::window::WindowKind;

/// One processing lane: transform, metrics engine, spectrum scratch buffer
/// and the shared state results are published to
pub struct SpectrumProcessor {
    /// Identifier used in log output
    id: String,

    transform: SpectrumTransform,
    engine: SignalMetricsEngine,
    metrics_config: MetricsConfig,

    /// Resync the window length to each new input length
    adjust_window_to_input: bool,

    /// Magnitude spectrum of the most recent pass
    spectrum: Vec<f64>,

    shared_state: SharedAnalysisState,

    /// Number of completed passes
    processing_count: u64,
}

impl SpectrumProcessor {
    /// Create a processor with default configuration: no window, DC removal
    /// off, default metrics parameters, a fresh shared state.
    pub fn new(id: String) -> Self {
        Self::new_with_shared_state(id, None)
    }

    /// Create a processor publishing into an external shared state
    ///
    /// Passing `None` creates a new state; passing an existing one lets
    /// several processors (or a processor and its display consumers) share a
    /// single publication point.
    pub fn new_with_shared_state(id: String, shared_state: Option<SharedAnalysisState>) -> Self {
        let shared_state = shared_state
            .unwrap_or_else(|| Arc::new(RwLock::new(AnalysisSharedData::default())));
        Self {
            id,
            transform: SpectrumTransform::new(),
            engine: SignalMetricsEngine::new(),
            metrics_config: MetricsConfig::default(),
            adjust_window_to_input: true,
            spectrum: Vec::new(),
            shared_state,
            processing_count: 0,
        }
    }

    /// Build a processor from a loaded [`AnalysisConfig`]
    pub fn from_config(id: String, config: &AnalysisConfig) -> Self {
        let mut processor = Self::new(id).with_metrics_config(config.metrics);
        processor.adjust_window_to_input = config.spectral.adjust_window_to_input;
        processor.transform.set_window(
            config.spectral.window.kind,
            config.spectral.window.length,
            config.spectral.window.option,
        );
        processor.transform.set_remove_dc(config.spectral.remove_dc);
        processor
    }

    /// Set the metrics parameters for subsequent passes
    pub fn with_metrics_config(mut self, config: MetricsConfig) -> Self {
        self.metrics_config = config;
        self
    }

    /// Set the analysis window; an invalid length keeps the previous window
    pub fn with_window(mut self, kind: WindowKind, length: usize, option: f64) -> Self {
        self.transform.set_window(kind, length, option);
        self
    }

    /// Enable or disable DC removal before windowing
    pub fn with_remove_dc(mut self, remove_dc: bool) -> Self {
        self.transform.set_remove_dc(remove_dc);
        self
    }

    /// Keep the window length tied to the input length (on by default)
    pub fn with_adjust_window_to_input(mut self, adjust: bool) -> Self {
        self.adjust_window_to_input = adjust;
        self
    }

    /// Access to the shared state for reading results
    pub fn get_shared_state(&self) -> SharedAnalysisState {
        Arc::clone(&self.shared_state)
    }

    /// Magnitude spectrum of the most recent pass
    pub fn spectrum(&self) -> &[f64] {
        &self.spectrum
    }

    /// Metrics engine of this lane, for harmonic detail beyond the scalar
    /// metrics
    pub fn engine(&self) -> &SignalMetricsEngine {
        &self.engine
    }

    /// Number of completed passes
    pub fn processing_count(&self) -> u64 {
        self.processing_count
    }

    /// Run one full pass: reconfigure for the frame length, transform,
    /// compute metrics, publish.
    ///
    /// The whole pass runs under `&mut self`; the orchestrator only has to
    /// hold the processor exclusively for its duration to satisfy the
    /// one-in-flight requirement.
    pub fn process<T: Sample>(&mut self, input: &[T]) -> Result<SpectrumMetrics> {
        let n = input.len();
        if n == 0 {
            return Err(anyhow!("processor {}: empty input frame", self.id));
        }

        if n != self.transform.input_len()
            && !self.transform.set_input_length(n, self.adjust_window_to_input)
        {
            return Err(anyhow!(
                "processor {}: no transform size for frame length {}",
                self.id,
                n
            ));
        }

        self.spectrum.resize(n / 2 + 1, 0.0);
        self.transform
            .transform(input, &mut self.spectrum)
            .with_context(|| format!("processor {}: transform failed", self.id))?;

        let metrics = self.engine.calculate(&self.spectrum, &self.metrics_config);
        self.processing_count += 1;

        if let Ok(mut state) = self.shared_state.write() {
            state.metrics = Some(metrics);
            state.harmonics = self.engine.harmonics().to_vec();
            state.spectrum_len = self.spectrum.len();
            state.sequence = self.processing_count;
            state.last_update = SystemTime::now();
        }

        debug!(
            "processor {}: pass {} over {} samples, {} component(s)",
            self.id,
            self.processing_count,
            n,
            self.engine.harmonics().len()
        );

        Ok(metrics)
    }
}
