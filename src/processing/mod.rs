// Copyright (c) 2025 the rust-signalbench contributors
// This file is part of the rust-signalbench project and is licensed under the
// MIT license (see LICENSE.md for details).

//! Processing orchestration for the signal-analysis core
//!
//! The transform and metrics engine are single-threaded per instance; this
//! module provides the serialized unit that drives them and the shared state
//! through which results reach display collaborators. Refresh notification
//! is pull-based: consumers read the shared state and compare `sequence`
//! against the last value they saw.

use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use crate::spectral::metrics::{Harmonic, SpectrumMetrics};

pub mod processor;

// Re-export for easier access
pub use processor::SpectrumProcessor;

/// Shared data structure for analysis results
///
/// Holds the output of the most recent processing pass. It is shared between
/// the processor and its consumers via `Arc<RwLock<AnalysisSharedData>>`;
/// the processor replaces the contents wholesale after each pass, so readers
/// always observe a self-consistent set.
#[derive(Debug, Clone)]
pub struct AnalysisSharedData {
    /// Metrics of the most recent pass, `None` before the first one
    pub metrics: Option<SpectrumMetrics>,
    /// Components found by the most recent pass (fundamental first)
    pub harmonics: Vec<Harmonic>,
    /// Length of the spectrum the metrics were computed from
    pub spectrum_len: usize,
    /// Monotonic pass counter, for change detection by consumers
    pub sequence: u64,
    /// Timestamp of the last update for data validation
    pub last_update: SystemTime,
}

impl Default for AnalysisSharedData {
    fn default() -> Self {
        Self {
            metrics: None,
            harmonics: Vec::new(),
            spectrum_len: 0,
            sequence: 0,
            last_update: SystemTime::now(),
        }
    }
}

/// Type alias for thread-safe access to the shared analysis data
pub type SharedAnalysisState = Arc<RwLock<AnalysisSharedData>>;
