// Copyright (c) 2025 the rust-signalbench contributors
// This file is part of the rust-signalbench project and is licensed under the
// MIT license (see LICENSE.md for details).

//! Signal-analysis core for instrumentation and data-acquisition workbenches.
//!
//! This crate implements the computation pipeline that sits between a data
//! source (ADC frames, file buffers) and the display layer of an
//! instrumentation application:
//!
//! - [`spectral::SpectrumTransform`] frames a variable-length time-domain
//!   signal into an FFT-friendly buffer, applies an analysis window and
//!   computes the one-sided magnitude spectrum via a real FFT.
//! - [`spectral::SignalMetricsEngine`] decomposes such a spectrum into
//!   fundamental, harmonics and noise, and derives the standard
//!   dynamic-range metrics: SNR, THD, SFDR, SINAD and ENOB.
//! - [`processing::SpectrumProcessor`] wires both together as the single
//!   serialized "transform + calculate" unit an orchestrator drives, and
//!   publishes results through a shared analysis state.
//!
//! The crate has no I/O of its own; all inputs are in-memory sample buffers
//! supplied by the caller.

pub mod config;
pub mod processing;
pub mod spectral;

pub use config::AnalysisConfig;
pub use processing::{SharedAnalysisState, SpectrumProcessor};
pub use spectral::metrics::{Harmonic, MetricsConfig, SignalMetricsEngine, SpectrumMetrics};
pub use spectral::transform::{Sample, SpectrumTransform};
pub use spectral::window::{WindowConfig, WindowKind};
