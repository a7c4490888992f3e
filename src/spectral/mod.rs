// Copyright (c) 2025 the rust-signalbench contributors
// This file is part of the rust-signalbench project and is licensed under the
// MIT license (see LICENSE.md for details).

//! # Spectral Analysis Module
//!
//! Frequency-domain analysis of time-domain sample buffers. The module is
//! split along the two halves of the computation:
//!
//! - [`transform`]: windowing, zero-free framing and the real FFT producing a
//!   one-sided linear magnitude spectrum ([`SpectrumTransform`]).
//! - [`metrics`]: decibel-domain harmonic/noise decomposition of such a
//!   spectrum and the derived dynamic-range metrics
//!   ([`SignalMetricsEngine`]).
//! - [`window`]: analysis window descriptors and coefficient generation.
//!
//! ## Architecture
//!
//! `SpectrumTransform` owns its FFT plan and window table and reuses them
//! across calls as long as the transform size does not change; regeneration
//! is lazy and keyed by the size. `SignalMetricsEngine` consumes the dense
//! magnitude array produced by the transform but does not depend on its
//! internals, so either half can be exercised on its own (synthetic spectra
//! are enough to drive the metrics engine in tests).
//!
//! ## Usage
//!
//! ```
//! use rust_signalbench::spectral::{SpectrumTransform, SignalMetricsEngine};
//! use rust_signalbench::spectral::metrics::MetricsConfig;
//!
//! // A full-scale 16-bit sinusoid landing exactly on bin 100 of a
//! // 1024-point transform.
//! let signal: Vec<i16> = (0..1024)
//!     .map(|i| {
//!         let phase = 2.0 * std::f64::consts::PI * 100.0 * i as f64 / 1024.0;
//!         (32767.0 * phase.sin()).round() as i16
//!     })
//!     .collect();
//!
//! let mut transform = SpectrumTransform::new();
//! let mut spectrum = vec![0.0; 1024 / 2 + 1];
//! transform.transform(&signal, &mut spectrum).unwrap();
//!
//! let mut engine = SignalMetricsEngine::new();
//! let config = MetricsConfig {
//!     bits: 16,
//!     ..MetricsConfig::default()
//! };
//! let metrics = engine.calculate(&spectrum, &config);
//! assert_eq!(engine.harmonics()[0].index, 100);
//! assert!(metrics.fundamental_db.abs() < 0.01);
//! ```

pub mod metrics;
pub mod transform;
pub mod window;

// Re-export key types for public use at the top level
pub use metrics::{Harmonic, MetricsConfig, SignalMetricsEngine, SpectrumMetrics};
pub use transform::{Sample, SpectrumTransform};
pub use window::{WindowConfig, WindowKind};
