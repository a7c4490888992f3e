// Copyright (c) 2025 the rust-signalbench contributors
// This file is part of the rust-signalbench project and is licensed under the
// MIT license (see LICENSE.md for details).

//! Frequency-domain dynamic-range metrics
//!
//! [`SignalMetricsEngine`] consumes a linear-magnitude spectrum (the output
//! of [`super::transform::SpectrumTransform`]), converts it to a decibel
//! scale, locates the fundamental and its harmonics, estimates a noise floor
//! and derives the five standard converter metrics: SNR, THD, SFDR, SINAD
//! and ENOB.
//!
//! # Algorithm
//!
//! All scans run over `[dc_boundary, len - 2]`: the DC bin plus `bins_dc`
//! guard bins are always excluded, and so is the last (Nyquist-adjacent)
//! bin, a known-unreliable artifact. The fundamental is the first strict
//! maximum in that range. In dBc mode every bin is referenced to the
//! fundamental magnitude; in dBFS mode the reference is `2^(bits - 1)` and
//! the fundamental level in dBFS is added to every ratio metric afterwards,
//! so the two modes differ by exactly that additive offset.
//!
//! Harmonic candidates are `fundamental_index * k` folded back into the
//! one-sided spectrum (`mod 2 * (len + 1)`, reflected when above `len`) and
//! are only registered when they rise above `noise_floor + noise_range_db`.
//! Each registered harmonic owns a guard band of bins that is attributed to
//! it (first match wins) during the classification pass; everything else in
//! the scan range counts as noise.
//!
//! Ratios whose denominator accumulator is exactly zero are left at their
//! pre-logarithm default of 0 instead of producing infinities. This is
//! deliberate inherited behavior: calling layers interpret the resulting
//! non-physical values as "undefined".

use log::debug;
use serde::{Deserialize, Serialize};

/// A detected spectral component (fundamental or harmonic) with its guard
/// band
///
/// `start_index..=end_index` is the band of bins attributed to this
/// component during noise classification, clamped so it never dips below the
/// DC exclusion boundary and never reaches the last spectrum bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    /// Bin position of the component
    pub index: usize,
    /// First bin of the guard band (inclusive)
    pub start_index: usize,
    /// Last bin of the guard band (inclusive)
    pub end_index: usize,
    /// Decibel value at `index`, on the scale selected for this calculation
    pub amplitude_db: f64,
}

/// Complete metric set produced by one [`SignalMetricsEngine::calculate`]
/// call
///
/// All fields are recomputed as a unit; a partial set is never observable.
/// Ratio-based metrics (`snr_db`, `thd_db`, `sinad_db`, `enob`) are in dBc
/// or dBFS terms depending on [`MetricsConfig::full_scale`];
/// `fundamental_db` is always the fundamental level in dBFS terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectrumMetrics {
    /// Signal-to-noise ratio in dB
    pub snr_db: f64,
    /// Total harmonic distortion in dB (negative of the signal/harmonics
    /// ratio)
    pub thd_db: f64,
    /// Spurious-free dynamic range in dB
    pub sfdr_db: f64,
    /// Signal-to-noise-and-distortion ratio in dB
    pub sinad_db: f64,
    /// Effective number of bits, derived from SINAD
    pub enob: f64,
    /// Average noise level in dB over the non-signal bins
    pub noise_floor_db: f64,
    /// Harmonic registration threshold: noise floor plus the configured
    /// margin
    pub noise_top_db: f64,
    /// Fundamental level relative to full scale
    pub fundamental_db: f64,
}

/// Parameters for one metrics calculation
///
/// Defaults match the workbench conventions: 6 harmonic orders, one guard
/// bin on each side of DC, fundamental and harmonics, 12-bit full scale,
/// 9 dB noise margin, carrier-relative (dBc) scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Highest harmonic order to search for (the fundamental is order 1)
    #[serde(default = "default_max_harmonics")]
    pub max_harmonics: usize,

    /// Extra guard bins excluded around DC (the DC bin itself is always
    /// excluded)
    #[serde(default = "default_guard_bins")]
    pub bins_dc: usize,

    /// Guard bins on each side of the fundamental
    #[serde(default = "default_guard_bins")]
    pub bins_fundamental: usize,

    /// Guard bins on each side of each registered harmonic
    #[serde(default = "default_guard_bins")]
    pub bins_harmonics: usize,

    /// Scale ratio metrics to full scale (dBFS) instead of the carrier (dBc)
    #[serde(default)]
    pub full_scale: bool,

    /// Converter resolution; full scale is `2^(bits - 1)` code units
    #[serde(default = "default_bits")]
    pub bits: u32,

    /// Margin above the noise floor a harmonic must exceed to be registered
    #[serde(default = "default_noise_range_db")]
    pub noise_range_db: f64,
}

fn default_max_harmonics() -> usize {
    6
}

fn default_guard_bins() -> usize {
    1
}

fn default_bits() -> u32 {
    12
}

fn default_noise_range_db() -> f64 {
    9.0
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            max_harmonics: default_max_harmonics(),
            bins_dc: default_guard_bins(),
            bins_fundamental: default_guard_bins(),
            bins_harmonics: default_guard_bins(),
            full_scale: false,
            bits: default_bits(),
            noise_range_db: default_noise_range_db(),
        }
    }
}

/// Harmonic/noise decomposition and dynamic-range metrics engine
///
/// Owns the harmonic list and the scalar metrics of the most recent
/// calculation; both are replaced wholesale on every call. Designed for
/// single-threaded use per instance (`calculate` takes `&mut self`, internal
/// buffers are reused in place).
pub struct SignalMetricsEngine {
    /// Components registered by the last calculation; index 0 is always the
    /// fundamental
    harmonics: Vec<Harmonic>,

    /// Metrics of the last calculation
    metrics: SpectrumMetrics,

    /// Decibel-converted spectrum scratch buffer
    fft_db: Vec<f64>,
}

impl SignalMetricsEngine {
    pub fn new() -> Self {
        Self {
            harmonics: Vec::new(),
            metrics: SpectrumMetrics::default(),
            fft_db: Vec::new(),
        }
    }

    /// Components found by the most recent calculation (fundamental first)
    pub fn harmonics(&self) -> &[Harmonic] {
        &self.harmonics
    }

    /// Metrics of the most recent calculation
    pub fn metrics(&self) -> &SpectrumMetrics {
        &self.metrics
    }

    /// Decibel-converted spectrum of the most recent calculation
    pub fn spectrum_db(&self) -> &[f64] {
        &self.fft_db
    }

    /// Decompose `spectrum` and compute the metric set
    ///
    /// `spectrum` is a dense array of non-negative linear magnitudes as
    /// produced by the transform; the caller guarantees its validity. The
    /// previous harmonic list and metrics are discarded. Returns the new
    /// metric set (also retrievable through [`metrics`](Self::metrics)).
    pub fn calculate(&mut self, spectrum: &[f64], config: &MetricsConfig) -> SpectrumMetrics {
        let len = spectrum.len();
        let dc_boundary = config.bins_dc + 1;

        self.harmonics.clear();
        // Too short for any scan range: publish an empty, self-consistent
        // result instead of indexing out of bounds.
        if len < 2 || dc_boundary > len - 2 {
            self.metrics = SpectrumMetrics::default();
            self.fft_db.clear();
            return self.metrics;
        }
        let last = len - 2;

        // Fundamental: first strict maximum over the scan range
        let mut fundamental_index = dc_boundary;
        let mut fundamental_magnitude = spectrum[dc_boundary];
        for (i, &magnitude) in spectrum.iter().enumerate().take(last + 1).skip(dc_boundary) {
            if magnitude > fundamental_magnitude {
                fundamental_magnitude = magnitude;
                fundamental_index = i;
            }
        }

        // Scale selection. The fundamental level is always reported in dBFS
        // terms; full-scale mode additionally shifts every ratio metric by it.
        let full_scale_ref = 2f64.powi(config.bits as i32 - 1);
        let fundamental_db =
            20.0 * full_scale_ref.log10() - 20.0 * fundamental_magnitude.log10();
        let (scale, offset) = if config.full_scale {
            (full_scale_ref, fundamental_db)
        } else {
            (fundamental_magnitude, 0.0)
        };

        self.fft_db.clear();
        self.fft_db
            .extend(spectrum.iter().map(|&m| 20.0 * (m / scale).log10()));

        // SFDR seed and noise-floor accumulation. The mean over the whole
        // scan range seeds the spur search; bins inside the fundamental guard
        // band are excluded from both the spur maximum and the noise sum.
        let count = last - dc_boundary + 1;
        let mean = self.fft_db[dc_boundary..=last].iter().sum::<f64>() / count as f64;
        let mut sfdr = mean;
        let mut excluded_sum = 0.0;
        for i in dc_boundary..=last {
            let distance = (i as isize - fundamental_index as isize).unsigned_abs();
            if distance <= config.bins_fundamental {
                continue;
            }
            let value = self.fft_db[i];
            if value > sfdr {
                sfdr = value;
            }
            excluded_sum += value;
        }
        let sfdr_db = -sfdr;

        let noise_floor_db = (excluded_sum + mean)
            / (count as f64 - 2.0 * config.bins_fundamental as f64 - 1.0);
        let noise_top_db = noise_floor_db + config.noise_range_db;

        // Harmonic enumeration. The fundamental is always harmonic 0; higher
        // orders alias-fold back into the one-sided spectrum and are only
        // registered when they clear the noise top.
        self.harmonics.push(Harmonic {
            index: fundamental_index,
            start_index: fundamental_index
                .saturating_sub(config.bins_fundamental)
                .max(dc_boundary),
            end_index: (fundamental_index + config.bins_fundamental).min(last),
            amplitude_db: self.fft_db[fundamental_index],
        });

        let fold_period = 2 * (len + 1);
        for order in 2..=config.max_harmonics {
            let mut index = (fundamental_index * order) % fold_period;
            if index > len {
                index = fold_period - index;
            }
            if index < dc_boundary || index > last {
                continue;
            }
            if self.fft_db[index] > noise_top_db {
                self.harmonics.push(Harmonic {
                    index,
                    start_index: index.saturating_sub(config.bins_harmonics).max(dc_boundary),
                    end_index: (index + config.bins_harmonics).min(last),
                    amplitude_db: self.fft_db[index],
                });
            }
        }

        // Classification: each bin in the scan range feeds exactly one
        // accumulator; the first guard band containing it wins.
        let mut fundamental_sq = 0.0;
        let mut harmonics_sq = 0.0;
        let mut noise_sq = 0.0;
        for i in dc_boundary..=last {
            let magnitude_sq = spectrum[i] * spectrum[i];
            match self
                .harmonics
                .iter()
                .position(|h| i >= h.start_index && i <= h.end_index)
            {
                Some(0) => fundamental_sq += magnitude_sq,
                Some(_) => harmonics_sq += magnitude_sq,
                None => noise_sq += magnitude_sq,
            }
        }

        // Finalization with zero guards: a ratio with a zero denominator sum
        // stays at its pre-log default of 0 (the mode offset still applies).
        let mut sinad_db = 0.0;
        if noise_sq + harmonics_sq > 0.0 {
            sinad_db = 10.0 * (fundamental_sq / (noise_sq + harmonics_sq)).log10();
        }
        sinad_db += offset;
        let enob = (sinad_db - 1.76) / 6.02;

        let mut snr_db = 0.0;
        if noise_sq > 0.0 {
            snr_db = 10.0 * (fundamental_sq / noise_sq).log10();
        }
        snr_db += offset;

        let mut thd_db = 0.0;
        if harmonics_sq > 0.0 {
            thd_db = 10.0 * (fundamental_sq / harmonics_sq).log10();
        }
        thd_db = -(thd_db + offset);

        self.metrics = SpectrumMetrics {
            snr_db,
            thd_db,
            sfdr_db,
            sinad_db,
            enob,
            noise_floor_db,
            noise_top_db,
            fundamental_db,
        };

        debug!(
            "metrics: fundamental bin {} at {:.2} dBFS, {} component(s), SINAD {:.2} dB",
            fundamental_index,
            fundamental_db,
            self.harmonics.len(),
            sinad_db
        );

        self.metrics
    }
}

impl Default for SignalMetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}
