// Copyright (c) 2025 the rust-signalbench contributors
// This file is part of the rust-signalbench project and is licensed under the
// MIT license (see LICENSE.md for details).

//! Time-domain to frequency-domain transform
//!
//! [`SpectrumTransform`] turns a raw sample sequence of any supported numeric
//! element type into a one-sided linear magnitude spectrum:
//!
//! 1. samples are converted to `f64` working values (raw code units, no
//!    normalization);
//! 2. the frame mean is subtracted when DC removal is enabled;
//! 3. the analysis window is applied (unless the window type is `None`);
//! 4. the frame is zero-padded to an FFT-efficient transform size and run
//!    through a real-to-complex FFT;
//! 5. `output[i] = |FFT[i]| * 2 / input_len` is written for the positive
//!    half `i in 0..input_len / 2 + 1`.
//!
//! The energy normalization is referenced to the *input* sample count, not
//! the padded transform size, so a bin-aligned sinusoid of amplitude A shows
//! up as a bin of magnitude A regardless of padding.
//!
//! The FFT plan, scratch buffers and window table are caches keyed by the
//! transform size and window descriptor; they are regenerated lazily when the
//! key changes and reused otherwise, so steady-state transforms allocate
//! nothing.

use anyhow::{anyhow, Result};
use log::{debug, warn};
use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

use super::window::{self, WindowConfig, WindowKind};

/// Upper bound for the fast-size search. A power of two always exists below
/// twice the requested length, so this only rejects absurd input lengths.
pub const MAX_TRANSFORM_SIZE: usize = 1 << 24;

/// Closed set of numeric sample types accepted by [`SpectrumTransform`]
///
/// Conversion is a plain value cast to `f64`: samples are treated as raw
/// converter code units, which is what the metrics engine scales against
/// `2^(bits-1)`. 64-bit integer magnitudes go through double precision
/// unchanged up to the 53-bit mantissa limit.
pub trait Sample: Copy {
    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(impl Sample for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_sample!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// Windowing + framing + real-FFT magnitude spectrum computation
///
/// Designed for single-threaded use per instance: `transform` takes
/// `&mut self` because the window table, FFT plan and scratch buffers are
/// mutated in place. Configuration setters are last-known-good: an invalid
/// request returns `false` and leaves the previous valid configuration in
/// effect.
pub struct SpectrumTransform {
    /// Length of the next expected input signal
    input_len: usize,

    /// Chosen FFT-efficient transform size (>= `input_len`)
    fft_size: usize,

    /// Current window descriptor
    window: WindowConfig,

    /// When set, the window length follows the input length on the next
    /// regeneration
    window_follows_input: bool,

    /// Cached window coefficient table (empty for `WindowKind::None`)
    window_table: Vec<f64>,

    /// Window table needs regeneration before the next transform
    window_dirty: bool,

    /// Subtract the frame mean before windowing
    remove_dc: bool,

    /// FFT planner, reused across replans
    planner: RealFftPlanner<f64>,

    /// Cached FFT plan for the current transform size
    fft: Option<Arc<dyn RealToComplex<f64>>>,

    /// Zero-padded input frame of `fft_size` samples
    frame: Vec<f64>,

    /// Complex FFT output of `fft_size / 2 + 1` bins
    bins: Vec<Complex<f64>>,
}

impl SpectrumTransform {
    /// Create a transform with no window, DC removal off and no input length
    /// configured yet. The first `transform` call (or an explicit
    /// `set_input_length`) sizes the internal buffers.
    pub fn new() -> Self {
        Self {
            input_len: 0,
            fft_size: 0,
            window: WindowConfig {
                kind: WindowKind::None,
                length: 2,
                option: 0.0,
            },
            window_follows_input: false,
            window_table: Vec::new(),
            window_dirty: false,
            remove_dc: false,
            planner: RealFftPlanner::new(),
            fft: None,
            frame: Vec::new(),
            bins: Vec::new(),
        }
    }

    /// Length of the input signal the transform is currently configured for
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Chosen transform (FFT) size, zero until an input length is configured
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of output bins for the configured input length
    /// (`input_len / 2 + 1`)
    pub fn spectrum_len(&self) -> usize {
        if self.input_len == 0 {
            0
        } else {
            self.input_len / 2 + 1
        }
    }

    /// Current window descriptor
    pub fn window(&self) -> &WindowConfig {
        &self.window
    }

    /// Accept the length of the next input signal
    ///
    /// Computes the smallest FFT-efficient transform size >= `n` and, when it
    /// differs from the current one, replans the FFT and resizes the scratch
    /// buffers. With `adjust_window_to_input` set, the window length is
    /// forced to follow `n` on the next regeneration; lengths below the
    /// two-sample window minimum leave the window untouched.
    ///
    /// Returns `false` (previous configuration kept) when no acceptable size
    /// exists below [`MAX_TRANSFORM_SIZE`]. A length of zero is accepted and
    /// arms the documented no-op path of [`transform`](Self::transform).
    pub fn set_input_length(&mut self, n: usize, adjust_window_to_input: bool) -> bool {
        if n == 0 {
            self.input_len = 0;
            self.window_follows_input = adjust_window_to_input;
            return true;
        }

        let size = match fast_size_at_least(n) {
            Some(size) => size,
            None => {
                warn!("no fast transform size for input length {}", n);
                return false;
            }
        };

        self.input_len = n;
        self.window_follows_input = adjust_window_to_input;
        if adjust_window_to_input && n >= 2 && self.window.length != n {
            self.window.length = n;
            self.window_dirty = true;
        }
        if !adjust_window_to_input && self.window.kind != WindowKind::None && self.window.length != n
        {
            warn!(
                "window length {} differs from input length {}; only the first {} samples are tapered",
                self.window.length,
                n,
                self.window.length.min(n)
            );
        }

        if size != self.fft_size {
            let fft = self.planner.plan_fft_forward(size);
            self.frame = fft.make_input_vec();
            self.bins = fft.make_output_vec();
            self.fft = Some(fft);
            self.fft_size = size;
            debug!("planned {}-point transform for input length {}", size, n);
        }

        true
    }

    /// Configure the analysis window
    ///
    /// The shape parameter `option` is used only by `Gaussian` (std-dev
    /// fraction) and `Tukey` (taper ratio) and silently ignored otherwise.
    /// The coefficient table is regenerated lazily before the next transform.
    ///
    /// Outside adjust-to-input mode a fixed `length` shorter than the input
    /// tapers only the first `length` samples and leaves the tail as-is; a
    /// warning is logged when the lengths disagree.
    ///
    /// Returns `false` (previous window kept) when `length < 2`.
    pub fn set_window(&mut self, kind: WindowKind, length: usize, option: f64) -> bool {
        if length < 2 {
            warn!("rejected window length {} (minimum 2)", length);
            return false;
        }
        self.window = WindowConfig {
            kind,
            length,
            option,
        };
        self.window_dirty = true;
        true
    }

    /// Enable or disable subtraction of the frame mean before windowing
    pub fn set_remove_dc(&mut self, remove_dc: bool) {
        self.remove_dc = remove_dc;
    }

    /// Compute the one-sided magnitude spectrum of `input`
    ///
    /// Writes `|FFT[i]| * 2 / input.len()` into `output[i]` for
    /// `i in 0..input.len() / 2 + 1`; `output` must be pre-allocated to at
    /// least that many elements. An empty input is a no-op.
    ///
    /// When the input length differs from the configured one, the transform
    /// resyncs itself first (adjust-to-input mode carries over), so a caller
    /// that always hands in consistent buffers never needs to call
    /// `set_input_length` explicitly.
    pub fn transform<T: Sample>(&mut self, input: &[T], output: &mut [f64]) -> Result<()> {
        let n = input.len();
        if n == 0 {
            return Ok(());
        }

        if n != self.input_len && !self.set_input_length(n, self.window_follows_input) {
            return Err(anyhow!("no fast transform size for input length {}", n));
        }
        self.ensure_window();

        let fft = self
            .fft
            .as_ref()
            .ok_or_else(|| anyhow!("transform not configured"))?
            .clone();

        self.frame.fill(0.0);
        for (dst, sample) in self.frame.iter_mut().zip(input) {
            *dst = sample.to_f64();
        }

        if self.remove_dc {
            let mean = self.frame[..n].iter().sum::<f64>() / n as f64;
            for value in &mut self.frame[..n] {
                *value -= mean;
            }
        }

        if self.window.kind != WindowKind::None {
            for (value, coeff) in self.frame[..n].iter_mut().zip(&self.window_table) {
                *value *= coeff;
            }
        }

        fft.process(&mut self.frame, &mut self.bins)
            .map_err(|e| anyhow!("FFT processing failed: {:?}", e))?;

        let scale = 2.0 / n as f64;
        let out_len = (n / 2 + 1).min(output.len());
        for (i, out) in output.iter_mut().enumerate().take(out_len) {
            *out = self.bins[i].norm() * scale;
        }

        Ok(())
    }

    /// Resync the window length in adjust-to-input mode and regenerate the
    /// coefficient table if the descriptor changed since the last transform.
    fn ensure_window(&mut self) {
        if self.window_follows_input && self.input_len >= 2 && self.window.length != self.input_len
        {
            self.window.length = self.input_len;
            self.window_dirty = true;
        }
        if self.window_dirty {
            self.window_table = window::generate(&self.window);
            self.window_dirty = false;
        }
    }
}

impl Default for SpectrumTransform {
    fn default() -> Self {
        Self::new()
    }
}

/// A transform size is "fast" when it is even and factors entirely into the
/// small primes the underlying real FFT handles efficiently.
pub(crate) fn is_fast_size(size: usize) -> bool {
    if size < 2 || size % 2 != 0 {
        return false;
    }
    let mut rest = size;
    for p in [2, 3, 5] {
        while rest % p == 0 {
            rest /= p;
        }
    }
    rest == 1
}

/// Smallest fast transform size >= `n`, or `None` above the search limit
pub(crate) fn fast_size_at_least(n: usize) -> Option<usize> {
    let mut candidate = n.max(2);
    if candidate % 2 != 0 {
        candidate += 1;
    }
    while candidate <= MAX_TRANSFORM_SIZE {
        if is_fast_size(candidate) {
            return Some(candidate);
        }
        candidate += 2;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;

    fn sine(amplitude: f64, cycles: f64, num_samples: usize) -> Vec<f64> {
        (0..num_samples)
            .map(|i| amplitude * (2.0 * PI * cycles * i as f64 / num_samples as f64).sin())
            .collect()
    }

    fn peak_bin(spectrum: &[f64]) -> usize {
        // Exclude DC and the last bin, same range the metrics engine scans
        let mut best = 1;
        for i in 1..spectrum.len() - 1 {
            if spectrum[i] > spectrum[best] {
                best = i;
            }
        }
        best
    }

    #[test]
    fn test_fast_size_selection() {
        for n in [1usize, 2, 3, 7, 100, 480, 997, 1000, 1023, 1024, 44100] {
            let size = fast_size_at_least(n).unwrap();
            assert!(size >= n, "size {} below request {}", size, n);
            assert!(is_fast_size(size), "size {} not fast for {}", size, n);
        }
        // Already-fast sizes are kept as-is
        assert_eq!(fast_size_at_least(1024), Some(1024));
        assert_eq!(fast_size_at_least(480), Some(480));
        // 997 is prime; the next even 2-3-5-smooth size is 1000
        assert_eq!(fast_size_at_least(997), Some(1000));
    }

    #[test]
    fn test_odd_sizes_are_not_fast() {
        assert!(!is_fast_size(3));
        assert!(!is_fast_size(15));
        assert!(is_fast_size(6));
        assert!(!is_fast_size(14)); // 2 * 7
    }

    #[test]
    fn test_zero_input_is_noop() {
        let mut transform = SpectrumTransform::new();
        let mut output = vec![42.0; 8];
        let input: [f64; 0] = [];
        transform.transform(&input, &mut output).unwrap();
        assert!(output.iter().all(|&v| v == 42.0));
    }

    #[test]
    fn test_all_zero_input_gives_all_zero_spectrum() {
        let mut transform = SpectrumTransform::new();
        for n in [2usize, 4, 16, 256, 1024] {
            let input = vec![0.0f64; n];
            let mut output = vec![1.0; n / 2 + 1];
            transform.transform(&input, &mut output).unwrap();
            assert!(
                output.iter().all(|&v| v == 0.0),
                "nonzero spectrum for zero input of length {}",
                n
            );
        }
    }

    #[test]
    fn test_bin_aligned_sine_amplitude() {
        let mut transform = SpectrumTransform::new();
        let input = sine(3.0, 100.0, 1024);
        let mut output = vec![0.0; 513];
        transform.transform(&input, &mut output).unwrap();
        assert_eq!(peak_bin(&output), 100);
        // 2/N normalization puts a bin-aligned sinusoid of amplitude A at A
        assert_relative_eq!(output[100], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_off_bin_sine_peak_within_one_bin() {
        let mut transform = SpectrumTransform::new();
        let input = sine(1.0, 100.5, 1024);
        let mut output = vec![0.0; 513];
        transform.transform(&input, &mut output).unwrap();
        let peak = peak_bin(&output);
        assert!((100..=101).contains(&peak), "peak at {}", peak);
    }

    #[test]
    fn test_padded_transform_keeps_input_referenced_scaling() {
        // 997 samples pad to a 1000-point FFT; the peak location follows the
        // padded grid but scaling stays referenced to the 997 input samples.
        let mut transform = SpectrumTransform::new();
        let input: Vec<f64> = (0..997)
            .map(|i| (2.0 * PI * 100.0 * i as f64 / 1000.0).sin())
            .collect();
        let mut output = vec![0.0; 997 / 2 + 1];
        transform.transform(&input, &mut output).unwrap();
        assert_eq!(transform.fft_size(), 1000);
        assert_eq!(peak_bin(&output), 100);
    }

    #[test]
    fn test_constant_input_dc_bin() {
        let mut transform = SpectrumTransform::new();
        let input = vec![1.0f64; 256];
        let mut output = vec![0.0; 129];
        transform.transform(&input, &mut output).unwrap();
        // |FFT[0]| = N, scaled by 2/N
        assert_relative_eq!(output[0], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_remove_dc_clears_dc_bin() {
        let mut transform = SpectrumTransform::new();
        transform.set_remove_dc(true);
        let input: Vec<f64> = sine(1.0, 10.0, 512).iter().map(|v| v + 5.0).collect();
        let mut output = vec![0.0; 257];
        transform.transform(&input, &mut output).unwrap();
        assert_abs_diff_eq!(output[0], 0.0, epsilon = 1e-9);
        assert_eq!(peak_bin(&output), 10);
    }

    #[test]
    fn test_invalid_window_length_keeps_previous_window() {
        let mut transform = SpectrumTransform::new();
        assert!(transform.set_window(WindowKind::Hanning, 256, 0.0));
        assert!(!transform.set_window(WindowKind::Hamming, 1, 0.0));
        assert!(!transform.set_window(WindowKind::Hamming, 0, 0.0));
        assert_eq!(transform.window().kind, WindowKind::Hanning);
        assert_eq!(transform.window().length, 256);
    }

    #[test]
    fn test_window_follows_input_length() {
        let mut transform = SpectrumTransform::new();
        assert!(transform.set_window(WindowKind::Hanning, 16, 0.0));
        assert!(transform.set_input_length(64, true));
        let input = vec![1.0f64; 64];
        let mut output = vec![0.0; 33];
        transform.transform(&input, &mut output).unwrap();
        assert_eq!(transform.window().length, 64);
    }

    #[test]
    fn test_one_sample_frame_keeps_window_length_floor() {
        // A single-sample frame must not drag the window length below the
        // two-sample minimum; the table would divide by length - 1 == 0.
        let mut transform = SpectrumTransform::new();
        assert!(transform.set_window(WindowKind::Hanning, 1024, 0.0));
        assert!(transform.set_input_length(1, true));
        assert_eq!(transform.window().length, 1024);

        let mut output = vec![0.0; 1];
        transform.transform(&[1.0f64], &mut output).unwrap();
        assert!(output[0].is_finite(), "spectrum bin {}", output[0]);
    }

    #[test]
    fn test_fixed_short_window_tapers_only_its_own_length() {
        let mut transform = SpectrumTransform::new();
        assert!(transform.set_window(WindowKind::Hanning, 4, 0.0));
        assert!(transform.set_input_length(8, false));
        let input = vec![1.0f64; 8];
        let mut output = vec![0.0; 5];
        transform.transform(&input, &mut output).unwrap();
        // First four samples become [0, 0.75, 0.75, 0], the tail stays 1:
        // DC bin is (0.75 + 0.75 + 4) * 2/8
        assert_relative_eq!(output[0], 1.125, epsilon = 1e-9);
        assert_eq!(transform.window().length, 4);
    }

    #[test]
    fn test_hanning_window_spreads_constant_energy() {
        // Windowing a constant signal moves energy out of the DC bin
        let mut transform = SpectrumTransform::new();
        assert!(transform.set_window(WindowKind::Hanning, 256, 0.0));
        assert!(transform.set_input_length(256, true));
        let input = vec![1.0f64; 256];
        let mut output = vec![0.0; 129];
        transform.transform(&input, &mut output).unwrap();
        // Hann coherent gain is 0.5: DC bin 2/N * N/2 ~ 1
        assert_abs_diff_eq!(output[0], 1.0, epsilon = 0.01);
        assert!(output[1] > 0.1);
        // Energy beyond the window's own spectral width stays negligible
        assert!(output[10] < 0.01);
    }

    #[test]
    fn test_integer_samples_convert_as_raw_code_units() {
        let mut transform = SpectrumTransform::new();
        let input: Vec<i16> = (0..1024)
            .map(|i| {
                let phase = 2.0 * PI * 100.0 * i as f64 / 1024.0;
                (1000.0 * phase.sin()).round() as i16
            })
            .collect();
        let mut output = vec![0.0; 513];
        transform.transform(&input, &mut output).unwrap();
        assert_eq!(peak_bin(&output), 100);
        // Rounding keeps the peak within half a code of the ideal amplitude
        assert_abs_diff_eq!(output[100], 1000.0, epsilon = 0.5);
    }

    #[test]
    fn test_plan_reused_across_same_size_calls() {
        let mut transform = SpectrumTransform::new();
        let input = sine(1.0, 5.0, 512);
        let mut output = vec![0.0; 257];
        transform.transform(&input, &mut output).unwrap();
        let first = output[5];
        transform.transform(&input, &mut output).unwrap();
        assert_eq!(transform.fft_size(), 512);
        assert_relative_eq!(output[5], first, epsilon = 1e-12);
    }
}
