//! Fixed lowpass FIR used to decimate the device stream down to the
//! analysis rate.
//!
//! The kernel was designed for a 48 kHz input and a 12 kHz output:
//!
//! ```text
//! fsample   = 48000 Hz    fc         = 4500 Hz
//! taps      = 49          fstop      = 6000 Hz
//! ripple    = 1 dB        stop atten = 40 dB
//! ```

/// Decimation factor tied to the filter design.
pub const NDOWN: usize = 4;

/// Number of taps in the lowpass kernel.
pub const TAPS: usize = 49;

const HALF: usize = TAPS / 2;

/// Raw samples from earlier windows needed to filter a window without
/// touching its edges.
pub const CONTEXT: usize = TAPS - 1;

/// Output samples by which the streaming path trails its newest input.
pub const LAG: usize = HALF / NDOWN;

const _: () = assert!(HALF % NDOWN == 0, "kernel half-width must sit on the output grid");

const LOWPASS: [f32; TAPS] = [
    0.000_861_074_04,
    0.010_051_920_21,
    0.010_161_983_649,
    0.011_363_155_076,
    0.008_706_594_219,
    0.002_613_872_664,
    -0.005_202_883_094,
    -0.011_720_748_164,
    -0.013_752_163_325,
    -0.009_431_602_741,
    0.000_539_063_909,
    0.012_636_767_098,
    0.021_494_659_597,
    0.021_951_235_065,
    0.011_564_169_382,
    -0.007_656_470_131,
    -0.028_965_787_341,
    -0.042_637_874_109,
    -0.039_203_309_748,
    -0.013_153_301_537,
    0.034_320_769_178,
    0.094_717_832_646,
    0.154_224_604_789,
    0.197_758_325_022,
    0.213_715_139_513,
    0.197_758_325_022,
    0.154_224_604_789,
    0.094_717_832_646,
    0.034_320_769_178,
    -0.013_153_301_537,
    -0.039_203_309_748,
    -0.042_637_874_109,
    -0.028_965_787_341,
    -0.007_656_470_131,
    0.011_564_169_382,
    0.021_951_235_065,
    0.021_494_659_597,
    0.012_636_767_098,
    0.000_539_063_909,
    -0.009_431_602_741,
    -0.013_752_163_325,
    -0.011_720_748_164,
    -0.005_202_883_094,
    0.002_613_872_664,
    0.008_706_594_219,
    0.011_363_155_076,
    0.010_161_983_649,
    0.010_051_920_21,
    0.000_861_074_04,
];

/// Stateless decimating lowpass.
///
/// Holds nothing but a reference to the constant kernel, so one instance can
/// be shared freely between the producer and any number of readers.
///
/// [`Decimator::decimate`] treats each window on its own and clamps taps at
/// both edges, so a non-constant signal filtered window by window shows a
/// seam every window. Streams should use [`Decimator::decimate_with_history`],
/// which reads the previous `CONTEXT` raw samples instead and never clamps.
#[derive(Debug, Clone, Copy)]
pub struct Decimator {
    coeffs: &'static [f32; TAPS],
}

impl Decimator {
    pub const fn new() -> Self {
        Self { coeffs: &LOWPASS }
    }

    pub fn coefficients(&self) -> &[f32] {
        self.coeffs
    }

    /// DC gain of the kernel (sum of all taps).
    pub fn gain(&self) -> f32 {
        self.coeffs.iter().sum()
    }

    /// Produce output sample `index` of `window`.
    ///
    /// The kernel is centered on raw sample `index * NDOWN`, which keeps the
    /// decimated stream free of group delay. Taps that land outside the
    /// window read the nearest edge sample. No clipping is applied.
    pub fn down_sample(&self, window: &[f32], index: usize) -> f32 {
        let Some(last) = window.len().checked_sub(1) else {
            return 0.0;
        };
        let center = index * NDOWN;
        let mut acc = 0.0f32;
        for (k, coeff) in self.coeffs.iter().enumerate() {
            let pos = (center + k).saturating_sub(HALF).min(last);
            acc += window[pos] * coeff;
        }
        acc
    }

    /// Fill `out` from a window holding `out.len() * NDOWN` raw samples.
    pub fn decimate(&self, window: &[f32], out: &mut [f32]) {
        debug_assert_eq!(window.len(), out.len() * NDOWN);
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.down_sample(window, i);
        }
    }

    /// Fill `out` from `CONTEXT` raw samples of history followed by
    /// `out.len() * NDOWN` new ones.
    ///
    /// Output `i` is centered on new raw sample `(i - LAG) * NDOWN`, so the
    /// decimated stream runs `LAG` samples behind the input on the same grid.
    pub fn decimate_with_history(&self, frame: &[f32], out: &mut [f32]) {
        debug_assert_eq!(frame.len(), CONTEXT + out.len() * NDOWN);
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.down_sample(frame, i + LAG);
        }
    }
}

impl Default for Decimator {
    fn default() -> Self {
        Self::new()
    }
}
