use crate::error::{MorphError, Result};

/// Longest transform the layout accepts.
pub const MAX_FFT_LEN: usize = 1 << 26;

/// One spectral peak or bin contribution within a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpectralPoint {
    /// Frequency in Hz
    pub frequency: f64,
    /// Linear magnitude (>= 0)
    pub amplitude: f64,
    /// Phase in radians, relative to the start of the analysis window
    pub phase: f64,
}

impl SpectralPoint {
    pub fn new(frequency: f64, amplitude: f64) -> Self {
        Self {
            frequency,
            amplitude,
            phase: 0.0,
        }
    }

    pub fn with_phase(frequency: f64, amplitude: f64, phase: f64) -> Self {
        Self {
            frequency,
            amplitude,
            phase,
        }
    }
}

/// Points of one analysis window, sorted by ascending frequency.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub points: Vec<SpectralPoint>,
}

impl Frame {
    pub fn new(points: Vec<SpectralPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total amplitude mass of the frame.
    pub fn mass(&self) -> f64 {
        self.points.iter().map(|p| p.amplitude).sum()
    }

    pub fn is_sorted(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].frequency <= w[1].frequency)
    }
}

/// Window geometry shared by analysis and synthesis.
///
/// Frame `w` is centered on sample `w * hop` and covers
/// `[w * hop - hop, w * hop + hop)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameLayout {
    pub sample_rate: u32,
    /// Window length in samples (always `2 * hop`)
    pub window_len: usize,
    pub hop: usize,
    /// Zero-padding multiplier applied before the transform
    pub padding: usize,
    /// Transform length (`window_len * padding`)
    pub fft_len: usize,
    /// Number of samples in the analyzed buffer
    pub num_samples: usize,
}

impl FrameLayout {
    pub fn new(
        sample_rate: u32,
        window_seconds: f64,
        padding: usize,
        num_samples: usize,
    ) -> Result<Self> {
        if !window_seconds.is_finite() || window_seconds <= 0.0 {
            return Err(MorphError::InvalidConfig(format!(
                "window duration must be positive, got {window_seconds}s"
            )));
        }
        if padding < 1 {
            return Err(MorphError::InvalidConfig(
                "padding factor must be at least 1".into(),
            ));
        }
        if sample_rate == 0 {
            return Err(MorphError::InvalidConfig("sample rate must be nonzero".into()));
        }
        if num_samples == 0 {
            return Err(MorphError::InvalidConfig("sample buffer is empty".into()));
        }

        let hop = (window_seconds * sample_rate as f64 / 2.0).round();
        if hop < 1.0 {
            return Err(MorphError::InvalidConfig(format!(
                "window of {window_seconds}s is shorter than two samples at {sample_rate}Hz"
            )));
        }
        let too_long = || {
            MorphError::InvalidConfig(format!(
                "window of {window_seconds}s with {padding}x padding exceeds the \
                 {MAX_FFT_LEN}-point transform limit"
            ))
        };
        if hop > MAX_FFT_LEN as f64 {
            return Err(too_long());
        }
        let hop = hop as usize;
        let window_len = 2 * hop;
        let fft_len = window_len
            .checked_mul(padding)
            .filter(|&len| len <= MAX_FFT_LEN)
            .ok_or_else(too_long)?;

        Ok(Self {
            sample_rate,
            window_len,
            hop,
            padding,
            fft_len,
            num_samples,
        })
    }

    pub fn num_frames(&self) -> usize {
        self.num_samples.div_ceil(self.hop) + 1
    }

    /// Width of one transform bin in Hz.
    pub fn bin_hz(&self) -> f64 {
        self.sample_rate as f64 / self.fft_len as f64
    }

    /// First sample covered by frame `w` (may be negative at the start).
    pub fn frame_start(&self, w: usize) -> isize {
        (w * self.hop) as isize - self.hop as isize
    }

    pub fn window_seconds(&self) -> f64 {
        self.window_len as f64 / self.sample_rate as f64
    }
}

/// Every frame of one channel together with the layout that produced them.
#[derive(Clone, Debug)]
pub struct Spectrogram {
    pub layout: FrameLayout,
    pub frames: Vec<Frame>,
}
