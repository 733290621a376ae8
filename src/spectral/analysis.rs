use rustfft::num_complex::Complex64;

use super::fft::{hann_window, Fft};
use super::frame::{Frame, FrameLayout, SpectralPoint, Spectrogram};
use crate::error::{MorphError, Result};

/// Rule used to turn a spectrum into spectral points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PointSelection {
    /// One point per bin from DC to Nyquist. Analysis followed by synthesis
    /// reconstructs the input.
    #[default]
    AllBins,
    /// Local magnitude maxima no more than `floor_db` below the loudest bin,
    /// with parabolic frequency refinement.
    Peaks { floor_db: f64 },
}

/// Split a waveform into Hann-windowed, zero-padded frames of spectral points.
pub fn analyze(
    samples: &[f64],
    sample_rate: u32,
    window_seconds: f64,
    padding: usize,
) -> Result<Spectrogram> {
    let analyzer = Analyzer::new(samples, sample_rate, window_seconds, padding)?;
    let frames = analyzer.frames().collect();
    Ok(Spectrogram {
        layout: *analyzer.layout(),
        frames,
    })
}

/// Lazy frame producer over one channel.
pub struct Analyzer<'a> {
    samples: &'a [f64],
    layout: FrameLayout,
    selection: PointSelection,
    window: Vec<f64>,
    fft: Fft,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        samples: &'a [f64],
        sample_rate: u32,
        window_seconds: f64,
        padding: usize,
    ) -> Result<Self> {
        let layout = FrameLayout::new(sample_rate, window_seconds, padding, samples.len())?;
        if let Some(index) = samples.iter().position(|x| !x.is_finite()) {
            return Err(MorphError::InvalidConfig(format!(
                "sample {index} is not a finite value ({})",
                samples[index]
            )));
        }
        Ok(Self {
            samples,
            window: hann_window(layout.window_len),
            fft: Fft::new(layout.fft_len),
            layout,
            selection: PointSelection::AllBins,
        })
    }

    pub fn with_selection(mut self, selection: PointSelection) -> Result<Self> {
        if let PointSelection::Peaks { floor_db } = selection {
            if !floor_db.is_finite() || floor_db > 0.0 {
                return Err(MorphError::InvalidConfig(format!(
                    "peak floor must be a finite level <= 0 dB, got {floor_db}"
                )));
            }
        }
        self.selection = selection;
        Ok(self)
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        (0..self.layout.num_frames()).map(move |w| self.frame(w))
    }

    /// Analyze the window of frame `w`. Samples outside the buffer read as zero.
    pub fn frame(&self, w: usize) -> Frame {
        let start = self.layout.frame_start(w);
        let mut buffer = vec![Complex64::new(0.0, 0.0); self.layout.fft_len];
        for (i, slot) in buffer.iter_mut().take(self.layout.window_len).enumerate() {
            let idx = start + i as isize;
            if idx >= 0 && (idx as usize) < self.samples.len() {
                *slot = Complex64::new(self.samples[idx as usize] * self.window[i], 0.0);
            }
        }
        self.fft.forward(&mut buffer);

        let spectrum = &buffer[..=self.layout.fft_len / 2];
        match self.selection {
            PointSelection::AllBins => self.all_bins(spectrum),
            PointSelection::Peaks { floor_db } => self.peaks(spectrum, floor_db),
        }
    }

    fn all_bins(&self, spectrum: &[Complex64]) -> Frame {
        let bin_hz = self.layout.bin_hz();
        Frame::new(
            spectrum
                .iter()
                .enumerate()
                .map(|(k, x)| SpectralPoint::with_phase(k as f64 * bin_hz, x.norm(), x.arg()))
                .collect(),
        )
    }

    fn peaks(&self, spectrum: &[Complex64], floor_db: f64) -> Frame {
        let bin_hz = self.layout.bin_hz();
        let magnitudes: Vec<f64> = spectrum.iter().map(|x| x.norm()).collect();
        let loudest = magnitudes.iter().copied().fold(0.0f64, f64::max);
        if loudest <= 0.0 {
            return Frame::default();
        }
        let threshold = loudest * 10f64.powf(floor_db / 20.0);

        let mut points = Vec::new();
        for k in 1..magnitudes.len().saturating_sub(1) {
            let mag = magnitudes[k];
            if mag < threshold || mag <= magnitudes[k - 1] || mag < magnitudes[k + 1] {
                continue;
            }
            let (offset, peak) =
                parabolic_peak(magnitudes[k - 1], mag, magnitudes[k + 1]);
            points.push(SpectralPoint::with_phase(
                (k as f64 + offset) * bin_hz,
                peak,
                spectrum[k].arg(),
            ));
        }
        // Peaks are at least two bins apart and offsets stay within half a bin.
        Frame::new(points)
    }
}

/// Vertex of the parabola through three log magnitudes around a local maximum.
/// Returns the bin offset in [-0.5, 0.5] and the interpolated linear magnitude.
fn parabolic_peak(left: f64, center: f64, right: f64) -> (f64, f64) {
    const FLOOR: f64 = 1e-300;
    let a = left.max(FLOOR).ln();
    let b = center.max(FLOOR).ln();
    let c = right.max(FLOOR).ln();
    let denom = a - 2.0 * b + c;
    if denom >= 0.0 {
        return (0.0, center);
    }
    let offset = (0.5 * (a - c) / denom).clamp(-0.5, 0.5);
    let peak = (b - 0.25 * (a - c) * offset).exp();
    (offset, peak)
}
