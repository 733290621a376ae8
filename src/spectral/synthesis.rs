use rustfft::num_complex::Complex64;

use super::fft::{hann_window, Fft};
use super::frame::{Frame, FrameLayout};

/// Samples whose accumulated squared window is below this are left untouched.
const NORM_FLOOR: f64 = 1e-9;

/// Resynthesize a waveform from frames laid out by `layout`.
pub fn synthesize(frames: &[Frame], layout: &FrameLayout) -> Vec<f64> {
    let mut synth = Synthesizer::new(*layout);
    for (w, frame) in frames.iter().enumerate() {
        synth.add(w, frame);
    }
    synth.finish()
}

/// Incremental weighted overlap-add synthesis.
pub struct Synthesizer {
    layout: FrameLayout,
    fft: Fft,
    window: Vec<f64>,
    spectrum: Vec<Complex64>,
    output: Vec<f64>,
    norm: Vec<f64>,
}

impl Synthesizer {
    pub fn new(layout: FrameLayout) -> Self {
        Self {
            fft: Fft::new(layout.fft_len),
            window: hann_window(layout.window_len),
            spectrum: vec![Complex64::new(0.0, 0.0); layout.fft_len],
            output: vec![0.0; layout.num_samples],
            norm: vec![0.0; layout.num_samples],
            layout,
        }
    }

    /// Inverse-transform frame `w` and overlap-add it at its time offset.
    pub fn add(&mut self, w: usize, frame: &Frame) {
        let fft_len = self.layout.fft_len;
        let half = fft_len / 2;
        let bin_hz = self.layout.bin_hz();

        self.spectrum.fill(Complex64::new(0.0, 0.0));
        for point in &frame.points {
            if !point.frequency.is_finite()
                || point.frequency < 0.0
                || !point.amplitude.is_finite()
                || !point.phase.is_finite()
            {
                continue;
            }
            let bin = ((point.frequency / bin_hz).round() as usize).min(half);
            self.spectrum[bin] += Complex64::from_polar(point.amplitude, point.phase);
        }
        for k in 1..half {
            self.spectrum[fft_len - k] = self.spectrum[k].conj();
        }
        self.fft.inverse(&mut self.spectrum);

        let start = self.layout.frame_start(w);
        for (i, (x, &win)) in self.spectrum.iter().zip(&self.window).enumerate() {
            let idx = start + i as isize;
            if idx < 0 || idx as usize >= self.output.len() {
                continue;
            }
            let idx = idx as usize;
            self.output[idx] += x.re * win;
            self.norm[idx] += win * win;
        }
    }

    pub fn finish(mut self) -> Vec<f64> {
        for (sample, &norm) in self.output.iter_mut().zip(&self.norm) {
            if norm > NORM_FLOOR {
                *sample /= norm;
            }
        }
        self.output
    }
}
