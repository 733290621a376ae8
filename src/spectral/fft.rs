use std::sync::Arc;

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

/// Forward/inverse transform pair of one length, planned once per channel.
pub struct Fft {
    forward: Arc<dyn rustfft::Fft<f64>>,
    inverse: Arc<dyn rustfft::Fft<f64>>,
    len: usize,
}

impl Fft {
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            forward: planner.plan_fft_forward(len),
            inverse: planner.plan_fft_inverse(len),
            len,
        }
    }

    pub fn forward(&self, buffer: &mut [Complex64]) {
        self.forward.process(buffer);
    }

    /// Inverse transform, scaled so that `inverse(forward(x)) == x`.
    pub fn inverse(&self, buffer: &mut [Complex64]) {
        self.inverse.process(buffer);
        let scale = 1.0 / self.len as f64;
        for x in buffer.iter_mut() {
            *x *= scale;
        }
    }
}

/// Periodic Hann window. At 50% overlap the windows sum to one.
pub fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (std::f64::consts::TAU * i as f64 / size as f64).cos()))
        .collect()
}
