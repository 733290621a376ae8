//! Equal-loudness weighting of spectral point magnitudes.
//!
//! The curve is the A-weighting contour normalized to unity gain at 1 kHz.
//! Frequencies are clamped to the audible range before evaluation, so DC and
//! anything above 20 kHz take the boundary gain and the gain never reaches zero.

use super::frame::Frame;

const MIN_HZ: f64 = 20.0;
const MAX_HZ: f64 = 20_000.0;
const REFERENCE_HZ: f64 = 1000.0;

fn a_weighting_response(frequency: f64) -> f64 {
    let f2 = frequency * frequency;
    let numerator = 12194.0f64.powi(2) * f2 * f2;
    let denominator = (f2 + 20.6f64.powi(2))
        * ((f2 + 107.7f64.powi(2)) * (f2 + 737.9f64.powi(2))).sqrt()
        * (f2 + 12194.0f64.powi(2));
    numerator / denominator
}

/// Linear gain of the perceptual curve at `frequency` Hz.
pub fn gain(frequency: f64) -> f64 {
    let clamped = if frequency.is_nan() {
        MIN_HZ
    } else {
        frequency.clamp(MIN_HZ, MAX_HZ)
    };
    a_weighting_response(clamped) / a_weighting_response(REFERENCE_HZ)
}

pub fn apply_frame(frame: &mut Frame) {
    for point in frame.points.iter_mut() {
        point.amplitude *= gain(point.frequency);
    }
}

pub fn remove_frame(frame: &mut Frame) {
    for point in frame.points.iter_mut() {
        point.amplitude /= gain(point.frequency);
    }
}

/// Weight every point by the perceptual curve, in place.
pub fn apply(frames: &mut [Frame]) {
    frames.iter_mut().for_each(apply_frame);
}

/// Undo [`apply`], in place.
pub fn remove(frames: &mut [Frame]) {
    frames.iter_mut().for_each(remove_frame);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::frame::SpectralPoint;

    #[test]
    fn unity_at_reference() {
        assert!((gain(1000.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn attenuates_low_frequencies() {
        assert!(gain(50.0) < 0.1);
        assert!(gain(100.0) < gain(500.0));
        // A-weighting is roughly +1.3 dB around 2.5 kHz.
        let db = 20.0 * gain(2500.0).log10();
        assert!((db - 1.3).abs() < 0.2, "got {db} dB");
    }

    #[test]
    fn edges_use_boundary_gain() {
        assert_eq!(gain(0.0), gain(MIN_HZ));
        assert_eq!(gain(-5.0), gain(MIN_HZ));
        assert_eq!(gain(30_000.0), gain(MAX_HZ));
        assert!(gain(0.0) > 0.0);
        assert!(gain(f64::NAN) > 0.0);
    }

    #[test]
    fn remove_inverts_apply() {
        let original = vec![
            Frame::new(vec![
                SpectralPoint::new(0.0, 0.3),
                SpectralPoint::new(55.0, 1.0),
                SpectralPoint::new(1000.0, 2.5),
                SpectralPoint::new(8000.0, 0.001),
                SpectralPoint::new(22050.0, 0.7),
            ]),
            Frame::new(vec![SpectralPoint::new(440.0, 0.0)]),
        ];
        let mut frames = original.clone();
        apply(&mut frames);
        assert!(frames[0].points[1].amplitude < original[0].points[1].amplitude);
        remove(&mut frames);
        for (a, b) in frames.iter().zip(&original) {
            for (p, q) in a.points.iter().zip(&b.points) {
                assert_eq!(p.frequency, q.frequency);
                assert!((p.amplitude - q.amplitude).abs() <= 1e-9 * q.amplitude.max(1e-300));
            }
        }
    }
}
