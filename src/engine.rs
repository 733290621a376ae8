use std::iter;

use rayon::prelude::*;

use crate::error::{MorphError, Result};
use crate::spectral::analysis::{Analyzer, PointSelection};
use crate::spectral::frame::FrameLayout;
use crate::spectral::loudness;
use crate::spectral::synthesis::Synthesizer;
use crate::spectral::transport::{validate_decay, Glide, GlideState, TransportOptions};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Analysis window duration in seconds
    pub window_seconds: f64,
    /// Zero-padding multiplier for the transform
    pub padding: usize,
    /// Glide time constant in seconds
    pub time_constant_seconds: f64,
    pub selection: PointSelection,
    /// Widest interval (in octaves) that glides instead of cross-fading
    pub max_glide_octaves: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_seconds: 0.05,
            padding: 7,
            time_constant_seconds: 0.1,
            selection: PointSelection::AllBins,
            max_glide_octaves: 0.5,
        }
    }
}

/// `exp(-dt / tau)`: how much of the carried frame survives one window.
pub fn decay_from_time_constant(time_constant_seconds: f64, window_seconds: f64) -> Result<f64> {
    if !time_constant_seconds.is_finite() {
        return Err(MorphError::InvalidConfig(format!(
            "time constant must be finite, got {time_constant_seconds}s"
        )));
    }
    let decay = (-window_seconds / time_constant_seconds).exp();
    validate_decay(decay)?;
    Ok(decay)
}

/// Spectral glide over whole channels.
pub struct Engine {
    config: EngineConfig,
    decay: f64,
}

impl Engine {
    /// Validate `config` and derive the decay coefficient.
    pub fn new(config: EngineConfig) -> Result<Self> {
        if !config.window_seconds.is_finite() || config.window_seconds <= 0.0 {
            return Err(MorphError::InvalidConfig(format!(
                "window duration must be positive, got {}s",
                config.window_seconds
            )));
        }
        if config.padding < 1 {
            return Err(MorphError::InvalidConfig(
                "padding factor must be at least 1".into(),
            ));
        }
        if config.max_glide_octaves.is_nan() || config.max_glide_octaves < 0.0 {
            return Err(MorphError::InvalidConfig(format!(
                "glide reach must be >= 0 octaves, got {}",
                config.max_glide_octaves
            )));
        }
        if let PointSelection::Peaks { floor_db } = config.selection {
            if !floor_db.is_finite() || floor_db > 0.0 {
                return Err(MorphError::InvalidConfig(format!(
                    "peak floor must be a finite level <= 0 dB, got {floor_db}"
                )));
            }
        }
        let decay = decay_from_time_constant(config.time_constant_seconds, config.window_seconds)?;
        Ok(Self { config, decay })
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Number of frames a channel of `num_samples` samples is analyzed into.
    pub fn frame_count(&self, num_samples: usize, sample_rate: u32) -> Result<usize> {
        let layout = FrameLayout::new(
            sample_rate,
            self.config.window_seconds,
            self.config.padding,
            num_samples,
        )?;
        Ok(layout.num_frames())
    }

    /// Run one channel through analysis, weighting, the glide fold and
    /// synthesis. `progress` is called once per folded frame.
    pub fn process_channel(
        &self,
        samples: &[f64],
        sample_rate: u32,
        progress: &(dyn Fn(u64) + Sync),
    ) -> Result<Vec<f64>> {
        let analyzer = Analyzer::new(
            samples,
            sample_rate,
            self.config.window_seconds,
            self.config.padding,
        )?
        .with_selection(self.config.selection)?;
        let layout = *analyzer.layout();

        let glide = Glide {
            window_seconds: layout.window_seconds(),
            decay: self.decay,
            options: TransportOptions {
                max_glide_octaves: self.config.max_glide_octaves,
                merge_width_hz: layout.bin_hz() / 2.0,
            },
        };

        let weighted = |w: usize| {
            let mut frame = analyzer.frame(w);
            loudness::apply_frame(&mut frame);
            frame
        };

        let first = weighted(0);
        let mut state = GlideState::new(first.clone());
        let mut synth = Synthesizer::new(layout);

        let rest = (1..layout.num_frames()).map(weighted);
        for (w, frame) in iter::once(first).chain(rest).enumerate() {
            let (next, mut glided) = state.step(&frame, &glide)?;
            state = next;
            loudness::remove_frame(&mut glided);
            synth.add(w, &glided);
            progress(1);
        }

        Ok(synth.finish())
    }

    /// Process independent channels in parallel. Any failing channel fails
    /// the whole call.
    pub fn process(
        &self,
        channels: &[Vec<f64>],
        sample_rate: u32,
        progress: &(dyn Fn(u64) + Sync),
    ) -> Result<Vec<Vec<f64>>> {
        channels
            .par_iter()
            .map(|samples| self.process_channel(samples, sample_rate, progress))
            .collect()
    }
}
