use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

/// Sample encoding of the written WAV file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavFormat {
    /// Signed integer PCM with 16, 24 or 32 bits
    Int(u16),
    /// 32-bit IEEE float
    Float,
}

impl WavFormat {
    pub fn from_options(bit_depth: u16, float: bool) -> Result<Self> {
        if float {
            return Ok(WavFormat::Float);
        }
        match bit_depth {
            16 | 24 | 32 => Ok(WavFormat::Int(bit_depth)),
            other => anyhow::bail!("Unsupported bit depth {other} (use 16, 24 or 32)"),
        }
    }
}

/// Write channels to a WAV file, interleaving them and clamping to [-1, 1].
pub fn write_wav(
    path: &Path,
    channels: &[Vec<f64>],
    sample_rate: u32,
    format: WavFormat,
) -> Result<()> {
    let num_channels = u16::try_from(channels.len()).context("Too many channels for WAV")?;
    if num_channels == 0 {
        anyhow::bail!("No channels to write");
    }
    let num_samples = channels.iter().map(Vec::len).max().unwrap_or(0);

    let spec = match format {
        WavFormat::Int(bits) => WavSpec {
            channels: num_channels,
            sample_rate,
            bits_per_sample: bits,
            sample_format: SampleFormat::Int,
        },
        WavFormat::Float => WavSpec {
            channels: num_channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        },
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for n in 0..num_samples {
        for channel in channels {
            let s = channel.get(n).copied().unwrap_or(0.0).clamp(-1.0, 1.0);
            match format {
                WavFormat::Int(bits) => {
                    let max = ((1i64 << (bits - 1)) - 1) as f64;
                    writer.write_sample((s * max).round() as i32)?;
                }
                WavFormat::Float => writer.write_sample(s as f32)?,
            }
        }
    }

    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {}", path.display()))?;
    Ok(())
}
