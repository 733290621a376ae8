use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "glide",
    about = "Spectral glide: smear a recording through optimal-transport frame interpolation"
)]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: PathBuf,

    /// Glide time constant in milliseconds (larger = slower glide)
    #[arg(allow_hyphen_values = true)]
    pub time_constant_ms: f64,

    /// Output WAV file
    pub output: PathBuf,

    /// Analysis window length in milliseconds
    #[arg(long, default_value_t = 50.0)]
    pub window_ms: f64,

    /// Zero-padding multiplier applied to each window before the FFT
    #[arg(long, default_value_t = 7)]
    pub padding: usize,

    /// Widest interval, in octaves, that glides instead of cross-fading
    #[arg(long, default_value_t = 0.5)]
    pub max_glide_octaves: f64,

    /// Keep only spectral peaks instead of every FFT bin
    #[arg(long)]
    pub peaks: bool,

    /// Peak floor relative to the loudest bin (dB, used with --peaks)
    #[arg(long, default_value_t = -60.0, allow_hyphen_values = true)]
    pub peak_floor_db: f64,

    /// Output bit depth for integer PCM (16, 24 or 32)
    #[arg(long, default_value_t = 24)]
    pub bit_depth: u16,

    /// Write 32-bit float samples instead of integer PCM
    #[arg(long)]
    pub float: bool,

    /// Worker threads for channel processing (default: one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Config file (default: ./glide.toml or the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
