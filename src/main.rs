mod audio;
mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use audio::encode::{write_wav, WavFormat};
use cli::Cli;
use spectral_glide::spectral::PointSelection;
use spectral_glide::{Engine, EngineConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();
    apply_config(&mut cli);

    if cli.time_constant_ms < 0.0 {
        anyhow::bail!("time constant must be greater than zero (got {} ms)", cli.time_constant_ms);
    }
    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }
    let wav_format = WavFormat::from_options(cli.bit_depth, cli.float)?;

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let engine = Engine::new(EngineConfig {
        window_seconds: cli.window_ms / 1000.0,
        padding: cli.padding,
        time_constant_seconds: cli.time_constant_ms / 1000.0,
        selection: if cli.peaks {
            PointSelection::Peaks { floor_db: cli.peak_floor_db }
        } else {
            PointSelection::AllBins
        },
        max_glide_octaves: cli.max_glide_octaves,
    })
    .context("Invalid glide settings")?;

    log::info!("glide - spectral glide via optimal transport");
    log::info!("Input: {}", cli.input.display());
    log::info!("Output: {}", cli.output.display());
    log::info!(
        "Window: {}ms, padding: {}x, time constant: {}ms (decay {:.4})",
        cli.window_ms,
        cli.padding,
        cli.time_constant_ms,
        engine.decay()
    );

    // 1. Decode audio
    log::info!("Decoding audio...");
    let audio_data = audio::decode::decode_audio(&cli.input)?;
    log::info!("Number of channels: {}", audio_data.channels.len());
    log::info!("Sample rate: {}", audio_data.sample_rate);
    match audio_data.bits_per_sample {
        Some(bits) => log::info!("Bit depth: {}", bits),
        None => log::info!("Bit depth: unknown"),
    }
    log::info!("Number of samples: {}", audio_data.num_samples());

    // 2. Glide every channel
    let frames_per_channel = engine
        .frame_count(audio_data.num_samples(), audio_data.sample_rate)
        .context("Cannot analyze input")?;
    let total_frames = frames_per_channel as u64 * audio_data.channels.len() as u64;
    log::info!(
        "Performing optimal transport based interpolation ({} frames per channel)...",
        frames_per_channel
    );

    let pb = ProgressBar::new(total_frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let progress = |n: u64| pb.inc(n);
    let glided = engine
        .process(&audio_data.channels, audio_data.sample_rate, &progress)
        .context("Spectral glide failed")?;
    pb.finish_with_message("Interpolation complete");

    // 3. Write the result
    log::info!("Writing to file {}", cli.output.display());
    write_wav(&cli.output, &glided, audio_data.sample_rate, wav_format)?;

    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}

/// Merge config file values into `cli`. Config values apply only where the
/// CLI value is still at its default.
fn apply_config(cli: &mut Cli) {
    let Some(path) = config::find_config(cli.config.clone()) else {
        return;
    };
    let Some(cfg) = config::load_config(&path) else {
        log::warn!("Failed to load config from {}", path.display());
        return;
    };
    log::info!("Loaded config from {}", path.display());

    if cli.window_ms == config::default_window_ms() { cli.window_ms = cfg.analysis.window_ms; }
    if cli.padding == config::default_padding() { cli.padding = cfg.analysis.padding; }
    if !cli.peaks { cli.peaks = cfg.analysis.peaks; }
    if cli.peak_floor_db == config::default_peak_floor_db() {
        cli.peak_floor_db = cfg.analysis.peak_floor_db;
    }
    if cli.max_glide_octaves == config::default_max_glide_octaves() {
        cli.max_glide_octaves = cfg.glide.max_glide_octaves;
    }
    if cli.bit_depth == config::default_bit_depth() { cli.bit_depth = cfg.output.bit_depth; }
    if !cli.float { cli.float = cfg.output.float; }
    if cli.threads.is_none() { cli.threads = cfg.output.threads; }
}
