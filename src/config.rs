use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub glide: GlideConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_window_ms")]
    pub window_ms: f64,
    #[serde(default = "default_padding")]
    pub padding: usize,
    #[serde(default)]
    pub peaks: bool,
    #[serde(default = "default_peak_floor_db")]
    pub peak_floor_db: f64,
}

#[derive(Debug, Deserialize)]
pub struct GlideConfig {
    #[serde(default = "default_max_glide_octaves")]
    pub max_glide_octaves: f64,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u16,
    #[serde(default)]
    pub float: bool,
    pub threads: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            padding: default_padding(),
            peaks: false,
            peak_floor_db: default_peak_floor_db(),
        }
    }
}

impl Default for GlideConfig {
    fn default() -> Self {
        Self {
            max_glide_octaves: default_max_glide_octaves(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            bit_depth: default_bit_depth(),
            float: false,
            threads: None,
        }
    }
}

pub fn default_window_ms() -> f64 { 50.0 }
pub fn default_padding() -> usize { 7 }
pub fn default_peak_floor_db() -> f64 { -60.0 }
pub fn default_max_glide_octaves() -> f64 { 0.5 }
pub fn default_bit_depth() -> u16 { 24 }

/// Explicit path first, then `glide.toml` in the working directory, then the
/// per-user config locations.
pub fn find_config(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let local = PathBuf::from("glide.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("glide").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("glide").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    })
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Option<Config> {
    match toml::from_str(content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::warn!("Invalid config: {}", err);
            None
        }
    }
}
