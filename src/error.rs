use thiserror::Error;

/// Failures raised by the spectral engine. All of them are detected before any
/// output is produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MorphError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("degenerate frame: {which} frame has no spectral points")]
    DegenerateFrame { which: &'static str },

    #[error("invalid decay coefficient {0} (must be in (0, 1])")]
    InvalidDecay(f64),
}

pub type Result<T> = std::result::Result<T, MorphError>;
