//! Spectral glide: a phase-continuous, optimal-transport based morph of every
//! analysis frame toward the next, applied across a whole recording.

pub mod engine;
pub mod error;
pub mod spectral;

pub use engine::{decay_from_time_constant, Engine, EngineConfig};
pub use error::{MorphError, Result};
