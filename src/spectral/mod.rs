pub mod analysis;
pub mod fft;
pub mod frame;
pub mod loudness;
pub mod synthesis;
pub mod transport;

pub use analysis::{analyze, Analyzer, PointSelection};
pub use frame::{Frame, FrameLayout, SpectralPoint, Spectrogram};
pub use synthesis::{synthesize, Synthesizer};
pub use transport::{interpolate, interpolate_with, Glide, GlideState, TransportOptions};
