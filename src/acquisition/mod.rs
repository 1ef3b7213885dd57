pub mod adc;
pub mod buffer;
pub mod replay;
pub mod sampler;

pub use adc::AnalogChannel;
pub use buffer::SampleBuffer;
pub use replay::{ReplayChannel, load_capture};
pub use sampler::WaveformSampler;
