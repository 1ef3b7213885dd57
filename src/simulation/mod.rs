//! Synthetic signal sources for running without hardware

mod capture;
mod channel;
mod hall;
mod noise;
mod signal;

pub use capture::{CaptureConfig, generate_capture};
pub use channel::SineChannel;
pub use hall::SimulatedHallSensor;
pub use noise::{AdditiveNoiseConfig, ImpulseNoiseConfig, NoiseConfig, ac_power, apply_noise};
pub use signal::{MainsSignal, generate_mains_signal, to_counts};
