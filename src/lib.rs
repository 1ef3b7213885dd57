pub mod acquisition;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod monitor;
pub mod output;
pub mod power;
pub mod rpm;
pub mod signal_processing;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use monitor::{PowerMonitor, ShutdownHandle};
pub use wav::save_capture;
