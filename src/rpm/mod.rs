//! Pulse-counting rotation rate estimation
//!
//! A sensor input raises an edge callback per pulse; a periodic timer turns
//! the count into RPM, smooths it over a ring of recent values and shows it
//! on a numeric display.

mod estimator;
mod hardware;
mod pulse_counter;

pub use estimator::{RotationRateEstimator, RpmCore, RpmHealth, RpmReading, RpmState};
pub use hardware::{EdgeHandler, EdgeInput, PeriodicTimer, Pull, ThreadTimer, TickHandler};
pub use pulse_counter::PulseCounter;
