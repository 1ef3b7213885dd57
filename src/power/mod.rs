pub mod calibration;
pub mod estimator;

pub use calibration::{
    PowerFactorCorrection, ReadingCorrection, current_band_nudge, speed_band_offsets,
};
pub use estimator::{PowerEstimate, PowerEstimator, estimate_power, phase_difference};
