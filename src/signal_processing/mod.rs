pub mod math;
pub mod moving_average;
pub mod zero_crossing_detector;

pub use math::{index_delta_to_degrees, mean_product, mean_square, rms};
pub use moving_average::MovingAverageRing;
pub use zero_crossing_detector::{find_crossings, first_crossing};
