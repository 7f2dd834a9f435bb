pub mod detector;
pub mod landmark;

pub use detector::PoseDetector;
pub use landmark::{Landmark, LandmarkIndex, LandmarkSet, REQUIRED_JOINTS};
