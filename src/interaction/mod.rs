pub mod orbit;

pub use orbit::{CameraConfig, OrbitCamera};
