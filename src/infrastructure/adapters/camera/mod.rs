//! Camera Adapter - 摄像头实现

mod synthetic_camera;

pub use synthetic_camera::{SyntheticCamera, SyntheticCameraConfig, SyntheticStream};
