//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod camera;
pub mod classifier;
pub mod synthesis;
pub mod voice;

pub use camera::*;
pub use classifier::*;
pub use synthesis::*;
pub use voice::*;
