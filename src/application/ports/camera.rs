//! Camera Port - 摄像头媒体流抽象

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::attention::Frame;

/// 摄像头错误
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Media stream has ended")]
    StreamEnded,

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),
}

/// 已获取的媒体流
#[async_trait]
pub trait MediaStreamPort: Send + Sync {
    /// 读取当前帧
    async fn capture_frame(&self) -> Result<Frame, CameraError>;

    /// 停止所有轨道，重复调用无副作用
    async fn stop_tracks(&self) -> Result<(), CameraError>;

    /// 仍在采集的轨道数
    fn active_tracks(&self) -> usize;
}

/// Camera Port
#[async_trait]
pub trait CameraPort: Send + Sync {
    /// 请求摄像头权限并打开视频流
    async fn acquire(&self) -> Result<Arc<dyn MediaStreamPort>, CameraError>;
}
