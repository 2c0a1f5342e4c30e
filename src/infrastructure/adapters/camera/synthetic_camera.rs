//! Synthetic Camera - 生成空白帧的摄像头
//!
//! 用于没有真实设备的环境；可配置为拒绝授权或在若干帧后失效

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::ports::{CameraError, CameraPort, MediaStreamPort};
use crate::domain::attention::Frame;

/// Synthetic Camera 配置
#[derive(Debug, Clone)]
pub struct SyntheticCameraConfig {
    pub width: u32,
    pub height: u32,
    /// 获取媒体流前的等待时间
    pub acquire_delay: Duration,
    /// 拒绝授权
    pub deny_permission: bool,
    /// 成功输出这么多帧之后开始失败
    pub fail_after_frames: Option<u64>,
}

impl Default for SyntheticCameraConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            acquire_delay: Duration::ZERO,
            deny_permission: false,
            fail_after_frames: None,
        }
    }
}

pub struct SyntheticCamera {
    config: SyntheticCameraConfig,
    streams: Mutex<Vec<Arc<SyntheticStream>>>,
}

impl SyntheticCamera {
    pub fn new(config: SyntheticCameraConfig) -> Self {
        Self {
            config,
            streams: Mutex::new(Vec::new()),
        }
    }

    /// 最近一次获取的媒体流
    pub fn last_stream(&self) -> Option<Arc<SyntheticStream>> {
        self.streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    /// 仍有活动轨道的媒体流数量
    pub fn open_streams(&self) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|s| s.active_tracks() > 0)
            .count()
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(SyntheticCameraConfig::default())
    }
}

#[async_trait]
impl CameraPort for SyntheticCamera {
    async fn acquire(&self) -> Result<Arc<dyn MediaStreamPort>, CameraError> {
        if !self.config.acquire_delay.is_zero() {
            tokio::time::sleep(self.config.acquire_delay).await;
        }
        if self.config.deny_permission {
            return Err(CameraError::PermissionDenied);
        }

        let stream = Arc::new(SyntheticStream::new(
            self.config.width,
            self.config.height,
            self.config.fail_after_frames,
        ));
        self.streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(stream.clone());

        tracing::debug!(
            width = self.config.width,
            height = self.config.height,
            "SyntheticCamera: stream acquired"
        );
        Ok(stream)
    }
}

pub struct SyntheticStream {
    width: u32,
    height: u32,
    fail_after_frames: Option<u64>,
    sequence: AtomicU64,
    tracks: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl SyntheticStream {
    fn new(width: u32, height: u32, fail_after_frames: Option<u64>) -> Self {
        Self {
            width,
            height,
            fail_after_frames,
            sequence: AtomicU64::new(0),
            tracks: AtomicUsize::new(1),
            stop_calls: AtomicUsize::new(0),
        }
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn frames_captured(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaStreamPort for SyntheticStream {
    async fn capture_frame(&self) -> Result<Frame, CameraError> {
        if self.tracks.load(Ordering::SeqCst) == 0 {
            return Err(CameraError::StreamEnded);
        }
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        if self.fail_after_frames.is_some_and(|limit| sequence >= limit) {
            return Err(CameraError::CaptureFailed("device disconnected".to_string()));
        }
        Ok(Frame::blank(self.width, self.height, sequence))
    }

    async fn stop_tracks(&self) -> Result<(), CameraError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.tracks.store(0, Ordering::SeqCst);
        Ok(())
    }

    fn active_tracks(&self) -> usize {
        self.tracks.load(Ordering::SeqCst)
    }
}
