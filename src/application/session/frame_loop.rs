//! 帧分析循环
//!
//! 按固定间隔读取摄像头帧并分析；结果通过回调交给编排器，
//! 回调返回 `false` 时循环结束

use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use super::{AttentionMonitor, LoopHandle};
use crate::application::ports::MediaStreamPort;
use crate::domain::attention::AttentionReading;

/// 单帧处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Reading(AttentionReading),
    Failed(String),
}

/// 启动帧分析循环
pub fn start_frame_loop<F>(
    stream: Arc<dyn MediaStreamPort>,
    monitor: AttentionMonitor,
    interval: Duration,
    mut on_frame: F,
) -> LoopHandle
where
    F: FnMut(FrameOutcome) -> bool + Send + 'static,
{
    LoopHandle::spawn("frame-loop", move |token| async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                _ = token.cancelled() => break,
                outcome = analyze_next(stream.as_ref(), &monitor) => outcome,
            };
            if !on_frame(outcome) {
                break;
            }
        }
    })
}

async fn analyze_next(stream: &dyn MediaStreamPort, monitor: &AttentionMonitor) -> FrameOutcome {
    let frame = match stream.capture_frame().await {
        Ok(frame) => frame,
        Err(e) => return FrameOutcome::Failed(e.to_string()),
    };
    match monitor.analyze(&frame).await {
        Ok(reading) => FrameOutcome::Reading(reading),
        Err(e) => FrameOutcome::Failed(e.to_string()),
    }
}
