//! 可取消的后台循环句柄
//!
//! 帧分析循环、计时器、事件泵都以句柄形式由编排器独占持有

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// 后台循环句柄
///
/// `cancel` 幂等；从未启动的句柄取消也是 no-op
#[derive(Debug, Default)]
pub struct LoopHandle {
    token: Option<CancellationToken>,
}

impl LoopHandle {
    /// 未启动的句柄
    pub fn idle() -> Self {
        Self { token: None }
    }

    /// 启动循环，`body` 收到令牌后应在令牌取消时尽快返回
    pub fn spawn<F, Fut>(name: &'static str, body: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let task = body(token.clone());
        tokio::spawn(async move {
            task.await;
            tracing::trace!(task = name, "Background loop exited");
        });
        Self { token: Some(token) }
    }

    /// 取消循环并释放令牌
    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_cancel_idle_is_noop() {
        let mut handle = LoopHandle::idle();
        handle.cancel();
        handle.cancel();
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn test_cancel_stops_loop() {
        let exited = Arc::new(AtomicBool::new(false));
        let flag = exited.clone();
        let mut handle = LoopHandle::spawn("test", move |token| async move {
            token.cancelled().await;
            flag.store(true, Ordering::SeqCst);
        });
        assert!(handle.is_running());

        handle.cancel();
        handle.cancel();
        assert!(!handle.is_running());

        for _ in 0..10 {
            if exited.load(Ordering::SeqCst) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(exited.load(Ordering::SeqCst));
    }
}
