//! 会话计时器
//!
//! 每个周期回调一次，仅用于界面显示

use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::LoopHandle;

/// 启动计时器，首次回调在一个周期之后
pub fn start_clock<F>(period: Duration, mut on_tick: F) -> LoopHandle
where
    F: FnMut() + Send + 'static,
{
    LoopHandle::spawn("clock", move |token| async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => on_tick(),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_clock_ticks_until_cancelled() {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = ticks.clone();
        let mut handle = start_clock(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }
}
