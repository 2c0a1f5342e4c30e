//! Focus Watcher - 页面可见性监控
//!
//! 每次切出页面累计一次违规，达到上限后要求终止会话；计数在会话内不会重置

use serde::{Deserialize, Serialize};

/// 默认违规上限
pub const DEFAULT_FOCUS_VIOLATION_LIMIT: u32 = 3;

/// 一次可见性变化的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FocusNotice {
    /// 切出页面，未达上限
    Warning { count: u32, limit: u32 },
    /// 切出页面，达到上限
    LimitExceeded { count: u32, limit: u32 },
    /// 回到页面
    WelcomeBack,
}

impl FocusNotice {
    pub fn requires_termination(&self) -> bool {
        matches!(self, FocusNotice::LimitExceeded { .. })
    }

    pub fn message(&self) -> String {
        match self {
            FocusNotice::Warning { count, limit } => {
                format!("You switched tabs ({}/{}). Please stay focused.", count, limit)
            }
            FocusNotice::LimitExceeded { .. } => {
                "You have switched tabs too many times. Interview will now end.".to_string()
            }
            FocusNotice::WelcomeBack => "Welcome back to the interview tab.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusWatcher {
    count: u32,
    limit: u32,
}

impl FocusWatcher {
    pub fn new(limit: u32) -> Self {
        Self {
            count: 0,
            limit: limit.max(1),
        }
    }

    /// 处理一次可见性变化
    pub fn observe(&mut self, hidden: bool) -> FocusNotice {
        if !hidden {
            return FocusNotice::WelcomeBack;
        }
        self.count = self.count.saturating_add(1);
        if self.count < self.limit {
            FocusNotice::Warning {
                count: self.count,
                limit: self.limit,
            }
        } else {
            FocusNotice::LimitExceeded {
                count: self.count,
                limit: self.limit,
            }
        }
    }

    pub fn violations(&self) -> u32 {
        self.count
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for FocusWatcher {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUS_VIOLATION_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation() {
        let mut watcher = FocusWatcher::default();

        let first = watcher.observe(true);
        assert_eq!(first, FocusNotice::Warning { count: 1, limit: 3 });
        assert!(!first.requires_termination());

        assert_eq!(watcher.observe(false), FocusNotice::WelcomeBack);

        let second = watcher.observe(true);
        assert!(!second.requires_termination());
        assert_eq!(second.message(), "You switched tabs (2/3). Please stay focused.");

        let third = watcher.observe(true);
        assert!(third.requires_termination());
        assert_eq!(watcher.violations(), 3);
    }

    #[test]
    fn test_visible_does_not_count() {
        let mut watcher = FocusWatcher::new(2);
        for _ in 0..5 {
            watcher.observe(false);
        }
        assert_eq!(watcher.violations(), 0);
    }

    #[test]
    fn test_counter_keeps_growing_past_limit() {
        let mut watcher = FocusWatcher::new(1);
        assert!(watcher.observe(true).requires_termination());
        assert!(watcher.observe(true).requires_termination());
        assert_eq!(watcher.violations(), 2);
    }
}
