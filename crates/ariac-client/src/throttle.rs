//! 日志限频
//!
//! 每个限频的日志点持有一个 `Throttle`，记录上一次输出的时刻。

use std::time::{Duration, Instant};

/// 单个日志点的限频器
///
/// 首次调用总是放行（与 `ROS_INFO_THROTTLE` 一致），之后每个 `interval` 内最多放行一次。
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_emitted: Option<Instant>,
}

impl Throttle {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emitted: None,
        }
    }

    /// 判断 `now` 时刻是否可以输出；放行时记录时刻
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_emitted {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last_emitted = Some(now);
                true
            },
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_emitted(&self) -> Option<Instant> {
        self.last_emitted
    }
}
