//! 归零锁存
//!
//! 状态机只有一条边：`Unzeroed -> Zeroed`，由第一条关节状态触发，之后不可复位。

/// 机械臂是否已发送过归零命令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroedLatch {
    #[default]
    Unzeroed,
    Zeroed,
}

impl ZeroedLatch {
    /// 尝试触发
    ///
    /// 仅第一次调用返回 `true`。
    pub fn trip(&mut self) -> bool {
        match self {
            ZeroedLatch::Unzeroed => {
                *self = ZeroedLatch::Zeroed;
                true
            },
            ZeroedLatch::Zeroed => false,
        }
    }

    pub fn is_zeroed(self) -> bool {
        self == ZeroedLatch::Zeroed
    }
}
