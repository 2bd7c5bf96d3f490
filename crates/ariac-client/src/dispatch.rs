//! 分发循环
//!
//! 单线程：接收 → 解码 → 交给 handler。每次接收带超时，两次接收之间检查运行标志，
//! 所以 Ctrl+C 后最多一个超时周期即可退出。

use crate::error::ClientError;
use crate::node::Node;
use crate::notification::{NotificationHandler, Reports};
use ariac_bridge::Bridge;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, trace, warn};

/// 分发统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// 成功处理的通知数
    pub received: u64,
    /// 产生的 Report 总数
    pub reports: u64,
    /// 因解码等非致命错误跳过的消息数
    pub skipped: u64,
}

/// 处理至多一条通知
///
/// 超时返回 `Ok(None)`。
pub fn spin_once<B, H>(
    node: &Node<B>,
    handler: &mut H,
    timeout: Duration,
) -> Result<Option<Reports>, ClientError>
where
    B: Bridge,
    H: NotificationHandler + ?Sized,
{
    match node.receive(timeout)? {
        Some(notification) => {
            trace!(kind = ?notification.kind(), "Dispatching notification");
            Ok(Some(handler.dispatch(&notification, Instant::now())))
        },
        None => Ok(None),
    }
}

/// 运行分发循环，直到 `running` 被清除或连接断开
///
/// 单条消息的错误只记录警告并跳过；连接断开时返回错误。
pub fn spin<B, H>(
    node: &Node<B>,
    handler: &mut H,
    running: &AtomicBool,
    timeout: Duration,
) -> Result<DispatchStats, ClientError>
where
    B: Bridge,
    H: NotificationHandler + ?Sized,
{
    let mut stats = DispatchStats::default();

    while running.load(Ordering::Acquire) {
        match spin_once(node, handler, timeout) {
            Ok(Some(reports)) => {
                stats.received += 1;
                stats.reports += reports.len() as u64;
            },
            Ok(None) => {},
            Err(e) if e.is_fatal() => {
                error!("Dispatch loop aborted: {}", e);
                return Err(e);
            },
            Err(e) => {
                warn!("Skipping message: {}", e);
                stats.skipped += 1;
            },
        }
    }

    info!(
        received = stats.received,
        skipped = stats.skipped,
        "Dispatch loop stopped"
    );
    Ok(stats)
}
