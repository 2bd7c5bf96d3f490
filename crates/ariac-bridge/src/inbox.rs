//! 订阅消息收件箱
//!
//! 所有话题共用一个按到达顺序排列的队列，但每个话题最多保留 `queue_length` 条；
//! 超出时丢弃该话题最旧的一条（与 roscpp 订阅队列一致）。
//! `queue_length` 为 0 表示不限长度，未登记的话题只保留最新一条。

use crate::{BridgeError, Incoming};
use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

const UNREGISTERED_QUEUE_LENGTH: usize = 1;

#[derive(Default)]
struct InboxState {
    frames: VecDeque<Incoming>,
    /// topic → 队列中的条数
    queued: HashMap<String, usize>,
    /// topic → queue_length
    limits: HashMap<String, usize>,
    closed: bool,
}

impl InboxState {
    fn pop_front(&mut self) -> Option<Incoming> {
        let incoming = self.frames.pop_front()?;
        if let Some(count) = self.queued.get_mut(&incoming.topic) {
            *count = count.saturating_sub(1);
        }
        Some(incoming)
    }
}

#[derive(Default)]
pub(crate) struct Inbox {
    state: Mutex<InboxState>,
    ready: Condvar,
}

impl Inbox {
    pub(crate) fn set_queue_length(&self, topic: &str, queue_length: usize) {
        self.state.lock().limits.insert(topic.to_string(), queue_length);
    }

    /// 入队，返回是否挤掉了同话题最旧的一条
    pub(crate) fn push(&self, incoming: Incoming) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let limit = state
            .limits
            .get(&incoming.topic)
            .copied()
            .unwrap_or(UNREGISTERED_QUEUE_LENGTH);
        let count = state.queued.entry(incoming.topic.clone()).or_default();

        let mut dropped = false;
        if limit > 0
            && *count >= limit
            && let Some(oldest) = state.frames.iter().position(|f| f.topic == incoming.topic)
        {
            state.frames.remove(oldest);
            dropped = true;
        } else {
            *count += 1;
        }
        state.frames.push_back(incoming);
        drop(guard);

        self.ready.notify_one();
        dropped
    }

    /// 不再有新消息；已入队的仍可取出
    pub(crate) fn close(&self) {
        self.state.lock().closed = true;
        self.ready.notify_all();
    }

    /// 等待下一条消息
    ///
    /// 队列为空时：已关闭返回 `Disconnected`，超时返回 `Timeout`。
    pub(crate) fn pop_timeout(&self, timeout: Duration) -> Result<Incoming, BridgeError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        loop {
            if let Some(incoming) = state.pop_front() {
                return Ok(incoming);
            }
            if state.closed {
                return Err(BridgeError::Disconnected);
            }
            match deadline {
                Some(deadline) if Instant::now() >= deadline => return Err(BridgeError::Timeout),
                Some(deadline) => {
                    self.ready.wait_until(&mut state, deadline);
                },
                None => self.ready.wait(&mut state),
            }
        }
    }
}
