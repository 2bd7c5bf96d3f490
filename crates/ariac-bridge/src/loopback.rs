//! 进程内回环适配器
//!
//! 不依赖 ROS/rosbridge，供单元测试与集成测试使用：
//!
//! - `LoopbackBridge`: 交给被测代码的 `Bridge` 实现
//! - `LoopbackHandle`: 测试侧控制句柄（注入订阅消息、注册服务、检查发布记录）
//!
//! 行为尽量贴近 rosbridge：只有已订阅的话题会收到注入的消息，
//! 未广播的话题不能发布，调用不存在的服务返回 `ServiceFailed`。

use crate::{Bridge, BridgeError, Incoming, ROSAPI_SERVICES};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// 服务处理函数：输入 `args`，返回 `values` 或失败描述
pub type ServiceHandler = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

#[derive(Default)]
struct LoopbackState {
    /// topic → type
    advertised: HashMap<String, String>,
    /// topic → type
    subscriptions: HashMap<String, String>,
    /// 发布记录（按时间顺序）
    published: Vec<Incoming>,
    /// service → handler（有序，便于 rosapi 列表稳定）
    services: BTreeMap<String, ServiceHandler>,
    /// 服务调用记录（service, args）
    calls: Vec<(String, Value)>,
}

/// 回环 Bridge
pub struct LoopbackBridge {
    state: Arc<Mutex<LoopbackState>>,
    inbound: Receiver<Incoming>,
}

/// 测试侧控制句柄
#[derive(Clone)]
pub struct LoopbackHandle {
    state: Arc<Mutex<LoopbackState>>,
    inbound: Sender<Incoming>,
}

impl LoopbackBridge {
    /// 创建回环 Bridge 及其控制句柄
    pub fn new() -> (Self, LoopbackHandle) {
        let state = Arc::new(Mutex::new(LoopbackState::default()));
        let (tx, rx) = unbounded();
        (
            Self {
                state: state.clone(),
                inbound: rx,
            },
            LoopbackHandle { state, inbound: tx },
        )
    }
}

impl Bridge for LoopbackBridge {
    fn advertise(&self, topic: &str, msg_type: &str) -> Result<(), BridgeError> {
        self.state.lock().advertised.insert(topic.to_string(), msg_type.to_string());
        Ok(())
    }

    fn publish(&self, topic: &str, msg: Value) -> Result<(), BridgeError> {
        let mut state = self.state.lock();
        if !state.advertised.contains_key(topic) {
            return Err(BridgeError::Protocol(format!(
                "topic '{}' has not been advertised",
                topic
            )));
        }
        state.published.push(Incoming {
            topic: topic.to_string(),
            msg,
        });
        Ok(())
    }

    fn subscribe(
        &self,
        topic: &str,
        msg_type: &str,
        _queue_length: usize,
    ) -> Result<(), BridgeError> {
        self.state.lock().subscriptions.insert(topic.to_string(), msg_type.to_string());
        Ok(())
    }

    fn call_service(&self, service: &str, args: Value) -> Result<Value, BridgeError> {
        // 释放锁后再调用 handler，handler 内可以安全地使用 LoopbackHandle
        let handler = {
            let mut state = self.state.lock();
            if service == ROSAPI_SERVICES {
                let names: Vec<&String> = state.services.keys().collect();
                return Ok(json!({ "services": names }));
            }
            state.calls.push((service.to_string(), args.clone()));
            state.services.get(service).cloned()
        };

        match handler {
            Some(handler) => handler(args).map_err(|message| BridgeError::ServiceFailed {
                service: service.to_string(),
                message,
            }),
            None => Err(BridgeError::ServiceFailed {
                service: service.to_string(),
                message: "Service does not exist".to_string(),
            }),
        }
    }

    fn receive_timeout(&self, timeout: Duration) -> Result<Incoming, BridgeError> {
        match self.inbound.recv_timeout(timeout) {
            Ok(incoming) => Ok(incoming),
            Err(RecvTimeoutError::Timeout) => Err(BridgeError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::Disconnected),
        }
    }
}

impl LoopbackHandle {
    /// 向已订阅的话题注入一条消息
    ///
    /// 话题未被订阅时丢弃并返回 `false`。
    pub fn inject(&self, topic: &str, msg: impl Serialize) -> bool {
        if !self.state.lock().subscriptions.contains_key(topic) {
            return false;
        }
        let msg = match serde_json::to_value(msg) {
            Ok(msg) => msg,
            Err(_) => return false,
        };
        self.inbound
            .send(Incoming {
                topic: topic.to_string(),
                msg,
            })
            .is_ok()
    }

    /// 注入原始 JSON（可用于构造畸形消息）
    pub fn inject_raw(&self, topic: &str, msg: Value) -> bool {
        self.state.lock().subscriptions.contains_key(topic)
            && self
                .inbound
                .send(Incoming {
                    topic: topic.to_string(),
                    msg,
                })
                .is_ok()
    }

    /// 注册服务
    pub fn advertise_service<F>(&self, service: &str, handler: F)
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.state.lock().services.insert(service.to_string(), Arc::new(handler));
    }

    pub fn unadvertise_service(&self, service: &str) {
        self.state.lock().services.remove(service);
    }

    /// 某话题上的全部发布记录
    pub fn published(&self, topic: &str) -> Vec<Value> {
        self.state
            .lock()
            .published
            .iter()
            .filter(|p| p.topic == topic)
            .map(|p| p.msg.clone())
            .collect()
    }

    /// 某服务被调用的次数（不含 rosapi 查询）
    pub fn call_count(&self, service: &str) -> usize {
        self.state.lock().calls.iter().filter(|(s, _)| s == service).count()
    }

    /// 某服务收到的全部请求参数
    pub fn call_args(&self, service: &str) -> Vec<Value> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|(s, _)| s == service)
            .map(|(_, args)| args.clone())
            .collect()
    }

    pub fn subscription_type(&self, topic: &str) -> Option<String> {
        self.state.lock().subscriptions.get(topic).cloned()
    }

    pub fn advertised_type(&self, topic: &str) -> Option<String> {
        self.state.lock().advertised.get(topic).cloned()
    }
}
