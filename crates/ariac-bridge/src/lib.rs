//! # ARIAC Bridge Layer
//!
//! 消息中间件抽象层，向上提供统一的发布/订阅/服务调用接口。
//!
//! - `tcp`: rosbridge v2 JSON 协议（rosbridge_server 的 TCP 传输）
//! - `loopback`: 进程内回环实现，用于测试（无需 ROS 环境）
//! - `protocol`: rosbridge 操作帧定义与编解码

use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

mod inbox;
pub mod loopback;
pub mod protocol;
pub mod tcp;

pub use loopback::{LoopbackBridge, LoopbackHandle};
pub use tcp::TcpBridge;

/// rosapi 提供的服务列表查询（用于判断服务是否存在）
pub const ROSAPI_SERVICES: &str = "/rosapi/services";

/// Bridge 层统一错误类型
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Bridge disconnected")]
    Disconnected,
    #[error("Read timeout")]
    Timeout,
    /// 服务端返回 `result: false`
    #[error("Service '{service}' failed: {message}")]
    ServiceFailed { service: String, message: String },
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl BridgeError {
    /// 连接已不可用，继续等待没有意义
    pub fn is_fatal(&self) -> bool {
        matches!(self, BridgeError::Disconnected | BridgeError::Io(_))
    }
}

/// 订阅话题上收到的一条消息（尚未按类型解码）
#[derive(Debug, Clone, PartialEq)]
pub struct Incoming {
    pub topic: String,
    pub msg: Value,
}

#[derive(Deserialize)]
struct ServiceList {
    #[serde(default)]
    services: Vec<String>,
}

/// 消息中间件适配器
///
/// 所有方法只需 `&self`：发布端与接收循环可以共享同一个实例。
pub trait Bridge: Send + Sync {
    /// 声明将要发布的话题
    fn advertise(&self, topic: &str, msg_type: &str) -> Result<(), BridgeError>;

    fn publish(&self, topic: &str, msg: Value) -> Result<(), BridgeError>;

    fn subscribe(&self, topic: &str, msg_type: &str, queue_length: usize)
    -> Result<(), BridgeError>;

    /// 同步调用服务，返回响应的 `values`
    fn call_service(&self, service: &str, args: Value) -> Result<Value, BridgeError>;

    /// 等待下一条订阅消息
    ///
    /// 超时返回 `BridgeError::Timeout`。
    fn receive_timeout(&self, timeout: Duration) -> Result<Incoming, BridgeError>;

    fn try_receive(&self) -> Result<Option<Incoming>, BridgeError> {
        match self.receive_timeout(Duration::ZERO) {
            Ok(incoming) => Ok(Some(incoming)),
            Err(BridgeError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// 服务当前是否可用
    ///
    /// 默认实现查询 `/rosapi/services`。
    fn service_exists(&self, service: &str) -> Result<bool, BridgeError> {
        let values = self.call_service(ROSAPI_SERVICES, json!({}))?;
        let list: ServiceList = serde_json::from_value(values)?;
        Ok(list.services.iter().any(|s| s == service))
    }
}
