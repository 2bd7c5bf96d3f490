//! rosbridge v2 协议帧
//!
//! 每一帧是一个带 `op` 字段的 JSON 对象。TCP 传输下帧与帧直接首尾相接，
//! 没有长度前缀或分隔符，接收端需要流式解析。
//!
//! 本模块只覆盖客户端用到的操作：
//!
//! | op | 方向 | 用途 |
//! |----|------|------|
//! | `advertise` | → | 声明发布话题 |
//! | `publish` | ↔ | 发布 / 收到订阅消息 |
//! | `subscribe` | → | 订阅话题 |
//! | `call_service` | → | 调用服务 |
//! | `service_response` | ← | 服务响应 |
//! | `status` | ← | 服务端状态/错误提示 |

use crate::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// rosbridge 操作帧
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Advertise {
        topic: String,
        #[serde(rename = "type")]
        msg_type: String,
    },
    Publish {
        topic: String,
        msg: Value,
    },
    Subscribe {
        topic: String,
        #[serde(rename = "type")]
        msg_type: String,
        queue_length: usize,
    },
    CallService {
        id: String,
        service: String,
        args: Value,
    },
    ServiceResponse {
        #[serde(default)]
        id: Option<String>,
        service: String,
        #[serde(default)]
        values: Value,
        result: bool,
    },
    Status {
        #[serde(default)]
        level: String,
        #[serde(default)]
        msg: String,
    },
}

/// 编码为 JSON 字节
pub fn encode(op: &Operation) -> Result<Vec<u8>, BridgeError> {
    Ok(serde_json::to_vec(op)?)
}

/// 从完整的 JSON 字节解码
pub fn decode(bytes: &[u8]) -> Result<Operation, BridgeError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// 从已解析的 JSON 值解码（流式接收时使用）
pub fn decode_value(value: Value) -> Result<Operation, BridgeError> {
    let op = value.get("op").and_then(Value::as_str).map(str::to_owned);
    serde_json::from_value(value).map_err(|e| match op {
        Some(op) => BridgeError::Protocol(format!("unsupported or malformed op '{}': {}", op, e)),
        None => BridgeError::Protocol(format!("frame without op: {}", e)),
    })
}

/// 失败的服务响应中，`values` 通常是一段错误描述字符串
pub fn failure_message(values: &Value) -> String {
    match values {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
