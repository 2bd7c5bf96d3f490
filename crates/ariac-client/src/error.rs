//! 客户端层错误类型定义

use ariac_bridge::BridgeError;
use ariac_msgs::MsgError;
use thiserror::Error;

/// 客户端层错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 中间件错误
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// 订阅消息与声明的类型不符
    #[error("Failed to decode message on '{topic}': {source}")]
    Decode {
        topic: String,
        source: serde_json::Error,
    },

    /// 消息构造错误
    #[error("Message error: {0}")]
    Msg(#[from] MsgError),

    /// 收到未订阅话题的消息
    #[error("Received message on unsubscribed topic '{0}'")]
    UnknownTopic(String),

    /// 配置文件错误
    #[error("Config error: {0}")]
    Config(String),
}

impl ClientError {
    /// 连接已断开，继续运行没有意义
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::Bridge(e) if e.is_fatal())
    }
}
