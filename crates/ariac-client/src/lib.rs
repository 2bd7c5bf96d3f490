//! 比赛客户端模块
//!
//! 本模块在 Bridge 层之上实现示例节点的全部行为：
//! - 一次性服务请求（启动比赛、吸盘、传送带、无人机）
//! - 比赛观察者（分数、状态、订单、传感器日志，首条关节状态触发归零）
//! - 单线程分发循环
//!
//! # 使用场景
//!
//! ```no_run
//! use ariac_bridge::TcpBridge;
//! use ariac_client::{Competition, CompetitionConfig, Node, ServiceGate, spin};
//! use ariac_msgs::JointTrajectory;
//! use std::sync::atomic::AtomicBool;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CompetitionConfig::default();
//! let bridge = TcpBridge::connect(config.bridge.address.as_str())?;
//! let mut node = Node::new(config.node_name.as_str(), bridge);
//! node.subscribe_all(&config.topics)?;
//! let arm = node.advertise::<JointTrajectory>(&config.topics.arm_command)?;
//!
//! ServiceGate::new(&node, &config.services, config.dispatch.service_poll_interval())
//!     .start_competition();
//!
//! let mut competition = Competition::with_throttle(arm, &config.throttle);
//! let running = AtomicBool::new(true);
//! spin(&node, &mut competition, &running, config.dispatch.receive_timeout())?;
//! # Ok(())
//! # }
//! ```

pub mod competition;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod latch;
pub mod node;
pub mod notification;
pub mod pose;
pub mod throttle;

// 重新导出常用类型
pub use competition::Competition;
pub use config::{
    BridgeConfig, CompetitionConfig, DispatchConfig, ServiceConfig, ThrottleConfig, TopicConfig,
};
pub use dispatch::{DispatchStats, spin, spin_once};
pub use error::ClientError;
pub use gate::{RequestLabels, ServiceGate, ServiceOutcome};
pub use latch::ZeroedLatch;
pub use node::{Node, Publish, Publisher};
pub use notification::{Notification, NotificationHandler, NotificationKind, Report, Reports};
pub use pose::{JointPose, ARM_JOINT_NAMES};
pub use throttle::Throttle;
