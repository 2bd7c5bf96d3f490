//! # ARIAC Messages
//!
//! 比赛仿真环境使用的 ROS 消息/服务定义（无传输依赖）
//!
//! ## 模块
//!
//! - `std_msgs` / `std_srvs`: 基础类型（Header、Duration、Float32、String、Trigger）
//! - `geometry_msgs`: 位姿
//! - `sensor_msgs`: 关节状态、测距、激光
//! - `trajectory_msgs`: 关节轨迹（机械臂命令）
//! - `osrf_gear`: 比赛专用消息（订单、逻辑相机、对射光栅、吸盘、传送带、无人机）
//!
//! ## 序列化
//!
//! 所有类型通过 serde 映射到 rosbridge 使用的 JSON 结构，字段名与 `.msg` 定义一致。
//! 缺失字段按默认值处理（不做 schema 校验）。

pub mod geometry_msgs;
pub mod osrf_gear;
mod render;
pub mod sensor_msgs;
pub mod std_msgs;
pub mod std_srvs;
pub mod trajectory_msgs;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// 重新导出常用类型
pub use geometry_msgs::{Point, Pose, Quaternion};
pub use osrf_gear::{
    ConveyorBeltControl, DroneControl, LogicalCameraImage, Model, Order, Product, Proximity,
    Shipment, VacuumGripperControl, VacuumGripperState,
};
pub use sensor_msgs::{JointState, LaserScan, Range};
pub use std_msgs::{Float32, Header, RosDuration, RosString, Time};
pub use std_srvs::{Trigger, TriggerRequest, TriggerResponse};
pub use trajectory_msgs::{JointTrajectory, JointTrajectoryPoint};

/// 消息层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MsgError {
    /// 关节名与位置数量不一致
    #[error("Joint count mismatch: expected {expected}, got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },

    /// 时长超出 ROS `duration` 的表示范围（秒数为 i32）
    #[error("Invalid duration: {0} s")]
    InvalidDuration(f64),
}

/// ROS 消息类型
///
/// `TYPE_NAME` 为 `package/Message` 形式，订阅/广播时需要告知 bridge。
pub trait RosMessage: Serialize + DeserializeOwned + Clone + Send + 'static {
    const TYPE_NAME: &'static str;
}

/// ROS 服务类型（请求 + 响应）
pub trait RosService {
    const TYPE_NAME: &'static str;
    type Request: Serialize + Send;
    type Response: DeserializeOwned + Send;
}

/// 带 `success` 标志的服务响应
///
/// 一次性服务调用（启动比赛、吸盘、传送带、无人机）统一通过此接口检查结果。
pub trait ServiceAck {
    fn success(&self) -> bool;

    /// 失败原因（部分服务没有 message 字段）
    fn message(&self) -> Option<&str> {
        None
    }
}
