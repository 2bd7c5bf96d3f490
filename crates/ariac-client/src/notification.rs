//! 订阅通知
//!
//! 每个订阅话题对应一个 `NotificationKind`，收到的 JSON 按类型解码为 `Notification`，
//! 再由 `NotificationHandler::dispatch` 分发到对应的处理函数。

use crate::error::ClientError;
use ariac_msgs::{
    Float32, JointState, LaserScan, LogicalCameraImage, Order, Proximity, Range, RosMessage,
    RosString, VacuumGripperState,
};
use serde_json::Value;
use smallvec::SmallVec;
use std::time::Instant;

/// 通知类型（决定订阅时声明的消息类型和解码目标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Score,
    CompetitionState,
    Order,
    JointState,
    /// 测距传感器（`sensor_msgs/Range`）
    Proximity,
    /// 对射光栅（`osrf_gear/Proximity`）
    BreakBeam,
    LogicalCamera,
    LaserScan,
    GripperState,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 9] = [
        NotificationKind::Score,
        NotificationKind::CompetitionState,
        NotificationKind::Order,
        NotificationKind::JointState,
        NotificationKind::Proximity,
        NotificationKind::BreakBeam,
        NotificationKind::LogicalCamera,
        NotificationKind::LaserScan,
        NotificationKind::GripperState,
    ];

    /// ROS 消息类型名
    pub fn type_name(self) -> &'static str {
        match self {
            NotificationKind::Score => Float32::TYPE_NAME,
            NotificationKind::CompetitionState => RosString::TYPE_NAME,
            NotificationKind::Order => Order::TYPE_NAME,
            NotificationKind::JointState => JointState::TYPE_NAME,
            NotificationKind::Proximity => Range::TYPE_NAME,
            NotificationKind::BreakBeam => Proximity::TYPE_NAME,
            NotificationKind::LogicalCamera => LogicalCameraImage::TYPE_NAME,
            NotificationKind::LaserScan => LaserScan::TYPE_NAME,
            NotificationKind::GripperState => VacuumGripperState::TYPE_NAME,
        }
    }
}

/// 已解码的订阅消息
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Score(Float32),
    CompetitionState(RosString),
    Order(Order),
    JointState(JointState),
    Proximity(Range),
    BreakBeam(Proximity),
    LogicalCamera(LogicalCameraImage),
    LaserScan(LaserScan),
    GripperState(VacuumGripperState),
}

impl Notification {
    /// 按 `kind` 解码 rosbridge 推送的消息体
    pub fn decode(kind: NotificationKind, topic: &str, msg: Value) -> Result<Self, ClientError> {
        fn parse<M: RosMessage>(topic: &str, msg: Value) -> Result<M, ClientError> {
            serde_json::from_value(msg).map_err(|source| ClientError::Decode {
                topic: topic.to_string(),
                source,
            })
        }

        Ok(match kind {
            NotificationKind::Score => Notification::Score(parse(topic, msg)?),
            NotificationKind::CompetitionState => {
                Notification::CompetitionState(parse(topic, msg)?)
            },
            NotificationKind::Order => Notification::Order(parse(topic, msg)?),
            NotificationKind::JointState => Notification::JointState(parse(topic, msg)?),
            NotificationKind::Proximity => Notification::Proximity(parse(topic, msg)?),
            NotificationKind::BreakBeam => Notification::BreakBeam(parse(topic, msg)?),
            NotificationKind::LogicalCamera => Notification::LogicalCamera(parse(topic, msg)?),
            NotificationKind::LaserScan => Notification::LaserScan(parse(topic, msg)?),
            NotificationKind::GripperState => Notification::GripperState(parse(topic, msg)?),
        })
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Score(_) => NotificationKind::Score,
            Notification::CompetitionState(_) => NotificationKind::CompetitionState,
            Notification::Order(_) => NotificationKind::Order,
            Notification::JointState(_) => NotificationKind::JointState,
            Notification::Proximity(_) => NotificationKind::Proximity,
            Notification::BreakBeam(_) => NotificationKind::BreakBeam,
            Notification::LogicalCamera(_) => NotificationKind::LogicalCamera,
            Notification::LaserScan(_) => NotificationKind::LaserScan,
            Notification::GripperState(_) => NotificationKind::GripperState,
        }
    }
}

/// 处理一条通知后产生的可观测结果（每条日志/动作一项）
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    ScoreChanged(f32),
    /// debug 级别的状态变化记录
    CompetitionStateChanged(String),
    CompetitionEnded,
    OrderReceived { order_id: String },
    JointStatesLogged,
    ZeroPoseSent,
    ZeroPoseFailed,
    LogicalCameraObjects(usize),
    BreakBeamTriggered,
    ProximityDetected,
    /// 有效读数个数
    LaserProfilerDetected(usize),
    GripperStateLogged,
}

/// 单条通知的结果列表，绝大多数情况下不超过 2 项
pub type Reports = SmallVec<[Report; 2]>;

/// 按通知类型分派的处理接口
///
/// 未覆盖的方法默认忽略消息。`now` 由调用方传入，供限频使用。
pub trait NotificationHandler {
    fn on_score(&mut self, _msg: &Float32, _now: Instant) -> Reports {
        Reports::new()
    }

    fn on_competition_state(&mut self, _msg: &RosString, _now: Instant) -> Reports {
        Reports::new()
    }

    fn on_order(&mut self, _msg: &Order, _now: Instant) -> Reports {
        Reports::new()
    }

    fn on_joint_state(&mut self, _msg: &JointState, _now: Instant) -> Reports {
        Reports::new()
    }

    fn on_proximity(&mut self, _msg: &Range, _now: Instant) -> Reports {
        Reports::new()
    }

    fn on_break_beam(&mut self, _msg: &Proximity, _now: Instant) -> Reports {
        Reports::new()
    }

    fn on_logical_camera(&mut self, _msg: &LogicalCameraImage, _now: Instant) -> Reports {
        Reports::new()
    }

    fn on_laser_scan(&mut self, _msg: &LaserScan, _now: Instant) -> Reports {
        Reports::new()
    }

    fn on_gripper_state(&mut self, _msg: &VacuumGripperState, _now: Instant) -> Reports {
        Reports::new()
    }

    fn dispatch(&mut self, notification: &Notification, now: Instant) -> Reports {
        match notification {
            Notification::Score(msg) => self.on_score(msg, now),
            Notification::CompetitionState(msg) => self.on_competition_state(msg, now),
            Notification::Order(msg) => self.on_order(msg, now),
            Notification::JointState(msg) => self.on_joint_state(msg, now),
            Notification::Proximity(msg) => self.on_proximity(msg, now),
            Notification::BreakBeam(msg) => self.on_break_beam(msg, now),
            Notification::LogicalCamera(msg) => self.on_logical_camera(msg, now),
            Notification::LaserScan(msg) => self.on_laser_scan(msg, now),
            Notification::GripperState(msg) => self.on_gripper_state(msg, now),
        }
    }
}
