//! 机械臂关节位姿
//!
//! 比赛机械臂由 7 个 iiwa 关节和 1 个线性导轨组成，共 8 个可控关节。
//! 吸盘关节（`vacuum_gripper_joint`）不可控，不出现在命令中。

use crate::error::ClientError;
use ariac_msgs::{JointTrajectory, MsgError, RosDuration};
use std::time::Duration;

/// 可控关节（命令中的顺序）
pub const ARM_JOINT_NAMES: [&str; 8] = [
    "iiwa_joint_1",
    "iiwa_joint_2",
    "iiwa_joint_3",
    "iiwa_joint_4",
    "iiwa_joint_5",
    "iiwa_joint_6",
    "iiwa_joint_7",
    "linear_arm_actuator_joint",
];

pub const ARM_JOINT_COUNT: usize = ARM_JOINT_NAMES.len();

/// 归零命令的到达时间
pub const ZERO_POSE_TRANSIT: Duration = Duration::from_millis(1);

/// 一般位姿命令的默认到达时间
pub const DEFAULT_TRANSIT: Duration = Duration::from_secs(1);

/// 机械臂目标位姿（8 个关节 + 到达时间）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    positions: [f64; ARM_JOINT_COUNT],
    time_from_start: Duration,
}

impl JointPose {
    /// 全零位姿，1ms 到达
    pub const fn zero() -> Self {
        Self {
            positions: [0.0; ARM_JOINT_COUNT],
            time_from_start: ZERO_POSE_TRANSIT,
        }
    }

    /// # 错误
    ///
    /// - `positions` 长度不是 8 时返回 `MsgError::JointCountMismatch`
    /// - `time_from_start` 超出 ROS `duration` 范围时返回 `MsgError::InvalidDuration`
    pub fn new(positions: &[f64], time_from_start: Duration) -> Result<Self, ClientError> {
        let positions: [f64; ARM_JOINT_COUNT] =
            positions.try_into().map_err(|_| MsgError::JointCountMismatch {
                expected: ARM_JOINT_COUNT,
                actual: positions.len(),
            })?;
        RosDuration::try_from(time_from_start)?;
        Ok(Self {
            positions,
            time_from_start,
        })
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn time_from_start(&self) -> Duration {
        self.time_from_start
    }

    /// 按命令顺序遍历 (关节名, 目标位置)
    pub fn joints(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        ARM_JOINT_NAMES.iter().copied().zip(self.positions.iter().copied())
    }

    /// 构造单点轨迹命令
    pub fn to_trajectory(&self) -> Result<JointTrajectory, ClientError> {
        let time_from_start = RosDuration::try_from(self.time_from_start)?;
        let msg =
            JointTrajectory::single_point(&ARM_JOINT_NAMES, self.positions.to_vec(), time_from_start)?;
        Ok(msg)
    }
}
