//! trajectory_msgs：关节轨迹
//!
//! 机械臂命令话题只接受 `JointTrajectory`，控制器按 `joint_names` 的顺序解释每个轨迹点。

use crate::render::{self, RenderText, display_via_render};
use crate::std_msgs::{Header, RosDuration};
use crate::{MsgError, RosMessage};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};

/// 轨迹点
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointTrajectoryPoint {
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
    pub accelerations: Vec<f64>,
    pub effort: Vec<f64>,
    /// 相对轨迹开始的到达时间
    pub time_from_start: RosDuration,
}

/// `trajectory_msgs/JointTrajectory`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointTrajectory {
    pub header: Header,
    pub joint_names: Vec<String>,
    pub points: Vec<JointTrajectoryPoint>,
}

impl JointTrajectory {
    /// 构造单点轨迹
    ///
    /// # 错误
    ///
    /// - `positions` 数量与 `joint_names` 不一致时返回 `MsgError::JointCountMismatch`
    pub fn single_point<S: AsRef<str>>(
        joint_names: &[S],
        positions: Vec<f64>,
        time_from_start: RosDuration,
    ) -> Result<Self, MsgError> {
        if positions.len() != joint_names.len() {
            return Err(MsgError::JointCountMismatch {
                expected: joint_names.len(),
                actual: positions.len(),
            });
        }

        Ok(Self {
            header: Header::default(),
            joint_names: joint_names.iter().map(|n| n.as_ref().to_string()).collect(),
            points: vec![JointTrajectoryPoint {
                positions,
                time_from_start,
                ..Default::default()
            }],
        })
    }
}

impl RosMessage for JointTrajectory {
    const TYPE_NAME: &'static str = "trajectory_msgs/JointTrajectory";
}

impl RenderText for JointTrajectoryPoint {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        render::scalars(f, indent, "positions", &self.positions)?;
        render::scalars(f, indent, "velocities", &self.velocities)?;
        render::scalars(f, indent, "accelerations", &self.accelerations)?;
        render::scalars(f, indent, "effort", &self.effort)?;
        render::scalar(f, indent, "time_from_start", self.time_from_start)
    }
}

impl RenderText for JointTrajectory {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        render::nested(f, indent, "header", &self.header)?;
        render::scalars(f, indent, "joint_names", &self.joint_names)?;
        render::structs(f, indent, "points", &self.points)
    }
}

display_via_render!(JointTrajectory);

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_single_point() {
        let t = JointTrajectory::single_point(
            &["a", "b"],
            vec![0.0, 1.0],
            RosDuration::try_from(Duration::from_millis(500)).unwrap(),
        )
        .unwrap();
        assert_eq!(t.joint_names, vec!["a", "b"]);
        assert_eq!(t.points.len(), 1);
        assert_eq!(t.points[0].positions, vec![0.0, 1.0]);
        assert_eq!(t.points[0].time_from_start.nsecs, 500_000_000);
    }

    #[test]
    fn test_single_point_count_mismatch() {
        let err = JointTrajectory::single_point(&["a", "b"], vec![0.0], RosDuration::default())
            .unwrap_err();
        assert_eq!(
            err,
            MsgError::JointCountMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_json_shape() {
        let t = JointTrajectory::single_point(
            &["a"],
            vec![0.0],
            RosDuration::try_from(Duration::from_millis(1)).unwrap(),
        )
        .unwrap();
        let value = serde_json::to_value(&t).unwrap();
        assert_eq!(value["joint_names"][0], "a");
        assert_eq!(value["points"][0]["time_from_start"]["secs"], 0);
        assert_eq!(value["points"][0]["time_from_start"]["nsecs"], 1_000_000);
        assert_eq!(value["header"]["frame_id"], "");
    }

    #[test]
    fn test_render() {
        let t = JointTrajectory::single_point(
            &["a"],
            vec![0.0],
            RosDuration::try_from(Duration::from_millis(1)).unwrap(),
        )
        .unwrap();
        let text = t.to_string();
        assert!(text.contains("joint_names[]\n  joint_names[0]: a\n"));
        assert!(text.contains("points[]\n  points[0]: \n    positions[]\n      positions[0]: 0\n"));
        assert!(text.contains("    time_from_start: 0.001000000\n"));
    }
}
