//! std_msgs：基础消息类型

use crate::render::{self, RenderText, display_via_render};
use crate::{MsgError, RosMessage};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};
use std::time::Duration;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// ROS 时间戳（`time`）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Time {
    pub secs: u32,
    pub nsecs: u32,
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nsecs)
    }
}

/// ROS 时长（`duration`）
///
/// 与 roscpp 一致，`nsecs` 始终规范化到 `[0, 1e9)`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosDuration {
    pub secs: i32,
    pub nsecs: i32,
}

impl RosDuration {
    pub fn as_secs_f64(&self) -> f64 {
        self.secs as f64 + self.nsecs as f64 / NANOS_PER_SEC as f64
    }
}

impl TryFrom<Duration> for RosDuration {
    type Error = MsgError;

    /// 秒数超出 `i32` 时返回 `MsgError::InvalidDuration`，不截断
    fn try_from(d: Duration) -> Result<Self, Self::Error> {
        let secs = i32::try_from(d.as_secs())
            .map_err(|_| MsgError::InvalidDuration(d.as_secs_f64()))?;
        Ok(Self {
            secs,
            nsecs: d.subsec_nanos() as i32,
        })
    }
}

impl fmt::Display for RosDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nsecs)
    }
}

/// 标准消息头
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    pub seq: u32,
    pub stamp: Time,
    pub frame_id: String,
}

impl RenderText for Header {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        render::scalar(f, indent, "seq", self.seq)?;
        render::scalar(f, indent, "stamp", self.stamp)?;
        render::scalar(f, indent, "frame_id", &self.frame_id)
    }
}

/// `std_msgs/Float32`（比赛分数）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Float32 {
    pub data: f32,
}

impl RosMessage for Float32 {
    const TYPE_NAME: &'static str = "std_msgs/Float32";
}

/// `std_msgs/String`（比赛状态）
///
/// 命名为 `RosString` 以免遮蔽 `std::string::String`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosString {
    pub data: String,
}

impl RosString {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

impl RosMessage for RosString {
    const TYPE_NAME: &'static str = "std_msgs/String";
}

display_via_render!(Header);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_std() {
        let d = RosDuration::try_from(Duration::from_millis(2500)).unwrap();
        assert_eq!(d, RosDuration { secs: 2, nsecs: 500_000_000 });
        assert!((d.as_secs_f64() - 2.5).abs() < 1e-12);

        let d = RosDuration::try_from(Duration::from_millis(1)).unwrap();
        assert_eq!(d, RosDuration { secs: 0, nsecs: 1_000_000 });
        assert_eq!(d.to_string(), "0.001000000");
    }

    #[test]
    fn test_duration_secs_limit() {
        let max = Duration::new(i32::MAX as u64, 999_999_999);
        let d = RosDuration::try_from(max).unwrap();
        assert_eq!(d.secs, i32::MAX);
        assert_eq!(d.nsecs, 999_999_999);

        // 超出 i32 的秒数不能回绕成负值
        let err = RosDuration::try_from(Duration::from_secs(i32::MAX as u64 + 1)).unwrap_err();
        assert_eq!(err, MsgError::InvalidDuration(2_147_483_648.0));
        assert!(matches!(
            RosDuration::try_from(Duration::from_secs(3_000_000_000)),
            Err(MsgError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_float32_json_shape() {
        let msg: Float32 = serde_json::from_str(r#"{"data": 12.5}"#).unwrap();
        assert_eq!(msg.data, 12.5);

        // 缺失字段取默认值
        let msg: Float32 = serde_json::from_str("{}").unwrap();
        assert_eq!(msg.data, 0.0);
    }

    #[test]
    fn test_header_render() {
        let header = Header {
            seq: 3,
            stamp: Time { secs: 1, nsecs: 5 },
            frame_id: "world".to_string(),
        };
        let text = header.to_string();
        assert_eq!(text, "seq: 3\nstamp: 1.000000005\nframe_id: world\n");
    }
}
