//! sensor_msgs：关节状态、测距、激光扫描

use crate::RosMessage;
use crate::render::{self, RenderText, display_via_render};
use crate::std_msgs::Header;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Formatter};

/// `sensor_msgs/JointState`
///
/// 订阅方只关心"是否到达"，内容仅用于日志。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointState {
    pub header: Header,
    pub name: Vec<String>,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub effort: Vec<f64>,
}

impl RosMessage for JointState {
    const TYPE_NAME: &'static str = "sensor_msgs/JointState";
}

impl RenderText for JointState {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        render::nested(f, indent, "header", &self.header)?;
        render::scalars(f, indent, "name", &self.name)?;
        render::scalars(f, indent, "position", &self.position)?;
        render::scalars(f, indent, "velocity", &self.velocity)?;
        render::scalars(f, indent, "effort", &self.effort)
    }
}

/// `sensor_msgs/Range`（接近传感器）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Range {
    pub header: Header,
    pub radiation_type: u8,
    pub field_of_view: f32,
    pub min_range: f32,
    pub max_range: f32,
    #[serde(deserialize_with = "nullable_float")]
    pub range: f32,
}

impl RosMessage for Range {
    const TYPE_NAME: &'static str = "sensor_msgs/Range";
}

/// `sensor_msgs/LaserScan`（激光轮廓仪）
///
/// rosbridge 将 NaN/Inf 编码为 JSON `null`，解码时还原为 NaN。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserScan {
    pub header: Header,
    pub angle_min: f32,
    pub angle_max: f32,
    pub angle_increment: f32,
    pub time_increment: f32,
    pub scan_time: f32,
    pub range_min: f32,
    pub range_max: f32,
    #[serde(deserialize_with = "nullable_floats")]
    pub ranges: Vec<f32>,
    #[serde(deserialize_with = "nullable_floats")]
    pub intensities: Vec<f32>,
}

impl LaserScan {
    /// 有限值读数的数量
    pub fn finite_range_count(&self) -> usize {
        self.ranges.iter().filter(|r| r.is_finite()).count()
    }
}

impl RosMessage for LaserScan {
    const TYPE_NAME: &'static str = "sensor_msgs/LaserScan";
}

fn nullable_float<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or(f32::NAN))
}

fn nullable_floats<'de, D>(deserializer: D) -> Result<Vec<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Option<f32>>::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect())
}

display_via_render!(JointState);
