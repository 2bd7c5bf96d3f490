//! geometry_msgs：位姿

use crate::render::{self, RenderText};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    /// 单位四元数
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

impl RenderText for Point {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        render::scalar(f, indent, "x", self.x)?;
        render::scalar(f, indent, "y", self.y)?;
        render::scalar(f, indent, "z", self.z)
    }
}

impl RenderText for Quaternion {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        render::scalar(f, indent, "x", self.x)?;
        render::scalar(f, indent, "y", self.y)?;
        render::scalar(f, indent, "z", self.z)?;
        render::scalar(f, indent, "w", self.w)
    }
}

impl RenderText for Pose {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        render::nested(f, indent, "position", &self.position)?;
        render::nested(f, indent, "orientation", &self.orientation)
    }
}
