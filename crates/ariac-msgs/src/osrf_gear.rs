//! osrf_gear：比赛专用消息与服务

use crate::geometry_msgs::Pose;
use crate::render::{self, RenderText, display_via_render};
use crate::{RosMessage, RosService, ServiceAck};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};

/// 订单中的单个零件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    #[serde(rename = "type")]
    pub product_type: String,
    pub pose: Pose,
}

/// 一批货物（由无人机取走）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shipment {
    pub shipment_type: String,
    pub products: Vec<Product>,
}

/// `osrf_gear/Order`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub order_id: String,
    pub shipments: Vec<Shipment>,
}

impl RosMessage for Order {
    const TYPE_NAME: &'static str = "osrf_gear/Order";
}

/// 逻辑相机识别出的模型
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    #[serde(rename = "type")]
    pub model_type: String,
    pub pose: Pose,
}

/// `osrf_gear/LogicalCameraImage`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalCameraImage {
    pub models: Vec<Model>,
    /// 相机自身位姿
    pub pose: Pose,
}

impl RosMessage for LogicalCameraImage {
    const TYPE_NAME: &'static str = "osrf_gear/LogicalCameraImage";
}

/// `osrf_gear/Proximity`（对射光栅状态变化）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Proximity {
    pub object_detected: bool,
}

impl RosMessage for Proximity {
    const TYPE_NAME: &'static str = "osrf_gear/Proximity";
}

/// `osrf_gear/VacuumGripperState`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VacuumGripperState {
    pub enabled: bool,
    pub attached: bool,
}

impl RosMessage for VacuumGripperState {
    const TYPE_NAME: &'static str = "osrf_gear/VacuumGripperState";
}

/// 只带 `success` 的通用服务响应
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessResponse {
    pub success: bool,
}

impl ServiceAck for SuccessResponse {
    fn success(&self) -> bool {
        self.success
    }
}

/// `osrf_gear/VacuumGripperControl`
pub struct VacuumGripperControl;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacuumGripperControlRequest {
    pub enable: bool,
}

impl RosService for VacuumGripperControl {
    const TYPE_NAME: &'static str = "osrf_gear/VacuumGripperControl";
    type Request = VacuumGripperControlRequest;
    type Response = SuccessResponse;
}

/// `osrf_gear/ConveyorBeltControl`
pub struct ConveyorBeltControl;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConveyorBeltControlRequest {
    /// 功率百分比（0 或 50–100）
    pub power: f64,
}

impl RosService for ConveyorBeltControl {
    const TYPE_NAME: &'static str = "osrf_gear/ConveyorBeltControl";
    type Request = ConveyorBeltControlRequest;
    type Response = SuccessResponse;
}

/// `osrf_gear/DroneControl`
pub struct DroneControl;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroneControlRequest {
    pub shipment_type: String,
}

impl RosService for DroneControl {
    const TYPE_NAME: &'static str = "osrf_gear/DroneControl";
    type Request = DroneControlRequest;
    type Response = SuccessResponse;
}

impl RenderText for Product {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        render::scalar(f, indent, "type", &self.product_type)?;
        render::nested(f, indent, "pose", &self.pose)
    }
}

impl RenderText for Shipment {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        render::scalar(f, indent, "shipment_type", &self.shipment_type)?;
        render::structs(f, indent, "products", &self.products)
    }
}

impl RenderText for Order {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        render::scalar(f, indent, "order_id", &self.order_id)?;
        render::structs(f, indent, "shipments", &self.shipments)
    }
}

impl RenderText for VacuumGripperState {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        render::scalar(f, indent, "enabled", self.enabled)?;
        render::scalar(f, indent, "attached", self.attached)
    }
}

display_via_render!(Order, VacuumGripperState);
