//! std_srvs：`Trigger` 服务（启动比赛）

use crate::{RosService, ServiceAck};
use serde::{Deserialize, Serialize};

/// `std_srvs/Trigger`
pub struct Trigger;

/// 空请求
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
}

impl RosService for Trigger {
    const TYPE_NAME: &'static str = "std_srvs/Trigger";
    type Request = TriggerRequest;
    type Response = TriggerResponse;
}

impl ServiceAck for TriggerResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<&str> {
        Some(&self.message)
    }
}
