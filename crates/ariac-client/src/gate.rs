//! 一次性服务请求
//!
//! 启动比赛、吸盘、传送带、无人机都遵循同一流程：
//!
//! 1. 服务不存在时打印等待提示，阻塞轮询直到服务上线（无超时）
//! 2. 发送一次请求
//! 3. 检查响应的 `success` 字段
//!
//! 失败只记录日志，不重试，也不会让进程退出。

use crate::config::ServiceConfig;
use crate::node::Node;
use ariac_bridge::Bridge;
use ariac_msgs::osrf_gear::{
    ConveyorBeltControlRequest, DroneControlRequest, VacuumGripperControlRequest,
};
use ariac_msgs::{
    ConveyorBeltControl, DroneControl, RosService, ServiceAck, Trigger, TriggerRequest,
    VacuumGripperControl,
};
use std::time::Duration;
use tracing::{error, info, warn};

/// 一次性请求的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceOutcome {
    Succeeded,
    /// 服务返回 `success == false`
    Rejected { message: String },
    /// 等待或调用过程中的传输错误
    CallFailed { error: String },
}

impl ServiceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ServiceOutcome::Succeeded)
    }
}

/// 各阶段的日志文本
#[derive(Debug, Clone, Copy)]
pub struct RequestLabels {
    pub waiting: &'static str,
    pub ready: &'static str,
    pub requesting: &'static str,
    pub succeeded: &'static str,
    /// 失败日志前缀，后接 `: <原因>`
    pub failed: &'static str,
}

pub const START_COMPETITION: RequestLabels = RequestLabels {
    waiting: "Waiting for the competition to be ready...",
    ready: "Competition is now ready.",
    requesting: "Requesting competition start...",
    succeeded: "Competition started!",
    failed: "Failed to start the competition",
};

pub const GRIPPER_CONTROL: RequestLabels = RequestLabels {
    waiting: "Waiting for the gripper control service...",
    ready: "Gripper control service is now ready.",
    requesting: "Requesting gripper control...",
    succeeded: "Gripper control succeeded.",
    failed: "Failed to control the gripper",
};

pub const CONVEYOR_CONTROL: RequestLabels = RequestLabels {
    waiting: "Waiting for the conveyor control service...",
    ready: "Conveyor control service is now ready.",
    requesting: "Requesting conveyor control...",
    succeeded: "Conveyor control succeeded.",
    failed: "Failed to control the conveyor",
};

pub const DRONE_CONTROL: RequestLabels = RequestLabels {
    waiting: "Waiting for the drone control service...",
    ready: "Drone control service is now ready.",
    requesting: "Requesting drone control...",
    succeeded: "Drone control succeeded.",
    failed: "Failed to control the drone",
};

/// 一次性服务请求入口
pub struct ServiceGate<'a, B: Bridge> {
    node: &'a Node<B>,
    services: &'a ServiceConfig,
    poll_interval: Duration,
}

impl<'a, B: Bridge> ServiceGate<'a, B> {
    pub fn new(node: &'a Node<B>, services: &'a ServiceConfig, poll_interval: Duration) -> Self {
        Self {
            node,
            services,
            poll_interval,
        }
    }

    /// 请求开始比赛（`std_srvs/Trigger`）
    pub fn start_competition(&self) -> ServiceOutcome {
        self.request_service::<Trigger>(
            &self.services.start_competition,
            &START_COMPETITION,
            &TriggerRequest {},
        )
    }

    /// 开关真空吸盘
    pub fn control_gripper(&self, enable: bool) -> ServiceOutcome {
        self.request_service::<VacuumGripperControl>(
            &self.services.gripper_control,
            &GRIPPER_CONTROL,
            &VacuumGripperControlRequest { enable },
        )
    }

    /// 设置传送带功率（0–100）
    pub fn control_conveyor(&self, power: f64) -> ServiceOutcome {
        self.request_service::<ConveyorBeltControl>(
            &self.services.conveyor_control,
            &CONVEYOR_CONTROL,
            &ConveyorBeltControlRequest { power },
        )
    }

    /// 通知无人机取走指定货运
    pub fn control_drone(&self, shipment_type: &str) -> ServiceOutcome {
        self.request_service::<DroneControl>(
            &self.services.drone,
            &DRONE_CONTROL,
            &DroneControlRequest {
                shipment_type: shipment_type.to_string(),
            },
        )
    }

    /// 等待 → 调用 → 检查
    pub fn request_service<S>(
        &self,
        service: &str,
        labels: &RequestLabels,
        request: &S::Request,
    ) -> ServiceOutcome
    where
        S: RosService,
        S::Response: ServiceAck,
    {
        let available = match self.node.service_exists(service) {
            Ok(available) => available,
            Err(e) if e.is_fatal() => return call_failed(labels, e),
            Err(e) => {
                warn!(service, "Service lookup failed: {}", e);
                false
            },
        };

        if !available {
            info!("{}", labels.waiting);
            if let Err(e) = self.node.wait_for_service(service, self.poll_interval) {
                return call_failed(labels, e);
            }
            info!("{}", labels.ready);
        }

        info!("{}", labels.requesting);
        match self.node.call::<S>(service, request) {
            Ok(response) if response.success() => {
                info!("{}", labels.succeeded);
                ServiceOutcome::Succeeded
            },
            Ok(response) => {
                let message = response.message().unwrap_or_default().to_string();
                error!("{}: {}", labels.failed, message);
                ServiceOutcome::Rejected { message }
            },
            Err(e) => call_failed(labels, e),
        }
    }
}

fn call_failed(labels: &RequestLabels, e: impl std::fmt::Display) -> ServiceOutcome {
    error!("{}: {}", labels.failed, e);
    ServiceOutcome::CallFailed {
        error: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariac_bridge::LoopbackBridge;
    use serde_json::json;

    const POLL: Duration = Duration::from_millis(5);

    #[test]
    fn test_start_accepted() {
        let (bridge, handle) = LoopbackBridge::new();
        let node = Node::new("gate", bridge);
        let services = ServiceConfig::default();
        handle.advertise_service("/ariac/start_competition", |_| {
            Ok(json!({"success": true, "message": ""}))
        });

        let outcome = ServiceGate::new(&node, &services, POLL).start_competition();
        assert_eq!(outcome, ServiceOutcome::Succeeded);
        assert!(outcome.is_success());
        assert_eq!(handle.call_count("/ariac/start_competition"), 1);
        assert_eq!(handle.call_args("/ariac/start_competition"), vec![json!({})]);
    }

    #[test]
    fn test_start_rejected_not_retried() {
        let (bridge, handle) = LoopbackBridge::new();
        let node = Node::new("gate", bridge);
        let services = ServiceConfig::default();
        handle.advertise_service("/ariac/start_competition", |_| {
            Ok(json!({"success": false, "message": "already started"}))
        });

        let outcome = ServiceGate::new(&node, &services, POLL).start_competition();
        assert_eq!(
            outcome,
            ServiceOutcome::Rejected {
                message: "already started".to_string()
            }
        );
        assert_eq!(handle.call_count("/ariac/start_competition"), 1);
    }

    #[test]
    fn test_transport_failure_reported() {
        let (bridge, handle) = LoopbackBridge::new();
        let node = Node::new("gate", bridge);
        let services = ServiceConfig::default();
        handle.advertise_service("/ariac/start_competition", |_| Err("boom".to_string()));

        let outcome = ServiceGate::new(&node, &services, POLL).start_competition();
        match outcome {
            ServiceOutcome::CallFailed { error } => assert!(error.contains("boom")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_control_requests_carry_arguments() {
        let (bridge, handle) = LoopbackBridge::new();
        let node = Node::new("gate", bridge);
        let services = ServiceConfig::default();
        for service in ["/ariac/gripper/control", "/ariac/conveyor/control", "/ariac/drone"] {
            handle.advertise_service(service, |_| Ok(json!({"success": true})));
        }

        let gate = ServiceGate::new(&node, &services, POLL);
        assert!(gate.control_gripper(true).is_success());
        assert!(gate.control_conveyor(50.0).is_success());
        assert!(gate.control_drone("order_0_shipment_0").is_success());

        assert_eq!(handle.call_args("/ariac/gripper/control"), vec![json!({"enable": true})]);
        assert_eq!(handle.call_args("/ariac/conveyor/control"), vec![json!({"power": 50.0})]);
        assert_eq!(
            handle.call_args("/ariac/drone"),
            vec![json!({"shipment_type": "order_0_shipment_0"})]
        );
    }

    #[test]
    fn test_rejected_without_message_field() {
        let (bridge, handle) = LoopbackBridge::new();
        let node = Node::new("gate", bridge);
        let services = ServiceConfig::default();
        handle.advertise_service("/ariac/gripper/control", |_| Ok(json!({"success": false})));

        let outcome = ServiceGate::new(&node, &services, POLL).control_gripper(false);
        assert_eq!(
            outcome,
            ServiceOutcome::Rejected {
                message: String::new()
            }
        );
    }
}
