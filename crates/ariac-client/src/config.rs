//! 节点配置
//!
//! 默认值即比赛环境的标准话题/服务名称。配置文件为 TOML，所有字段可省略：
//!
//! ```toml
//! node_name = "ariac_example_node"
//!
//! [bridge]
//! address = "127.0.0.1:9090"
//!
//! [topics]
//! proximity_sensor = "/ariac/proximity_sensor_2"
//!
//! [throttle]
//! joint_states_secs = 5.0
//! ```

use crate::error::ClientError;
use crate::notification::NotificationKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 节点完整配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitionConfig {
    /// 节点名（仅用于日志标识）
    pub node_name: String,
    pub bridge: BridgeConfig,
    pub topics: TopicConfig,
    pub services: ServiceConfig,
    pub throttle: ThrottleConfig,
    pub dispatch: DispatchConfig,
}

impl Default for CompetitionConfig {
    fn default() -> Self {
        Self {
            node_name: "ariac_example_node".to_string(),
            bridge: BridgeConfig::default(),
            topics: TopicConfig::default(),
            services: ServiceConfig::default(),
            throttle: ThrottleConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl CompetitionConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ClientError> {
        toml::from_str(content).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// 从文件加载配置
    ///
    /// 文件中缺失的字段使用默认值。
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ClientError> {
        toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))
    }
}

/// rosbridge 连接配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// rosbridge_server TCP 地址
    pub address: String,

    /// 单次服务调用超时（秒），省略表示无限等待
    pub call_timeout_secs: Option<f64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:9090".to_string(),
            call_timeout_secs: None,
        }
    }
}

impl BridgeConfig {
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.and_then(|s| Duration::try_from_secs_f64(s).ok())
    }
}

/// 话题名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub current_score: String,
    pub competition_state: String,
    pub orders: String,
    pub joint_states: String,
    pub proximity_sensor: String,
    pub break_beam: String,
    pub logical_camera: String,
    pub laser_profiler: String,
    pub gripper_state: String,
    /// 机械臂命令（发布）
    pub arm_command: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            current_score: "/ariac/current_score".to_string(),
            competition_state: "/ariac/competition_state".to_string(),
            orders: "/ariac/orders".to_string(),
            joint_states: "/ariac/joint_states".to_string(),
            proximity_sensor: "/ariac/proximity_sensor_1".to_string(),
            break_beam: "/ariac/break_beam_1_change".to_string(),
            logical_camera: "/ariac/logical_camera_1".to_string(),
            laser_profiler: "/ariac/laser_profiler_1".to_string(),
            gripper_state: "/ariac/gripper/state".to_string(),
            arm_command: "/ariac/arm/command".to_string(),
        }
    }
}

impl TopicConfig {
    /// 所有订阅（话题名 → 通知类型）
    pub fn subscriptions(&self) -> [(&str, NotificationKind); 9] {
        [
            (self.current_score.as_str(), NotificationKind::Score),
            (self.competition_state.as_str(), NotificationKind::CompetitionState),
            (self.orders.as_str(), NotificationKind::Order),
            (self.joint_states.as_str(), NotificationKind::JointState),
            (self.proximity_sensor.as_str(), NotificationKind::Proximity),
            (self.break_beam.as_str(), NotificationKind::BreakBeam),
            (self.logical_camera.as_str(), NotificationKind::LogicalCamera),
            (self.laser_profiler.as_str(), NotificationKind::LaserScan),
            (self.gripper_state.as_str(), NotificationKind::GripperState),
        ]
    }
}

/// 服务名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub start_competition: String,
    pub gripper_control: String,
    pub conveyor_control: String,
    pub drone: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            start_competition: "/ariac/start_competition".to_string(),
            gripper_control: "/ariac/gripper/control".to_string(),
            conveyor_control: "/ariac/conveyor/control".to_string(),
            drone: "/ariac/drone".to_string(),
        }
    }
}

/// 限频日志间隔（秒）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub joint_states_secs: f64,
    pub logical_camera_secs: f64,
    pub proximity_secs: f64,
    pub laser_profiler_secs: f64,
    pub gripper_state_secs: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            joint_states_secs: 10.0,
            logical_camera_secs: 10.0,
            proximity_secs: 1.0,
            laser_profiler_secs: 1.0,
            gripper_state_secs: 10.0,
        }
    }
}

impl ThrottleConfig {
    pub fn joint_states(&self) -> Duration {
        secs(self.joint_states_secs)
    }

    pub fn logical_camera(&self) -> Duration {
        secs(self.logical_camera_secs)
    }

    pub fn proximity(&self) -> Duration {
        secs(self.proximity_secs)
    }

    pub fn laser_profiler(&self) -> Duration {
        secs(self.laser_profiler_secs)
    }

    pub fn gripper_state(&self) -> Duration {
        secs(self.gripper_state_secs)
    }
}

/// 分发循环参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// 订阅队列长度
    pub queue_length: usize,
    /// 单次接收超时（毫秒），决定响应退出信号的延迟
    pub receive_timeout_ms: u64,
    /// 等待服务上线时的轮询间隔（毫秒）
    pub service_poll_interval_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_length: 10,
            receive_timeout_ms: 100,
            service_poll_interval_ms: 500,
        }
    }
}

impl DispatchConfig {
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    pub fn service_poll_interval(&self) -> Duration {
        Duration::from_millis(self.service_poll_interval_ms)
    }
}

/// 非法值（负数、NaN）按 0 处理
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CompetitionConfig::default();
        assert_eq!(config.node_name, "ariac_example_node");
        assert_eq!(config.bridge.address, "127.0.0.1:9090");
        assert_eq!(config.bridge.call_timeout(), None);
        assert_eq!(config.topics.arm_command, "/ariac/arm/command");
        assert_eq!(config.services.start_competition, "/ariac/start_competition");
        assert_eq!(config.throttle.joint_states(), Duration::from_secs(10));
        assert_eq!(config.throttle.proximity(), Duration::from_secs(1));
        assert_eq!(config.dispatch.receive_timeout(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_toml() {
        let config = CompetitionConfig::from_toml_str(
            r#"
            node_name = "team_node"

            [bridge]
            address = "10.0.0.2:9090"
            call_timeout_secs = 2.5

            [topics]
            proximity_sensor = "/ariac/proximity_sensor_2"

            [throttle]
            joint_states_secs = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.node_name, "team_node");
        assert_eq!(config.bridge.address, "10.0.0.2:9090");
        assert_eq!(config.bridge.call_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.topics.proximity_sensor, "/ariac/proximity_sensor_2");
        // 未写出的字段保持默认
        assert_eq!(config.topics.orders, "/ariac/orders");
        assert_eq!(config.throttle.joint_states(), Duration::from_millis(500));
        assert_eq!(config.throttle.logical_camera(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_toml() {
        let err = CompetitionConfig::from_toml_str("node_name = 3").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip_through_file() {
        let mut config = CompetitionConfig::default();
        config.topics.break_beam = "/ariac/break_beam_2_change".to_string();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes()).unwrap();

        let loaded = CompetitionConfig::load_from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CompetitionConfig::load_from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_negative_interval_clamped() {
        let throttle = ThrottleConfig {
            proximity_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(throttle.proximity(), Duration::ZERO);
    }

    #[test]
    fn test_subscriptions_cover_all_kinds() {
        let topics = TopicConfig::default();
        let subs = topics.subscriptions();
        assert_eq!(subs.len(), NotificationKind::ALL.len());
        for kind in NotificationKind::ALL {
            assert!(subs.iter().any(|(_, k)| *k == kind), "missing {:?}", kind);
        }
        assert!(!subs.iter().any(|(t, _)| *t == topics.arm_command));
    }
}
