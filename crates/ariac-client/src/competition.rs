//! 比赛观察者
//!
//! 订阅消息的处理逻辑都在这里：记录分数/状态/订单，限频打印传感器读数，
//! 并在收到第一条关节状态时让机械臂归零（每个进程只发送一次）。
//!
//! 所有状态由一个 `Competition` 持有，只在分发循环中修改。

use crate::config::ThrottleConfig;
use crate::error::ClientError;
use crate::latch::ZeroedLatch;
use crate::node::Publish;
use crate::notification::{NotificationHandler, Report, Reports};
use crate::pose::JointPose;
use crate::throttle::Throttle;
use ariac_msgs::{
    Float32, JointState, JointTrajectory, LaserScan, LogicalCameraImage, Order, Proximity, Range,
    RosString, VacuumGripperState,
};
use smallvec::smallvec;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// 比赛结束时的状态值
pub const STATE_DONE: &str = "done";

/// 测距读数比最大量程小超过该值时视为检测到物体
pub const PROXIMITY_THRESHOLD: f32 = 0.01;

/// 比赛观察者
///
/// `P` 为机械臂命令的发布端。
pub struct Competition<P> {
    arm: P,
    score: f32,
    state: String,
    orders: Vec<Order>,
    zeroed: ZeroedLatch,
    joint_state: Option<JointState>,
    gripper_state: Option<VacuumGripperState>,
    joint_states_log: Throttle,
    logical_camera_log: Throttle,
    proximity_log: Throttle,
    laser_profiler_log: Throttle,
    gripper_state_log: Throttle,
}

impl<P: Publish<JointTrajectory>> Competition<P> {
    /// 使用默认限频间隔
    pub fn new(arm: P) -> Self {
        Self::with_throttle(arm, &ThrottleConfig::default())
    }

    pub fn with_throttle(arm: P, throttle: &ThrottleConfig) -> Self {
        Self {
            arm,
            score: 0.0,
            state: String::new(),
            orders: Vec::new(),
            zeroed: ZeroedLatch::default(),
            joint_state: None,
            gripper_state: None,
            joint_states_log: Throttle::new(throttle.joint_states()),
            logical_camera_log: Throttle::new(throttle.logical_camera()),
            proximity_log: Throttle::new(throttle.proximity()),
            laser_profiler_log: Throttle::new(throttle.laser_profiler()),
            gripper_state_log: Throttle::new(throttle.gripper_state()),
        }
    }

    pub fn current_score(&self) -> f32 {
        self.score
    }

    /// 最近一次收到的比赛状态（尚未收到时为空串）
    pub fn competition_state(&self) -> &str {
        &self.state
    }

    pub fn received_orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_arm_zeroed(&self) -> bool {
        self.zeroed.is_zeroed()
    }

    pub fn current_joint_state(&self) -> Option<&JointState> {
        self.joint_state.as_ref()
    }

    pub fn current_gripper_state(&self) -> Option<&VacuumGripperState> {
        self.gripper_state.as_ref()
    }

    pub fn arm(&self) -> &P {
        &self.arm
    }

    /// 发送任意 8 关节位姿
    ///
    /// # 错误
    ///
    /// 关节数量不为 8、到达时间超出 ROS `duration` 范围或发布失败时返回错误。
    pub fn send_arm_to_state(
        &self,
        positions: &[f64],
        time_from_start: Duration,
    ) -> Result<(), ClientError> {
        let pose = JointPose::new(positions, time_from_start)?;
        self.send_pose(&pose)
    }

    fn send_pose(&self, pose: &JointPose) -> Result<(), ClientError> {
        let msg = pose.to_trajectory()?;
        info!("Sending command:\n{}", msg);
        self.arm.publish(&msg)
    }
}

impl<P: Publish<JointTrajectory>> NotificationHandler for Competition<P> {
    fn on_score(&mut self, msg: &Float32, _now: Instant) -> Reports {
        let mut reports = Reports::new();
        if msg.data != self.score {
            info!("Score: {}", msg.data);
            reports.push(Report::ScoreChanged(msg.data));
        }
        self.score = msg.data;
        reports
    }

    fn on_competition_state(&mut self, msg: &RosString, _now: Instant) -> Reports {
        let mut reports = Reports::new();
        if msg.data == self.state {
            return reports;
        }

        debug!("Competition state: {}", msg.data);
        reports.push(Report::CompetitionStateChanged(msg.data.clone()));
        if msg.data == STATE_DONE {
            info!("Competition ended.");
            reports.push(Report::CompetitionEnded);
        }
        self.state.clone_from(&msg.data);
        reports
    }

    fn on_order(&mut self, msg: &Order, _now: Instant) -> Reports {
        info!("Received order:\n{}", msg);
        self.orders.push(msg.clone());
        smallvec![Report::OrderReceived {
            order_id: msg.order_id.clone()
        }]
    }

    fn on_joint_state(&mut self, msg: &JointState, now: Instant) -> Reports {
        let mut reports = Reports::new();
        if self.joint_states_log.ready(now) {
            info!("Joint States (throttled to 0.1 Hz):\n{}", msg);
            reports.push(Report::JointStatesLogged);
        }
        self.joint_state = Some(msg.clone());

        if self.zeroed.trip() {
            info!("Sending arm to zero joint positions...");
            match self.send_pose(&JointPose::zero()) {
                Ok(()) => reports.push(Report::ZeroPoseSent),
                Err(e) => {
                    error!("Failed to send zero pose: {}", e);
                    reports.push(Report::ZeroPoseFailed);
                },
            }
        }
        reports
    }

    fn on_proximity(&mut self, msg: &Range, now: Instant) -> Reports {
        if msg.max_range - msg.range > PROXIMITY_THRESHOLD && self.proximity_log.ready(now) {
            info!("Proximity sensor sees something.");
            return smallvec![Report::ProximityDetected];
        }
        Reports::new()
    }

    fn on_break_beam(&mut self, msg: &Proximity, _now: Instant) -> Reports {
        if msg.object_detected {
            info!("Break beam triggered.");
            return smallvec![Report::BreakBeamTriggered];
        }
        Reports::new()
    }

    fn on_logical_camera(&mut self, msg: &LogicalCameraImage, now: Instant) -> Reports {
        if self.logical_camera_log.ready(now) {
            info!("Logical camera: '{}' objects.", msg.models.len());
            return smallvec![Report::LogicalCameraObjects(msg.models.len())];
        }
        Reports::new()
    }

    fn on_laser_scan(&mut self, msg: &LaserScan, now: Instant) -> Reports {
        let hits = msg.finite_range_count();
        if hits > 0 && self.laser_profiler_log.ready(now) {
            info!("Laser profiler sees something.");
            return smallvec![Report::LaserProfilerDetected(hits)];
        }
        Reports::new()
    }

    fn on_gripper_state(&mut self, msg: &VacuumGripperState, now: Instant) -> Reports {
        let mut reports = Reports::new();
        if self.gripper_state_log.ready(now) {
            info!("Gripper state (throttled to 0.1 Hz):\n{}", msg);
            reports.push(Report::GripperStateLogged);
        }
        self.gripper_state = Some(*msg);
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{ARM_JOINT_NAMES, DEFAULT_TRANSIT};
    use ariac_bridge::BridgeError;
    use ariac_msgs::MsgError;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingArm {
        sent: RefCell<Vec<JointTrajectory>>,
        fail: bool,
    }

    impl Publish<JointTrajectory> for RecordingArm {
        fn publish(&self, msg: &JointTrajectory) -> Result<(), ClientError> {
            if self.fail {
                return Err(BridgeError::Disconnected.into());
            }
            self.sent.borrow_mut().push(msg.clone());
            Ok(())
        }
    }

    fn competition() -> Competition<RecordingArm> {
        Competition::new(RecordingArm::default())
    }

    fn state(data: &str) -> RosString {
        RosString::new(data)
    }

    #[test]
    fn test_score_reported_on_change_only() {
        let mut c = competition();
        let now = Instant::now();

        assert!(c.on_score(&Float32 { data: 0.0 }, now).is_empty());
        assert_eq!(
            c.on_score(&Float32 { data: 5.0 }, now).as_slice(),
            &[Report::ScoreChanged(5.0)]
        );
        assert!(c.on_score(&Float32 { data: 5.0 }, now).is_empty());
        assert_eq!(c.current_score(), 5.0);
    }

    #[test]
    fn test_competition_ended_once() {
        let mut c = competition();
        let now = Instant::now();
        let mut ended = 0;
        for s in ["init", "go", "go", "done", "done"] {
            ended += c
                .on_competition_state(&state(s), now)
                .iter()
                .filter(|r| **r == Report::CompetitionEnded)
                .count();
        }
        assert_eq!(ended, 1);
        assert_eq!(c.competition_state(), "done");
    }

    #[test]
    fn test_state_change_recorded() {
        let mut c = competition();
        let now = Instant::now();
        assert_eq!(
            c.on_competition_state(&state("go"), now).as_slice(),
            &[Report::CompetitionStateChanged("go".to_string())]
        );
        assert!(c.on_competition_state(&state("go"), now).is_empty());
    }

    #[test]
    fn test_orders_accumulate() {
        let mut c = competition();
        let now = Instant::now();
        for id in ["order_0", "order_1"] {
            let order = Order {
                order_id: id.to_string(),
                ..Default::default()
            };
            assert_eq!(
                c.on_order(&order, now).as_slice(),
                &[Report::OrderReceived {
                    order_id: id.to_string()
                }]
            );
        }
        let ids: Vec<_> = c.received_orders().iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, ["order_0", "order_1"]);
    }

    #[test]
    fn test_zero_pose_sent_once() {
        let mut c = competition();
        let t0 = Instant::now();
        let msg = JointState::default();

        let first = c.on_joint_state(&msg, t0);
        assert_eq!(first.as_slice(), &[Report::JointStatesLogged, Report::ZeroPoseSent]);
        assert!(c.is_arm_zeroed());

        for i in 1..50 {
            let reports = c.on_joint_state(&msg, t0 + Duration::from_millis(i * 100));
            assert!(!reports.contains(&Report::ZeroPoseSent));
        }

        let sent = c.arm().sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], JointPose::zero().to_trajectory().unwrap());
        assert_eq!(sent[0].joint_names, ARM_JOINT_NAMES);
    }

    #[test]
    fn test_joint_states_throttled() {
        let mut c = competition();
        let t0 = Instant::now();
        let msg = JointState::default();

        let logged = (0..100)
            .map(|i| c.on_joint_state(&msg, t0 + Duration::from_millis(i * 100)))
            .filter(|r| r.contains(&Report::JointStatesLogged))
            .count();
        // 0..9.9 s 内只有第一次
        assert_eq!(logged, 1);
        assert!(
            c.on_joint_state(&msg, t0 + Duration::from_secs(10))
                .contains(&Report::JointStatesLogged)
        );
        assert!(c.current_joint_state().is_some());
    }

    #[test]
    fn test_zero_pose_publish_failure_keeps_latch() {
        let mut c = Competition::new(RecordingArm {
            fail: true,
            ..Default::default()
        });
        let now = Instant::now();
        let reports = c.on_joint_state(&JointState::default(), now);
        assert!(reports.contains(&Report::ZeroPoseFailed));
        assert!(c.is_arm_zeroed());

        let reports = c.on_joint_state(&JointState::default(), now);
        assert!(!reports.contains(&Report::ZeroPoseFailed));
    }

    #[test]
    fn test_proximity_threshold() {
        let mut c = competition();
        let t0 = Instant::now();
        let far = Range {
            max_range: 1.5,
            range: 1.5 - 0.005,
            ..Default::default()
        };
        let near = Range {
            max_range: 1.5,
            range: 1.5 - 0.02,
            ..Default::default()
        };

        assert!(c.on_proximity(&far, t0).is_empty());
        assert_eq!(c.on_proximity(&near, t0).as_slice(), &[Report::ProximityDetected]);
        // 1 s 限频
        assert!(c.on_proximity(&near, t0 + Duration::from_millis(500)).is_empty());
        assert!(!c.on_proximity(&near, t0 + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_proximity_nan_range_ignored() {
        let mut c = competition();
        let msg = Range {
            max_range: 1.5,
            range: f32::NAN,
            ..Default::default()
        };
        assert!(c.on_proximity(&msg, Instant::now()).is_empty());
    }

    #[test]
    fn test_break_beam() {
        let mut c = competition();
        let now = Instant::now();
        assert!(
            c.on_break_beam(
                &Proximity {
                    object_detected: false
                },
                now
            )
            .is_empty()
        );
        assert_eq!(
            c.on_break_beam(
                &Proximity {
                    object_detected: true
                },
                now
            )
            .as_slice(),
            &[Report::BreakBeamTriggered]
        );
    }

    #[test]
    fn test_laser_scan_finite_ranges() {
        let mut c = competition();
        let t0 = Instant::now();
        let empty = LaserScan {
            ranges: vec![f32::INFINITY, f32::NAN, f32::NEG_INFINITY],
            ..Default::default()
        };
        let hit = LaserScan {
            ranges: vec![f32::NAN, 0.4, 0.5],
            ..Default::default()
        };
        assert!(c.on_laser_scan(&empty, t0).is_empty());
        assert_eq!(c.on_laser_scan(&hit, t0).as_slice(), &[Report::LaserProfilerDetected(2)]);
        assert!(c.on_laser_scan(&hit, t0 + Duration::from_millis(999)).is_empty());
    }

    #[test]
    fn test_logical_camera_and_gripper_throttled() {
        let mut c = competition();
        let t0 = Instant::now();
        let image = LogicalCameraImage {
            models: vec![Default::default(), Default::default()],
            ..Default::default()
        };
        assert_eq!(
            c.on_logical_camera(&image, t0).as_slice(),
            &[Report::LogicalCameraObjects(2)]
        );
        assert!(c.on_logical_camera(&image, t0 + Duration::from_secs(5)).is_empty());

        let gripper = VacuumGripperState {
            enabled: true,
            attached: false,
        };
        assert_eq!(c.on_gripper_state(&gripper, t0).as_slice(), &[Report::GripperStateLogged]);
        assert!(c.on_gripper_state(&gripper, t0 + Duration::from_secs(1)).is_empty());
        assert_eq!(c.current_gripper_state(), Some(&gripper));
    }

    #[test]
    fn test_send_arm_to_state() {
        let c = competition();
        c.send_arm_to_state(&[0.5; 8], DEFAULT_TRANSIT).unwrap();
        let sent = c.arm().sent.borrow();
        assert_eq!(sent[0].points[0].positions, vec![0.5; 8]);
        assert_eq!(sent[0].points[0].time_from_start.secs, 1);
        drop(sent);

        let err = c.send_arm_to_state(&[0.5; 3], DEFAULT_TRANSIT).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Msg(MsgError::JointCountMismatch { .. })
        ));
        assert_eq!(c.arm().sent.borrow().len(), 1);

        // 秒数超出 i32 时拒绝，而不是回绕成负时长发出去
        let err = c.send_arm_to_state(&[0.0; 8], Duration::from_secs(3_000_000_000)).unwrap_err();
        assert!(matches!(err, ClientError::Msg(MsgError::InvalidDuration(_))));
        assert_eq!(c.arm().sent.borrow().len(), 1);
    }
}
