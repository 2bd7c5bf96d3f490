//! 节点：在 Bridge 之上提供带类型的订阅、发布与服务调用

use crate::config::TopicConfig;
use crate::error::ClientError;
use crate::notification::{Notification, NotificationKind};
use ariac_bridge::{Bridge, BridgeError};
use ariac_msgs::{RosMessage, RosService};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// 带类型的发布接口
///
/// 观察者只依赖此 trait，测试中可以替换为记录器。
pub trait Publish<M> {
    fn publish(&self, msg: &M) -> Result<(), ClientError>;
}

/// 已广播话题的发布端
pub struct Publisher<M, B: Bridge> {
    bridge: Arc<B>,
    topic: String,
    _msg: PhantomData<fn(M)>,
}

impl<M, B: Bridge> Publisher<M, B> {
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl<M: RosMessage, B: Bridge> Publish<M> for Publisher<M, B> {
    fn publish(&self, msg: &M) -> Result<(), ClientError> {
        let value = serde_json::to_value(msg).map_err(BridgeError::from)?;
        self.bridge.publish(&self.topic, value)?;
        Ok(())
    }
}

/// 比赛节点
///
/// 持有 Bridge 和话题 → 通知类型的映射。订阅在进入分发循环前完成。
pub struct Node<B: Bridge> {
    name: String,
    bridge: Arc<B>,
    subscriptions: HashMap<String, NotificationKind>,
    queue_length: usize,
}

impl<B: Bridge> Node<B> {
    pub fn new(name: impl Into<String>, bridge: B) -> Self {
        Self::from_shared(name, Arc::new(bridge))
    }

    pub fn from_shared(name: impl Into<String>, bridge: Arc<B>) -> Self {
        Self {
            name: name.into(),
            bridge,
            subscriptions: HashMap::new(),
            queue_length: 10,
        }
    }

    /// 设置后续订阅的队列长度
    pub fn with_queue_length(mut self, queue_length: usize) -> Self {
        self.queue_length = queue_length;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bridge(&self) -> &Arc<B> {
        &self.bridge
    }

    pub fn subscribe(&mut self, topic: &str, kind: NotificationKind) -> Result<(), ClientError> {
        self.bridge.subscribe(topic, kind.type_name(), self.queue_length)?;
        self.subscriptions.insert(topic.to_string(), kind);
        debug!(node = %self.name, topic, msg_type = kind.type_name(), "Subscribed");
        Ok(())
    }

    /// 订阅配置中的全部传感器/状态话题
    pub fn subscribe_all(&mut self, topics: &TopicConfig) -> Result<(), ClientError> {
        for (topic, kind) in topics.subscriptions() {
            self.subscribe(topic, kind)?;
        }
        Ok(())
    }

    pub fn subscription(&self, topic: &str) -> Option<NotificationKind> {
        self.subscriptions.get(topic).copied()
    }

    pub fn advertise<M: RosMessage>(&self, topic: &str) -> Result<Publisher<M, B>, ClientError> {
        self.bridge.advertise(topic, M::TYPE_NAME)?;
        debug!(node = %self.name, topic, msg_type = M::TYPE_NAME, "Advertised");
        Ok(Publisher {
            bridge: self.bridge.clone(),
            topic: topic.to_string(),
            _msg: PhantomData,
        })
    }

    pub fn service_exists(&self, service: &str) -> Result<bool, ClientError> {
        Ok(self.bridge.service_exists(service)?)
    }

    /// 阻塞直到服务可用（无超时）
    ///
    /// 查询失败时记录警告并继续轮询；连接断开时返回错误。
    pub fn wait_for_service(&self, service: &str, poll_interval: Duration) -> Result<(), ClientError> {
        loop {
            match self.service_exists(service) {
                Ok(true) => return Ok(()),
                Ok(false) => trace!(service, "Service not available yet"),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(service, "Service lookup failed: {}", e),
            }
            thread::sleep(poll_interval);
        }
    }

    /// 同步调用服务
    pub fn call<S: RosService>(
        &self,
        service: &str,
        request: &S::Request,
    ) -> Result<S::Response, ClientError> {
        let args = serde_json::to_value(request).map_err(BridgeError::from)?;
        let values = self.bridge.call_service(service, args)?;
        serde_json::from_value(values).map_err(|source| ClientError::Decode {
            topic: service.to_string(),
            source,
        })
    }

    /// 等待下一条订阅消息并解码
    ///
    /// 超时返回 `Ok(None)`。
    pub fn receive(&self, timeout: Duration) -> Result<Option<Notification>, ClientError> {
        let incoming = match self.bridge.receive_timeout(timeout) {
            Ok(incoming) => incoming,
            Err(BridgeError::Timeout) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let kind = self
            .subscription(&incoming.topic)
            .ok_or_else(|| ClientError::UnknownTopic(incoming.topic.clone()))?;
        Notification::decode(kind, &incoming.topic, incoming.msg).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariac_bridge::LoopbackBridge;
    use ariac_msgs::{Float32, JointTrajectory, Trigger, TriggerRequest};
    use serde_json::json;

    fn node() -> (Node<LoopbackBridge>, ariac_bridge::LoopbackHandle) {
        let (bridge, handle) = LoopbackBridge::new();
        (Node::new("test_node", bridge), handle)
    }

    #[test]
    fn test_subscribe_all_declares_types() {
        let (mut node, handle) = node();
        let topics = TopicConfig::default();
        node.subscribe_all(&topics).unwrap();

        assert_eq!(
            handle.subscription_type("/ariac/current_score").as_deref(),
            Some("std_msgs/Float32")
        );
        assert_eq!(
            handle.subscription_type("/ariac/proximity_sensor_1").as_deref(),
            Some("sensor_msgs/Range")
        );
        assert_eq!(node.subscription("/ariac/orders"), Some(NotificationKind::Order));
        assert_eq!(node.subscription("/ariac/arm/command"), None);
    }

    #[test]
    fn test_receive_decodes_by_topic() {
        let (mut node, handle) = node();
        node.subscribe("/score", NotificationKind::Score).unwrap();

        assert!(handle.inject("/score", Float32 { data: 3.0 }));
        let notification = node.receive(Duration::from_millis(100)).unwrap();
        assert_eq!(notification, Some(Notification::Score(Float32 { data: 3.0 })));

        assert_eq!(node.receive(Duration::from_millis(10)).unwrap(), None);
    }

    #[test]
    fn test_receive_malformed_message() {
        let (mut node, handle) = node();
        node.subscribe("/score", NotificationKind::Score).unwrap();

        assert!(handle.inject_raw("/score", json!({"data": "ten"})));
        let err = node.receive(Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_publisher_requires_advertise() {
        let (node, handle) = node();
        let publisher = node.advertise::<JointTrajectory>("/arm").unwrap();
        assert_eq!(publisher.topic(), "/arm");
        assert_eq!(
            handle.advertised_type("/arm").as_deref(),
            Some("trajectory_msgs/JointTrajectory")
        );

        publisher.publish(&JointTrajectory::default()).unwrap();
        assert_eq!(handle.published("/arm").len(), 1);
    }

    #[test]
    fn test_typed_call() {
        let (node, handle) = node();
        handle.advertise_service("/trigger", |_| Ok(json!({"success": true, "message": "ok"})));

        assert!(node.service_exists("/trigger").unwrap());
        assert!(!node.service_exists("/other").unwrap());

        let response = node.call::<Trigger>("/trigger", &TriggerRequest {}).unwrap();
        assert!(response.success);
        assert_eq!(response.message, "ok");
        assert_eq!(handle.call_count("/trigger"), 1);
    }

    #[test]
    fn test_wait_for_service_returns_once_available() {
        let (node, handle) = node();
        let late = handle.clone();
        let registrar = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            late.advertise_service("/late", |_| Ok(json!({})));
        });

        node.wait_for_service("/late", Duration::from_millis(5)).unwrap();
        assert!(node.service_exists("/late").unwrap());
        registrar.join().unwrap();
    }
}
