//! rosbridge TCP 适配器
//!
//! 通过 rosbridge_server 的 TCP 传输（`rosbridge_tcp`）访问 ROS 话题与服务。
//!
//! # 线程模型
//!
//! - 写端：`Mutex<TcpStream>`，任意线程可发送
//! - 读端：后台线程 `rosbridge-rx` 流式解析 JSON 帧并分发：
//!   - `publish` → 订阅消息收件箱（每个话题按 `queue_length` 限长，满时丢弃最旧的）
//!   - `service_response` → 按 `id` 唤醒等待中的调用方
//!   - `status` → 写入日志
//!
//! 读线程退出（对端关闭或解析失败）后，所有等待中的调用立即返回 `Disconnected`。

use crate::inbox::Inbox;
use crate::protocol::{self, Operation};
use crate::{Bridge, BridgeError, Incoming};
use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::io::{BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, trace, warn};

/// 服务响应（由读线程转交给调用方）
struct ServiceReply {
    values: Value,
    result: bool,
}

type PendingCalls = Arc<Mutex<HashMap<String, Sender<ServiceReply>>>>;

/// rosbridge TCP 适配器
pub struct TcpBridge {
    /// 对端地址
    peer: SocketAddr,

    /// 写端
    writer: Mutex<TcpStream>,

    /// 订阅消息收件箱（与读线程共享）
    inbox: Arc<Inbox>,

    /// 等待响应的服务调用（id → 唤醒通道）
    pending: PendingCalls,

    /// 调用 id 计数器
    next_call_id: AtomicU64,

    /// 读线程是否存活
    connected: Arc<AtomicBool>,

    /// 单次服务调用超时（None 表示无限等待）
    call_timeout: Option<Duration>,

    reader: Option<JoinHandle<()>>,
}

impl TcpBridge {
    /// 连接 rosbridge_server
    ///
    /// # 参数
    /// - `addr`: 如 "127.0.0.1:9090"
    ///
    /// # 返回
    /// - `Ok(Self)`: 连接成功，读线程已启动
    /// - `Err`: 连接或读线程创建失败
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, BridgeError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        let read_half = stream.try_clone()?;

        let inbox = Arc::new(Inbox::default());
        let pending: PendingCalls = Arc::new(Mutex::new(HashMap::new()));
        let connected = Arc::new(AtomicBool::new(true));

        let reader = {
            let inbox = inbox.clone();
            let pending = pending.clone();
            let connected = connected.clone();
            thread::Builder::new()
                .name("rosbridge-rx".to_string())
                .spawn(move || reader_loop(read_half, inbox, pending, connected))?
        };

        debug!("Connected to rosbridge at {}", peer);

        Ok(Self {
            peer,
            writer: Mutex::new(stream),
            inbox,
            pending,
            next_call_id: AtomicU64::new(1),
            connected,
            call_timeout: None,
            reader: Some(reader),
        })
    }

    /// 设置服务调用超时（默认无限等待）
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn send_op(&self, op: &Operation) -> Result<(), BridgeError> {
        if !self.is_connected() {
            return Err(BridgeError::Disconnected);
        }
        let bytes = protocol::encode(op)?;
        let mut writer = self.writer.lock();
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}

impl Bridge for TcpBridge {
    fn advertise(&self, topic: &str, msg_type: &str) -> Result<(), BridgeError> {
        self.send_op(&Operation::Advertise {
            topic: topic.to_string(),
            msg_type: msg_type.to_string(),
        })
    }

    fn publish(&self, topic: &str, msg: Value) -> Result<(), BridgeError> {
        self.send_op(&Operation::Publish {
            topic: topic.to_string(),
            msg,
        })
    }

    fn subscribe(
        &self,
        topic: &str,
        msg_type: &str,
        queue_length: usize,
    ) -> Result<(), BridgeError> {
        // 先登记长度，订阅后的第一条消息就按此限长
        self.inbox.set_queue_length(topic, queue_length);
        self.send_op(&Operation::Subscribe {
            topic: topic.to_string(),
            msg_type: msg_type.to_string(),
            queue_length,
        })
    }

    fn call_service(&self, service: &str, args: Value) -> Result<Value, BridgeError> {
        let id = format!(
            "call_service:{}:{}",
            service,
            self.next_call_id.fetch_add(1, Ordering::Relaxed)
        );

        // 先登记再发送，避免响应先于登记到达
        let (tx, rx) = bounded(1);
        self.pending.lock().insert(id.clone(), tx);

        let sent = self.send_op(&Operation::CallService {
            id: id.clone(),
            service: service.to_string(),
            args,
        });
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(e);
        }

        let reply = match self.call_timeout {
            Some(timeout) => match rx.recv_timeout(timeout) {
                Ok(reply) => reply,
                Err(RecvTimeoutError::Timeout) => {
                    self.pending.lock().remove(&id);
                    return Err(BridgeError::Timeout);
                },
                Err(RecvTimeoutError::Disconnected) => return Err(BridgeError::Disconnected),
            },
            None => rx.recv().map_err(|_| BridgeError::Disconnected)?,
        };

        if reply.result {
            Ok(reply.values)
        } else {
            Err(BridgeError::ServiceFailed {
                service: service.to_string(),
                message: protocol::failure_message(&reply.values),
            })
        }
    }

    fn receive_timeout(&self, timeout: Duration) -> Result<Incoming, BridgeError> {
        self.inbox.pop_timeout(timeout)
    }
}

impl Drop for TcpBridge {
    fn drop(&mut self) {
        // 关闭 socket 使读线程从阻塞读取中返回
        let _ = self.writer.lock().shutdown(Shutdown::Both);
        if let Some(handle) = self.reader.take()
            && handle.join().is_err()
        {
            error!("rosbridge reader thread panicked");
        }
    }
}

/// 读线程主循环
fn reader_loop(
    stream: TcpStream,
    inbox: Arc<Inbox>,
    pending: PendingCalls,
    connected: Arc<AtomicBool>,
) {
    let frames = serde_json::Deserializer::from_reader(BufReader::new(stream)).into_iter::<Value>();

    for frame in frames {
        let value = match frame {
            Ok(value) => value,
            Err(e) if e.is_eof() => {
                debug!("rosbridge connection closed by peer");
                break;
            },
            Err(e) if e.is_io() => {
                debug!("rosbridge connection closed: {}", e);
                break;
            },
            Err(e) => {
                // 流已错位，无法恢复
                error!("rosbridge stream corrupted: {}", e);
                break;
            },
        };

        match protocol::decode_value(value) {
            Ok(Operation::Publish { topic, msg }) => {
                if inbox.push(Incoming { topic, msg }) {
                    trace!("rosbridge reader: subscriber queue full, dropped oldest message");
                }
            },
            Ok(Operation::ServiceResponse {
                id,
                service,
                values,
                result,
            }) => {
                let waiter = id.as_ref().and_then(|id| pending.lock().remove(id));
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(ServiceReply { values, result });
                    },
                    None => warn!(
                        "Unmatched service_response for '{}' (id: {:?})",
                        service, id
                    ),
                }
            },
            Ok(Operation::Status { level, msg }) => match level.as_str() {
                "error" => error!("rosbridge: {}", msg),
                "warning" => warn!("rosbridge: {}", msg),
                _ => debug!("rosbridge [{}]: {}", level, msg),
            },
            Ok(other) => trace!("Ignoring rosbridge op: {:?}", other),
            Err(e) => warn!("Failed to decode rosbridge frame: {}", e),
        }
    }

    connected.store(false, Ordering::Release);
    // 丢弃所有 Sender，等待中的调用方收到 Disconnected
    pending.lock().clear();
    inbox.close();
    trace!("rosbridge reader: loop exited");
}
