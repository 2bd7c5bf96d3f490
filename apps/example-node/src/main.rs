//! # ARIAC Example Node
//!
//! 比赛示例节点：连接 rosbridge，订阅比赛状态与传感器话题，请求开始比赛，
//! 然后持续打印收到的消息。收到第一条关节状态时让机械臂归零。
//!
//! ```bash
//! # 仿真环境中先启动 rosbridge_server（TCP 传输）
//! roslaunch rosbridge_server rosbridge_tcp.launch
//!
//! # 运行节点
//! ariac_example_node --bridge 127.0.0.1:9090
//!
//! # 查看最终生效的配置
//! ariac_example_node --print-config
//! ```
//!
//! 第一次 Ctrl+C 让分发循环退出；第二次立即终止进程（例如仍在等待比赛服务时）。

use anyhow::{Context, Result};
use ariac_bridge::TcpBridge;
use ariac_client::{Competition, CompetitionConfig, Node, ServiceGate, spin};
use ariac_msgs::JointTrajectory;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

mod logging;
mod settings;

/// ARIAC 示例节点
#[derive(Parser, Debug)]
#[command(name = "ariac_example_node")]
#[command(about = "Example ARIAC competitor node over rosbridge", long_about = None)]
#[command(version)]
struct Args {
    /// 配置文件（TOML）
    ///
    /// 默认: <config_dir>/ariac/config.toml（存在时）
    #[arg(long)]
    config: Option<PathBuf>,

    /// rosbridge_server TCP 地址，覆盖配置文件
    ///
    /// 格式: IP:PORT (例如: 127.0.0.1:9090)
    #[arg(long)]
    bridge: Option<String>,

    /// 节点名，覆盖配置文件
    #[arg(long)]
    name: Option<String>,

    /// 打印最终生效的配置后退出
    #[arg(long)]
    print_config: bool,

    /// 日志文件目录（按天轮转）
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// 比赛开始后开关真空吸盘
    #[arg(long, value_enum)]
    gripper: Option<GripperSwitch>,

    /// 比赛开始后设置传送带功率（0-100）
    #[arg(long)]
    conveyor: Option<f64>,

    /// 比赛开始后通知无人机取走该货运
    #[arg(long, value_name = "SHIPMENT_TYPE")]
    drone: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GripperSwitch {
    On,
    Off,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = settings::resolve(&args)?;

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let _log_guard = logging::init(args.log_dir.as_deref())?;

    let running = Arc::new(AtomicBool::new(true));
    install_signal_handler(running.clone())?;

    run(&args, &config, &running)
}

/// Ctrl+C：第一次清除运行标志，第二次直接退出
fn install_signal_handler(running: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        if running.swap(false, Ordering::AcqRel) {
            eprintln!("\nReceived interrupt signal. Shutting down...");
        } else {
            process::exit(130);
        }
    })
    .context("Failed to set signal handler")
}

fn run(args: &Args, config: &CompetitionConfig, running: &AtomicBool) -> Result<()> {
    let mut bridge = TcpBridge::connect(config.bridge.address.as_str())
        .with_context(|| format!("Failed to connect to rosbridge at {}", config.bridge.address))?;
    if let Some(timeout) = config.bridge.call_timeout() {
        bridge = bridge.with_call_timeout(timeout);
    }
    info!(node = %config.node_name, peer = %bridge.peer_addr(), "Connected to rosbridge");

    let mut node = Node::new(config.node_name.as_str(), bridge)
        .with_queue_length(config.dispatch.queue_length);
    node.subscribe_all(&config.topics).context("Failed to subscribe")?;
    let arm = node
        .advertise::<JointTrajectory>(&config.topics.arm_command)
        .context("Failed to advertise arm command topic")?;
    let mut competition = Competition::with_throttle(arm, &config.throttle);

    info!("Setup complete.");

    let gate = ServiceGate::new(&node, &config.services, config.dispatch.service_poll_interval());
    let outcome = gate.start_competition();
    debug!(?outcome, "Start request finished");

    if let Some(switch) = args.gripper {
        gate.control_gripper(switch == GripperSwitch::On);
    }
    if let Some(power) = args.conveyor {
        gate.control_conveyor(power);
    }
    if let Some(shipment_type) = &args.drone {
        gate.control_drone(shipment_type);
    }

    let stats = spin(&node, &mut competition, running, config.dispatch.receive_timeout())?;
    info!(
        received = stats.received,
        skipped = stats.skipped,
        score = competition.current_score(),
        "Node stopped"
    );
    Ok(())
}
