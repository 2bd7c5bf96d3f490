//! 日志初始化
//!
//! 终端输出始终开启；指定 `--log-dir` 时额外写入按天轮转的日志文件。
//! 设置了 `RUST_LOG` 时完全按它过滤；未设置时本节点、client 与 bridge 三个 crate 默认 info。

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE_PREFIX: &str = "ariac_example_node.log";

const DEFAULT_DIRECTIVES: &str = "ariac_example_node=info,ariac_client=info,ariac_bridge=info";

/// 初始化全局日志
///
/// 返回的 guard 必须存活到进程退出，否则文件日志会丢失尾部。
pub fn init(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(rust_log.as_deref())?;

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

/// `RUST_LOG` 为空或未设置时使用默认指令
fn build_filter(rust_log: Option<&str>) -> Result<EnvFilter> {
    let directives = match rust_log {
        Some(spec) if !spec.trim().is_empty() => spec,
        _ => DEFAULT_DIRECTIVES,
    };
    EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter '{}'", directives))
}
