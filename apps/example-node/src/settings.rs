//! 配置分层：内置默认值 → TOML 文件 → 命令行覆盖

use crate::Args;
use anyhow::{Context, Result};
use ariac_client::CompetitionConfig;
use std::path::PathBuf;

/// 默认配置文件路径（`<config_dir>/ariac/config.toml`）
pub fn default_config_file() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("ariac");
    path.push("config.toml");
    Some(path)
}

/// 计算最终生效的配置
///
/// 显式指定的 `--config` 文件必须存在；默认位置的文件不存在时直接使用内置默认值。
pub fn resolve(args: &Args) -> Result<CompetitionConfig> {
    let mut config = match &args.config {
        Some(path) => CompetitionConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => match default_config_file() {
            Some(path) if path.exists() => CompetitionConfig::load_from_file(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            _ => CompetitionConfig::default(),
        },
    };

    if let Some(address) = &args.bridge {
        config.bridge.address.clone_from(address);
    }
    if let Some(name) = &args.name {
        config.node_name.clone_from(name);
    }

    Ok(config)
}
