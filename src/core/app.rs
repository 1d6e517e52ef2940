//! 应用程序核心逻辑
//!
//! 包含主函数、命令执行和应用程序上下文

use crate::cli::args::{Args, Commands};
use crate::cli::commands::command_for;
use crate::config::{Config, ConfigLoader, TomlConfigLoader};
use crate::logging::{parse_level, LogConfig, LoggingSystem};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};

/// 应用上下文
///
/// 启动时创建一次，持有配置和日志系统，直到进程退出。
#[derive(Debug)]
pub struct AppContext {
    /// 已验证的配置
    pub config: Config,
    /// 配置文件路径
    pub config_path: PathBuf,
    /// 日志系统
    pub logging: LoggingSystem,
}

impl AppContext {
    /// 加载配置并初始化日志系统
    pub async fn load(args: &Args) -> Result<Self> {
        let config_path = args.get_config_path();

        let loader = TomlConfigLoader::new(true);
        let config = loader
            .load_from_file(&config_path)
            .await
            .with_context(|| format!("加载配置文件失败: {}", config_path.display()))?;

        let log_config = LogConfig {
            level: args
                .log_level
                .map(Into::into)
                .unwrap_or_else(|| parse_level(&config.global.log_level)),
            file_path: config.global.log_file.clone(),
            console: true,
            ..Default::default()
        };
        let logging = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

        info!("Loaded configuration from {}", config_path.display());
        debug!(
            "Log level {}, {} endpoint(s): {:?}",
            logging.config().level,
            config.endpoints.len(),
            config.endpoints
        );

        Ok(Self {
            config,
            config_path,
            logging,
        })
    }
}

/// 应用程序主函数
pub async fn main() -> ExitCode {
    let args = Args::parse();

    // 日志系统依赖配置中的日志文件，配置加载失败时只能输出到stderr
    let ctx = match AppContext::load(&args).await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("启动失败: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("{} v{} started", crate::APP_NAME, crate::VERSION);

    match execute_command(&args.command(), &ctx).await {
        Ok(code) => code,
        Err(e) => {
            error!("Command failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// 执行CLI命令
pub async fn execute_command(command: &Commands, ctx: &AppContext) -> Result<ExitCode> {
    let handler = command_for(command);
    handler.execute(ctx).await.map_err(anyhow::Error::from)
}
