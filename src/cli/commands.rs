//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::Commands;
use crate::core::app::AppContext;
use crate::error::Result;
use crate::health::{CheckRunner, Scheduler};
use crate::notification::{AlertMessage, NotificationSender, SlackSender};
use async_trait::async_trait;
use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令，返回进程退出码
    async fn execute(&self, ctx: &AppContext) -> Result<ExitCode>;
}

/// 根据子命令创建处理器
pub fn command_for(command: &Commands) -> Box<dyn Command> {
    match command {
        Commands::Run { interval } => Box::new(RunCommand {
            interval: *interval,
        }),
        Commands::Check => Box::new(CheckCommand),
        Commands::Validate { verbose } => Box::new(ValidateCommand { verbose: *verbose }),
        Commands::TestNotification { message } => Box::new(TestNotificationCommand {
            message: message.clone(),
        }),
    }
}

/// 周期检测命令
pub struct RunCommand {
    /// 覆盖配置中的检测间隔（秒）
    pub interval: Option<u64>,
}

#[async_trait]
impl Command for RunCommand {
    async fn execute(&self, ctx: &AppContext) -> Result<ExitCode> {
        let period = self
            .interval
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| ctx.config.global.check_interval());

        let runner = Arc::new(CheckRunner::from_config(&ctx.config)?);
        let scheduler = Scheduler::new(runner, period);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            info!("Shutdown signal received, stopping monitor...");
            let _ = shutdown_tx.send(());
        });

        scheduler.run(shutdown_rx).await;
        Ok(ExitCode::SUCCESS)
    }
}

/// 等待 Ctrl+C，Unix 上同时监听 SIGTERM
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                let terminate = async move {
                    sigterm.recv().await;
                };
                first_shutdown_signal(tokio::signal::ctrl_c(), terminate).await;
                return;
            }
            Err(e) => error!("Failed to listen for SIGTERM: {}", e),
        }
    }

    first_shutdown_signal(tokio::signal::ctrl_c(), std::future::pending()).await;
}

/// 等待任一信号；Ctrl+C 监听失败时只等待 `terminate`
///
/// 两者都不可用时永不返回，监控一直运行到进程被外部终止。
async fn first_shutdown_signal<C, T>(ctrl_c: C, terminate: T)
where
    C: Future<Output = std::io::Result<()>>,
    T: Future<Output = ()>,
{
    tokio::pin!(terminate);

    tokio::select! {
        result = ctrl_c => {
            if let Err(e) = result {
                error!("Failed to listen for Ctrl+C: {}", e);
                terminate.await;
            }
        }
        _ = &mut terminate => {}
    }
}

/// 单轮检测命令
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, ctx: &AppContext) -> Result<ExitCode> {
        let runner = CheckRunner::from_config(&ctx.config)?;
        let summary = runner.run_all_checks().await;

        println!("{}/{} endpoint(s) passed", summary.passed, summary.total);
        for name in &summary.failed_endpoints {
            println!("  ✗ {}", name);
        }

        Ok(if summary.all_passed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

/// 配置验证命令
///
/// 配置在构建上下文时已完成解析和验证，这里只输出摘要。
pub struct ValidateCommand {
    pub verbose: bool,
}

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, ctx: &AppContext) -> Result<ExitCode> {
        let config = &ctx.config;
        println!("✓ 配置文件验证通过: {}", ctx.config_path.display());
        println!("✓ 找到 {} 个端点配置", config.endpoints.len());

        if self.verbose {
            println!("全局配置:");
            println!("  检测间隔: {}秒", config.global.check_interval_seconds);
            println!("  日志级别: {}", config.global.log_level);
            match &config.global.log_file {
                Some(path) => println!("  日志文件: {}", path.display()),
                None => println!("  日志文件: 未配置（仅输出到控制台）"),
            }
            println!(
                "  Slack告警: {}",
                if config.notification.enabled {
                    "启用"
                } else {
                    "禁用"
                }
            );

            println!("端点配置:");
            for (i, endpoint) in config.endpoints.iter().enumerate() {
                println!("  {}. {} ({})", i + 1, endpoint.name, endpoint.url);
                println!("     方法: {}", endpoint.method.to_uppercase());
                println!("     期望状态码: {}", endpoint.expected_status);
                println!("     超时: {}秒", endpoint.timeout_seconds);
                if let Some(text) = &endpoint.expected_text {
                    println!("     期望文本: {:?}", text);
                }
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}

/// 测试通知命令
pub struct TestNotificationCommand {
    /// 自定义测试消息
    pub message: Option<String>,
}

#[async_trait]
impl Command for TestNotificationCommand {
    async fn execute(&self, ctx: &AppContext) -> Result<ExitCode> {
        let sender = SlackSender::new(&ctx.config.notification)?;

        println!("📤 发送测试消息...");
        let result = match &self.message {
            Some(message) if sender.is_enabled() => {
                sender
                    .deliver(&AlertMessage::new("Connection test", message.clone()))
                    .await
            }
            _ => sender.test_connection().await,
        };

        match result {
            Ok(()) => {
                println!("✅ 测试消息发送成功！");
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                println!("❌ 测试消息发送失败: {}", e);
                println!("请检查：");
                println!("  1. notification.enabled 是否为 true");
                println!("  2. webhook URL是否正确");
                println!("  3. 网络连接是否正常");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
