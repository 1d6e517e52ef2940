//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// API Health Monitor - 周期性HTTP端点健康检测
#[derive(Parser, Debug, Clone)]
#[command(
    name = "api-health-monitor",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "API_MONITOR_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别（覆盖配置文件中的 log_level）
    #[arg(
        short,
        long,
        value_enum,
        help = "日志级别",
        env = "API_MONITOR_LOG_LEVEL"
    )]
    pub log_level: Option<LogLevel>,

    /// 子命令，省略时等同于 run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// 立即检测一轮，之后按固定周期检测，直到进程被终止
    Run {
        /// 检测间隔（秒），覆盖配置文件
        #[arg(
            short,
            long,
            value_name = "SECONDS",
            help = "检测间隔（秒）",
            env = "API_MONITOR_INTERVAL"
        )]
        interval: Option<u64>,
    },

    /// 检测一轮后退出，有端点失败时退出码为1
    Check,

    /// 验证配置文件
    Validate {
        /// 是否显示详细信息
        #[arg(short, long, help = "显示详细信息")]
        verbose: bool,
    },

    /// 向配置的 webhook 发送一条测试消息
    TestNotification {
        /// 测试消息内容
        #[arg(short, long, help = "测试消息内容")]
        message: Option<String>,
    },
}

impl Args {
    /// 获取配置文件路径
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::get_default_config_path)
    }

    /// 实际要执行的命令
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Run { interval: None })
    }
}
