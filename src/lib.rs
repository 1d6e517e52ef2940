//! API Health Monitor - 周期性HTTP端点健康检测工具
//!
//! 按固定周期逐个检测配置的HTTP端点：
//! - 校验状态码和响应体中的期望文本
//! - 结果写入控制台和追加日志文件
//! - 失败时通过 Slack webhook 发送告警

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod health;
pub mod logging;
pub mod notification;

// 重新导出主要类型
pub use config::{Config, EndpointConfig, GlobalConfig, NotificationConfig};
pub use error::MonitorError;
pub use health::{CheckOutcome, CheckResult, CheckRunner, HealthChecker, HttpHealthChecker};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
