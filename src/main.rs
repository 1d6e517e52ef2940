//! API Health Monitor 主程序入口
//!
//! 周期性HTTP端点健康检测工具

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    api_health_monitor::core::app::main().await
}
