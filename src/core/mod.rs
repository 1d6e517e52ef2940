//! 核心模块
//!
//! 包含应用程序的启动流程和上下文

pub mod app;

// 重新导出主要类型
pub use app::{execute_command, AppContext};
