//! 健康检测模块
//!
//! 提供HTTP健康检测、检测轮次编排和周期调度功能

pub mod checker;
pub mod result;
pub mod runner;
pub mod scheduler;

// 重新导出主要类型
pub use checker::{HealthChecker, HttpHealthChecker};
pub use result::{CheckOutcome, CheckResult, RunSummary};
pub use runner::CheckRunner;
pub use scheduler::Scheduler;
