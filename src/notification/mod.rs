//! 通知模块
//!
//! 提供 Slack webhook 告警和消息模板功能

pub mod sender;
pub mod slack;
pub mod template;

// 重新导出主要类型
pub use sender::{AlertMessage, NotificationSender};
pub use slack::SlackSender;
pub use template::{AlertContext, AlertTemplate};
