//! 通知发送器模块
//!
//! 定义通知发送的trait和消息结构

use crate::error::NotificationError;
use async_trait::async_trait;

/// 告警消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    /// 消息标题
    pub title: String,
    /// 消息正文
    pub body: String,
}

impl AlertMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// 通知发送器trait
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 发送一条告警
    ///
    /// 投递失败只记录日志，不向调用方传播，
    /// 一次通知失败不会中断外层的检测循环。
    async fn notify(&self, title: &str, body: &str);

    /// 测试连接，错误会返回给调用方
    async fn test_connection(&self) -> Result<(), NotificationError>;
}
