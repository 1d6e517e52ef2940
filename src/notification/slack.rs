//! Slack 通知发送器模块
//!
//! 实现 Slack incoming webhook 告警

use crate::config::NotificationConfig;
use crate::error::{format_request_error, NotificationError, Result};
use crate::notification::sender::{AlertMessage, NotificationSender};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Slack 通知发送器
pub struct SlackSender {
    /// HTTP客户端（带投递超时）
    client: Client,
    /// 是否启用告警
    enabled: bool,
    /// webhook URL
    webhook_url: Option<String>,
    /// 发送者显示名称
    username: String,
    /// 图标
    icon_emoji: String,
}

impl SlackSender {
    /// 根据通知配置创建发送器
    ///
    /// 投递超时保证不可达的通知渠道不会拖住检测周期。
    pub fn new(config: &NotificationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()?;

        Ok(Self {
            client,
            enabled: config.enabled,
            webhook_url: config.webhook_url.clone(),
            username: config.username.clone(),
            icon_emoji: config.icon_emoji.clone(),
        })
    }

    /// 是否启用
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 构建 Slack 消息体
    pub fn build_message_body(&self, message: &AlertMessage) -> Value {
        json!({
            "text": format!("*{}*\n{}", message.title, message.body),
            "username": self.username,
            "icon_emoji": self.icon_emoji,
        })
    }

    /// 投递消息，不检查启用状态
    pub async fn deliver(
        &self,
        message: &AlertMessage,
    ) -> std::result::Result<(), NotificationError> {
        let webhook_url = self
            .webhook_url
            .as_deref()
            .ok_or_else(|| NotificationError::ConfigError("webhook_url is not set".to_string()))?;

        let body = self.build_message_body(message);
        self.send_to_webhook(webhook_url, &body).await
    }

    /// 发送消息到 webhook，任何 2xx 都视为成功
    async fn send_to_webhook(
        &self,
        webhook_url: &str,
        body: &Value,
    ) -> std::result::Result<(), NotificationError> {
        debug!("Posting alert to Slack webhook");

        let response = self
            .client
            .post(webhook_url)
            .json(body)
            .send()
            .await
            .map_err(|e| NotificationError::SendError(format_request_error(&e)))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotificationError::UnexpectedStatus {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl NotificationSender for SlackSender {
    async fn notify(&self, title: &str, body: &str) {
        if !self.enabled {
            warn!("Slack alert skipped (disabled)");
            return;
        }

        match self.deliver(&AlertMessage::new(title, body)).await {
            Ok(()) => info!("Slack alert sent"),
            Err(e) => error!("Failed to send Slack alert: {}", e),
        }
    }

    async fn test_connection(&self) -> std::result::Result<(), NotificationError> {
        if !self.enabled {
            return Err(NotificationError::ConfigError(
                "notifications are disabled".to_string(),
            ));
        }

        let message = AlertMessage::new(
            "Connection test",
            format!("Test message from {} v{}", crate::APP_NAME, crate::VERSION),
        );
        self.deliver(&message).await
    }
}
