//! 告警消息模板模块
//!
//! 使用 Handlebars 渲染告警标题和正文

use crate::config::NotificationConfig;
use crate::error::NotificationError;
use crate::health::CheckResult;
use crate::notification::sender::AlertMessage;
use handlebars::Handlebars;
use serde::Serialize;
use tracing::warn;

/// 默认告警标题模板
pub const DEFAULT_TITLE_TEMPLATE: &str = "[ALERT] {{name}} failed";

/// 默认告警正文模板
pub const DEFAULT_BODY_TEMPLATE: &str = "Endpoint: {{url}}\nError: {{reason}}";

const TITLE: &str = "title";
const BODY: &str = "body";

/// 模板上下文数据
#[derive(Debug, Clone, Serialize)]
pub struct AlertContext {
    /// 端点名称
    pub name: String,
    /// 端点URL
    pub url: String,
    /// HTTP方法
    pub method: String,
    /// 失败原因
    pub reason: String,
    /// HTTP状态码
    pub status_code: Option<u16>,
    /// 检测时间
    pub timestamp: String,
}

impl AlertContext {
    /// 从失败的检测结果构造上下文
    pub fn from_result(result: &CheckResult) -> Self {
        Self {
            name: result.endpoint_name.clone(),
            url: result.endpoint_url.clone(),
            method: result.method.clone(),
            reason: result
                .failure_reason()
                .map(ToString::to_string)
                .unwrap_or_default(),
            status_code: result.status_code,
            timestamp: result.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// 告警模板
pub struct AlertTemplate {
    registry: Handlebars<'static>,
}

impl AlertTemplate {
    /// 创建告警模板，未提供的部分使用默认模板
    pub fn new(title: Option<&str>, body: Option<&str>) -> Result<Self, NotificationError> {
        let mut registry = base_registry();
        registry
            .register_template_string(TITLE, title.unwrap_or(DEFAULT_TITLE_TEMPLATE))
            .map_err(|e| NotificationError::TemplateError(e.to_string()))?;
        registry
            .register_template_string(BODY, body.unwrap_or(DEFAULT_BODY_TEMPLATE))
            .map_err(|e| NotificationError::TemplateError(e.to_string()))?;

        Ok(Self { registry })
    }

    pub fn from_config(config: &NotificationConfig) -> Result<Self, NotificationError> {
        Self::new(
            config.title_template.as_deref(),
            config.body_template.as_deref(),
        )
    }

    /// 渲染告警消息
    ///
    /// 渲染失败时退回默认文本，保证告警仍能发出。
    pub fn render(&self, context: &AlertContext) -> AlertMessage {
        let title = self.registry.render(TITLE, context).unwrap_or_else(|e| {
            warn!("Alert title template failed, using default: {}", e);
            format!("[ALERT] {} failed", context.name)
        });
        let body = self.registry.render(BODY, context).unwrap_or_else(|e| {
            warn!("Alert body template failed, using default: {}", e);
            format!("Endpoint: {}\nError: {}", context.url, context.reason)
        });

        AlertMessage { title, body }
    }
}

impl Default for AlertTemplate {
    /// 内置模板；注册失败时 `render` 退回同样的默认文本
    fn default() -> Self {
        Self::new(None, None).unwrap_or_else(|e| {
            warn!("Default alert templates rejected: {}", e);
            Self {
                registry: base_registry(),
            }
        })
    }
}

/// 消息是纯文本，不做HTML转义
fn base_registry() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);
    registry
}
