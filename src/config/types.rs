//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use handlebars::Template;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// 主配置结构，包含全局配置、通知配置和端点列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 全局配置项
    #[serde(default)]
    pub global: GlobalConfig,
    /// 告警通知配置
    #[serde(default)]
    pub notification: NotificationConfig,
    /// 端点配置列表（按检测顺序）
    pub endpoints: Vec<EndpointConfig>,
}

/// 全局配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 检测间隔（秒）
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// 日志文件路径（追加写入）
    pub log_file: Option<PathBuf>,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: default_check_interval(),
            log_file: None,
            log_level: default_log_level(),
        }
    }
}

impl GlobalConfig {
    /// 检测周期
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }
}

/// Slack webhook 告警配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationConfig {
    /// 是否发送告警
    #[serde(default)]
    pub enabled: bool,
    /// Slack incoming webhook URL
    pub webhook_url: Option<String>,
    /// 消息显示的发送者名称
    #[serde(default = "default_username")]
    pub username: String,
    /// 消息图标
    #[serde(default = "default_icon_emoji")]
    pub icon_emoji: String,
    /// 投递超时（秒）
    #[serde(default = "default_notification_timeout")]
    pub timeout_seconds: u64,
    /// 告警标题模板（Handlebars）
    pub title_template: Option<String>,
    /// 告警正文模板（Handlebars）
    pub body_template: Option<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: None,
            username: default_username(),
            icon_emoji: default_icon_emoji(),
            timeout_seconds: default_notification_timeout(),
            title_template: None,
            body_template: None,
        }
    }
}

/// 单个被检测端点的配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    /// 端点名称
    pub name: String,
    /// 端点URL
    pub url: String,
    /// HTTP方法
    #[serde(default = "default_method")]
    pub method: String,
    /// 请求体（以JSON发送）
    pub payload: Option<serde_json::Value>,
    /// 请求头
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// 期望的状态码
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    /// 响应体中必须包含的文本（区分大小写）
    pub expected_text: Option<String>,
}

impl EndpointConfig {
    /// 创建一个使用默认值的GET端点
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method: default_method(),
            payload: None,
            headers: HashMap::new(),
            timeout_seconds: default_timeout(),
            expected_status: default_expected_status(),
            expected_text: None,
        }
    }

    /// 请求超时
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

// 默认值函数
fn default_check_interval() -> u64 {
    300
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_timeout() -> u64 {
    10
}
fn default_method() -> String {
    "GET".to_string()
}
fn default_expected_status() -> u16 {
    200
}
fn default_username() -> String {
    "API Monitor".to_string()
}
fn default_icon_emoji() -> String {
    ":rotating_light:".to_string()
}
fn default_notification_timeout() -> u64 {
    5
}

const VALID_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH"];

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    if config.global.check_interval_seconds == 0 {
        return Err("检测间隔不能为0".to_string());
    }

    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.global.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.global.log_level, valid_log_levels
        ));
    }

    validate_notification(&config.notification)?;

    if config.endpoints.is_empty() {
        return Err("至少需要配置一个端点".to_string());
    }

    for endpoint in &config.endpoints {
        if endpoint.name.trim().is_empty() {
            return Err("端点名称不能为空".to_string());
        }

        if !is_http_url(&endpoint.url) {
            return Err(format!("端点 {} 的URL格式无效", endpoint.name));
        }

        if !(100..=599).contains(&endpoint.expected_status) {
            return Err(format!(
                "端点 {} 的状态码 {} 无效",
                endpoint.name, endpoint.expected_status
            ));
        }

        // 方法名大小写不敏感，请求时统一转为大写
        if !VALID_METHODS.contains(&endpoint.method.to_uppercase().as_str()) {
            return Err(format!(
                "端点 {} 的HTTP方法 {} 无效，支持的方法: {:?}",
                endpoint.name, endpoint.method, VALID_METHODS
            ));
        }

        if endpoint.timeout_seconds == 0 {
            return Err(format!("端点 {} 的超时时间不能为0", endpoint.name));
        }
    }

    Ok(())
}

fn validate_notification(notification: &NotificationConfig) -> Result<(), String> {
    if notification.timeout_seconds == 0 {
        return Err("通知超时时间不能为0".to_string());
    }

    if notification.enabled {
        match notification.webhook_url.as_deref() {
            Some(url) if is_http_url(url) => {}
            Some(_) => return Err("通知webhook URL格式无效".to_string()),
            None => return Err("启用通知时必须配置webhook_url".to_string()),
        }
    }

    for (label, template) in [
        ("title_template", &notification.title_template),
        ("body_template", &notification.body_template),
    ] {
        if let Some(source) = template {
            Template::compile(source).map_err(|e| format!("通知模板 {} 无效: {}", label, e))?;
        }
    }

    Ok(())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
