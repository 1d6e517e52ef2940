//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// API Health Monitor 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum MonitorError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 通知相关错误
    #[error("通知错误: {0}")]
    Notification(#[from] NotificationError),

    /// 日志系统错误
    #[error("日志系统错误: {0}")]
    Logging(String),

    /// HTTP客户端构建错误
    #[error("HTTP客户端创建失败: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 单次端点检测的失败原因
///
/// 传输错误与期望不匹配在告警上一视同仁，这里只区分日志文本。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// 请求无法构建（如无效的HTTP方法）
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// 在拿到状态码之前请求失败（连接、超时、响应格式错误）
    #[error("{0}")]
    Transport(String),

    /// 状态码不匹配
    #[error("expected {expected}, got {actual}")]
    StatusMismatch { expected: u16, actual: u16 },

    /// 响应体中缺少期望文本
    #[error("expected text not found in response")]
    TextNotFound,
}

impl CheckError {
    /// 是否为传输层错误（未获得可用响应）
    pub fn is_transport(&self) -> bool {
        matches!(self, CheckError::InvalidRequest(_) | CheckError::Transport(_))
    }
}

impl From<reqwest::Error> for CheckError {
    fn from(error: reqwest::Error) -> Self {
        CheckError::Transport(format_request_error(&error))
    }
}

/// 格式化请求错误信息，超时单独标出，其余保留底层错误链
pub(crate) fn format_request_error(error: &reqwest::Error) -> String {
    use std::error::Error as _;

    let mut message = if error.is_timeout() {
        "request timed out".to_string()
    } else {
        error.to_string()
    };

    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 发送失败（传输层）
    #[error("{0}")]
    SendError(String),

    /// 通知渠道返回非2xx状态码
    #[error("Slack response: {status}")]
    UnexpectedStatus { status: u16 },

    /// 模板渲染错误
    #[error("template render failed: {0}")]
    TemplateError(String),

    /// 配置错误
    #[error("notification misconfigured: {0}")]
    ConfigError(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, MonitorError>;
