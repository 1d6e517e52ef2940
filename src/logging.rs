//! 日志系统模块
//!
//! 每行日志格式为 `<timestamp> - <LEVEL> - <message>`，
//! 同时输出到标准输出和追加写入的日志文件。

use log::LevelFilter;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::{self as fmt_layer, FmtContext};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, registry, EnvFilter};

/// 全局订阅器安装结果，进程内只安装一次
static GLOBAL_LOGGING_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// 日志配置结构
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: LevelFilter,
    /// 日志文件路径（可选，追加写入）
    pub file_path: Option<PathBuf>,
    /// 是否输出到控制台
    pub console: bool,
    /// 模块级别日志控制
    pub module_levels: HashMap<String, LevelFilter>,
}

impl Default for LogConfig {
    fn default() -> Self {
        let mut module_levels = HashMap::new();
        // 依赖库的连接池日志过于嘈杂
        module_levels.insert("hyper_util".to_string(), LevelFilter::Warn);
        module_levels.insert("reqwest".to_string(), LevelFilter::Warn);

        Self {
            level: LevelFilter::Info,
            file_path: None,
            console: true,
            module_levels,
        }
    }
}

/// 行格式化器：`2024-01-01 12:00:00,123 - INFO - message`
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        write!(
            writer,
            "{} - {} - ",
            timestamp,
            level_label(event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// 级别名称，WARN 输出为 WARNING
pub fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// 日志系统管理器
///
/// 由应用上下文持有；全局订阅器在首次 `setup_logging` 时安装。
#[derive(Debug)]
pub struct LoggingSystem {
    config: LogConfig,
}

impl LoggingSystem {
    /// 初始化日志系统
    ///
    /// 重复调用不会重新安装订阅器，只返回新的句柄。
    pub fn setup_logging(config: LogConfig) -> anyhow::Result<Self> {
        let result = GLOBAL_LOGGING_INIT.get_or_init(|| Self::install(&config));

        result
            .as_ref()
            .map_err(|e| anyhow::anyhow!("日志系统初始化失败: {}", e))?;

        Ok(Self { config })
    }

    fn install(config: &LogConfig) -> Result<(), String> {
        let subscriber = Self::build_subscriber(config).map_err(|e| e.to_string())?;

        // log crate 的记录（依赖库、配置加载器）桥接到 tracing
        tracing_log::LogTracer::init().map_err(|e| format!("LogTracer初始化失败: {}", e))?;
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| format!("tracing subscriber初始化失败: {}", e))?;

        tracing::debug!("Logging configured: {:?}", config);
        Ok(())
    }

    /// 构建订阅器但不安装
    ///
    /// 控制台层写标准输出，文件层通过 `Mutex<File>` 追加写入。
    pub fn build_subscriber(
        config: &LogConfig,
    ) -> anyhow::Result<impl Subscriber + Send + Sync + 'static> {
        let env_filter = Self::build_filter(config);

        let console_layer = config.console.then(|| {
            fmt_layer::layer()
                .event_format(LineFormat)
                .with_writer(std::io::stdout)
        });

        let file_layer = match &config.file_path {
            Some(path) => {
                let file = open_log_file(path)?;
                Some(
                    fmt_layer::layer()
                        .event_format(LineFormat)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
            }
            None => None,
        };

        Ok(registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer))
    }

    fn build_filter(config: &LogConfig) -> EnvFilter {
        let mut env_filter =
            EnvFilter::from_default_env().add_directive(level_directive(config.level));

        for (module, level) in &config.module_levels {
            match format!("{}={}", module, level_to_string(*level)).parse() {
                Ok(directive) => env_filter = env_filter.add_directive(directive),
                Err(e) => eprintln!("忽略无效的日志过滤指令 {}: {}", module, e),
            }
        }

        env_filter
    }

    /// 当前日志配置
    pub fn config(&self) -> &LogConfig {
        &self.config
    }
}

/// 以追加模式打开日志文件，必要时创建父目录
fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("创建日志目录失败 {}: {}", parent.display(), e))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow::anyhow!("打开日志文件失败 {}: {}", path.display(), e))
}

/// 将 log::LevelFilter 转换为 tracing 的指令
fn level_directive(level: LevelFilter) -> tracing_subscriber::filter::Directive {
    use tracing_subscriber::filter::{Directive, LevelFilter as TracingLevel};
    match level {
        LevelFilter::Off => Directive::from(TracingLevel::OFF),
        LevelFilter::Error => Directive::from(Level::ERROR),
        LevelFilter::Warn => Directive::from(Level::WARN),
        LevelFilter::Info => Directive::from(Level::INFO),
        LevelFilter::Debug => Directive::from(Level::DEBUG),
        LevelFilter::Trace => Directive::from(Level::TRACE),
    }
}

fn level_to_string(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

/// 将配置文件中的级别字符串转换为 LevelFilter
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}
