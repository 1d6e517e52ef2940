//! 启动流程测试
//!
//! 全局日志订阅器每个进程只安装一次，这里单独成一个测试二进制

use api_health_monitor::cli::Args;
use api_health_monitor::core::AppContext;
use clap::Parser;
use tempfile::TempDir;

#[tokio::test]
async fn test_startup_logs_loaded_configuration() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("logs").join("monitor.log");
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[global]
log_file = "{}"

[[endpoints]]
name = "API"
url = "http://127.0.0.1:9/health"
"#,
            log_path.display().to_string().replace('\\', "/")
        ),
    )
    .unwrap();

    let args = Args::try_parse_from([
        "api-health-monitor",
        "--config",
        config_path.to_str().unwrap(),
        "--log-level",
        "info",
        "validate",
    ])
    .unwrap();

    let ctx = AppContext::load(&args).await.unwrap();
    assert_eq!(ctx.config.endpoints.len(), 1);

    let content = std::fs::read_to_string(&log_path).unwrap();
    let expected = format!(" - INFO - Loaded configuration from {}", config_path.display());
    assert!(content.contains(&expected), "log file: {}", content);
}
