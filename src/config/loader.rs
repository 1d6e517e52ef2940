//! 配置加载器实现
//!
//! 提供TOML配置文件解析、环境变量替换和错误处理功能

use crate::config::types::{validate_config, Config};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};

/// 配置加载器trait，定义配置加载接口
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<Config>` - 加载的配置或错误
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config>;

    /// 从字符串加载配置
    async fn load_from_string(&self, content: &str) -> Result<Config>;

    /// 验证配置
    fn validate(&self, config: &Config) -> Result<()>;
}

/// TOML配置加载器实现
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用 `${VAR}` 环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的环境变量
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {}", e)))?;

        let mut missing = None;
        let result = env_var_regex.replace_all(content, |captures: &regex::Captures| {
            let var_name = &captures[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(var) => Err(ConfigError::EnvVarError { var }.into()),
            None => Ok(result.into_owned()),
        }
    }

    /// 解析TOML内容
    fn parse_toml(&self, content: &str) -> Result<Config> {
        let processed_content = self.substitute_env_vars(content)?;

        let config: Config = toml::from_str(&processed_content)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {}", e)))?;

        Ok(config)
    }
}

impl Default for TomlConfigLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl ConfigLoader for TomlConfigLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ParseError(format!("读取文件失败: {}", e)))?;

        let config = self.parse_toml(&content)?;
        self.validate(&config)?;

        Ok(config)
    }

    async fn load_from_string(&self, content: &str) -> Result<Config> {
        let config = self.parse_toml(content)?;
        self.validate(&config)?;
        Ok(config)
    }

    fn validate(&self, config: &Config) -> Result<()> {
        validate_config(config).map_err(|e| ConfigError::ValidationError(e).into())
    }
}

/// 获取默认配置文件路径
///
/// 当前目录存在 `config.toml` 时优先使用，否则使用系统配置目录。
pub fn get_default_config_path() -> PathBuf {
    if Path::new("config.toml").exists() {
        return PathBuf::from("config.toml");
    }

    dirs::config_dir()
        .map(|config_dir| config_dir.join(crate::APP_NAME).join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEST_CONFIG_TOML: &str = r#"
[global]
check_interval_seconds = 60
log_file = "api_monitor.log"

[notification]
enabled = false

[[endpoints]]
name = "API"
url = "http://x/health"
expected_status = 200

[[endpoints]]
name = "Login"
url = "https://example.com/login"
method = "POST"
timeout_seconds = 3
expected_status = 201
expected_text = "token"

[endpoints.payload]
username = "probe"

[endpoints.headers]
"Content-Type" = "application/json"
"#;

    const TEST_CONFIG_WITH_ENV_VARS: &str = r#"
[notification]
enabled = true
webhook_url = "${MONITOR_TEST_WEBHOOK_URL}"

[[endpoints]]
name = "API"
url = "https://example.com/health"

[endpoints.headers]
"Authorization" = "Bearer ${MONITOR_TEST_API_TOKEN}"
"#;

    #[tokio::test]
    async fn test_toml_parsing_preserves_endpoint_order() {
        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_string(TEST_CONFIG_TOML).await.unwrap();

        assert_eq!(config.global.check_interval_seconds, 60);
        assert_eq!(
            config.global.log_file,
            Some(PathBuf::from("api_monitor.log"))
        );
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.endpoints[0].name, "API");
        assert_eq!(config.endpoints[1].name, "Login");

        let login = &config.endpoints[1];
        assert_eq!(login.method, "POST");
        assert_eq!(login.timeout_seconds, 3);
        assert_eq!(login.expected_status, 201);
        assert_eq!(login.expected_text.as_deref(), Some("token"));
        assert_eq!(
            login.payload,
            Some(serde_json::json!({"username": "probe"}))
        );
        assert_eq!(
            login.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_substitution() {
        env::set_var("MONITOR_TEST_WEBHOOK_URL", "https://hooks.example.com/abc");
        env::set_var("MONITOR_TEST_API_TOKEN", "test-token-123");

        let loader = TomlConfigLoader::new(true);
        let config = loader
            .load_from_string(TEST_CONFIG_WITH_ENV_VARS)
            .await
            .unwrap();

        assert_eq!(
            config.notification.webhook_url,
            Some("https://hooks.example.com/abc".to_string())
        );
        assert_eq!(
            config.endpoints[0].headers.get("Authorization"),
            Some(&"Bearer test-token-123".to_string())
        );

        env::remove_var("MONITOR_TEST_WEBHOOK_URL");
        env::remove_var("MONITOR_TEST_API_TOKEN");
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_substitution_missing_var() {
        env::remove_var("MONITOR_TEST_MISSING_VAR");
        let config_with_missing_var = r#"
[notification]
webhook_url = "${MONITOR_TEST_MISSING_VAR}"

[[endpoints]]
name = "API"
url = "https://example.com"
"#;

        let loader = TomlConfigLoader::new(true);
        let result = loader.load_from_string(config_with_missing_var).await;

        let error = result.unwrap_err();
        assert!(error.to_string().contains("MONITOR_TEST_MISSING_VAR"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TEST_CONFIG_TOML.as_bytes()).unwrap();

        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_file(file.path()).await.unwrap();
        assert_eq!(config.endpoints.len(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let loader = TomlConfigLoader::default();
        let result = loader.load_from_file("/nonexistent/monitor.toml").await;

        let error = result.unwrap_err();
        assert!(error.to_string().contains("配置文件不存在"));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let loader = TomlConfigLoader::new(false);
        let result = loader.load_from_string("endpoints = []").await;

        let error = result.unwrap_err();
        assert!(error.to_string().contains("至少需要配置一个端点"));
    }

    #[test]
    fn test_substitute_env_vars_disabled() {
        let loader = TomlConfigLoader::new(false);
        let content = "test ${VAR} content";
        let result = loader.substitute_env_vars(content).unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_get_default_config_path() {
        let path = get_default_config_path();
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }
}
