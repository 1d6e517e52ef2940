//! HTTP健康检测器实现
//!
//! 对单个端点发起一次请求并对照期望判定结果，不做重试

use crate::config::EndpointConfig;
use crate::error::{CheckError, Result};
use crate::health::result::{CheckOutcome, CheckResult};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use std::time::Instant;
use tracing::{debug, error, info};

/// 健康检测器trait，定义检测接口
#[async_trait]
pub trait HealthChecker: Send + Sync {
    /// 执行一次健康检测
    ///
    /// 所有失败（传输错误、状态码不符、缺少期望文本）都体现在
    /// 返回结果的 `outcome` 中，本方法本身不会失败。
    async fn check(&self, endpoint: &EndpointConfig) -> CheckResult;
}

/// HTTP健康检测器实现
pub struct HttpHealthChecker {
    /// HTTP客户端
    client: Client,
}

impl HttpHealthChecker {
    /// 创建新的HTTP健康检测器
    ///
    /// 超时按端点配置逐个请求设置，客户端本身不设全局超时。
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()?;

        Ok(Self::with_client(client))
    }

    /// 使用已有客户端创建检测器
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// 构建HTTP请求
    fn build_request(
        &self,
        endpoint: &EndpointConfig,
    ) -> std::result::Result<RequestBuilder, CheckError> {
        let method = Method::from_bytes(endpoint.method.to_uppercase().as_bytes())
            .map_err(|_| {
                CheckError::InvalidRequest(format!("invalid HTTP method: {}", endpoint.method))
            })?;

        let mut request = self
            .client
            .request(method, &endpoint.url)
            .timeout(endpoint.timeout());

        for (key, value) in &endpoint.headers {
            request = request.header(key, value);
        }

        if let Some(payload) = &endpoint.payload {
            request = request.json(payload);
        }

        Ok(request)
    }

    /// 执行单次HTTP请求并判定结果
    async fn perform_request(&self, endpoint: &EndpointConfig) -> CheckResult {
        let request = match self.build_request(endpoint) {
            Ok(request) => request,
            Err(e) => return self.create_failure_result(endpoint, e),
        };

        let start_time = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return self.create_failure_result(endpoint, e.into()),
        };
        let elapsed = start_time.elapsed();

        let status_code = response.status().as_u16();
        let outcome = self.evaluate_response(endpoint, response).await;

        CheckResult::new(
            endpoint.name.clone(),
            endpoint.url.clone(),
            endpoint.method.to_uppercase(),
            outcome,
        )
        .with_status_code(status_code)
        .with_elapsed(elapsed)
    }

    /// 先比较状态码；状态码一致且配置了期望文本时才读取响应体
    async fn evaluate_response(
        &self,
        endpoint: &EndpointConfig,
        response: Response,
    ) -> CheckOutcome {
        let actual = response.status().as_u16();
        if actual != endpoint.expected_status {
            return CheckOutcome::Failure(CheckError::StatusMismatch {
                expected: endpoint.expected_status,
                actual,
            });
        }

        let Some(expected_text) = &endpoint.expected_text else {
            return CheckOutcome::Success;
        };

        match response.text().await {
            Ok(body) => match_expected_text(&body, expected_text),
            Err(e) => CheckOutcome::Failure(e.into()),
        }
    }

    /// 创建未拿到响应时的失败结果
    fn create_failure_result(&self, endpoint: &EndpointConfig, error: CheckError) -> CheckResult {
        CheckResult::new(
            endpoint.name.clone(),
            endpoint.url.clone(),
            endpoint.method.to_uppercase(),
            CheckOutcome::Failure(error),
        )
    }
}

/// 区分大小写的原样包含判断
fn match_expected_text(body: &str, expected_text: &str) -> CheckOutcome {
    if body.contains(expected_text) {
        CheckOutcome::Success
    } else {
        CheckOutcome::Failure(CheckError::TextNotFound)
    }
}

#[async_trait]
impl HealthChecker for HttpHealthChecker {
    async fn check(&self, endpoint: &EndpointConfig) -> CheckResult {
        info!("Checking {} - {}", endpoint.name, endpoint.url);

        let result = self.perform_request(endpoint).await;

        match &result.outcome {
            CheckOutcome::Success => {
                info!("{} OK in {:.2}s", endpoint.name, result.elapsed_secs());
            }
            CheckOutcome::Failure(reason) => {
                error!("{} FAILED: {}", endpoint.name, reason);
                if reason.is_transport() {
                    debug!("{} got no HTTP response from {}", endpoint.name, endpoint.url);
                }
            }
        }

        result
    }
}
