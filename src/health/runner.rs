//! 检测轮次编排
//!
//! 一轮检测按配置顺序逐个检测端点，失败的端点立即发送一条告警

use crate::config::{Config, EndpointConfig};
use crate::error::Result;
use crate::health::checker::{HealthChecker, HttpHealthChecker};
use crate::health::result::RunSummary;
use crate::notification::{AlertContext, AlertTemplate, NotificationSender, SlackSender};
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info};

/// 检测轮次执行器，不持有跨轮次状态
pub struct CheckRunner {
    /// 端点列表（启动时确定，各轮次共用）
    endpoints: Vec<EndpointConfig>,
    checker: Arc<dyn HealthChecker>,
    notifier: Arc<dyn NotificationSender>,
    template: AlertTemplate,
}

impl CheckRunner {
    pub fn new(
        endpoints: Vec<EndpointConfig>,
        checker: Arc<dyn HealthChecker>,
        notifier: Arc<dyn NotificationSender>,
        template: AlertTemplate,
    ) -> Self {
        Self {
            endpoints,
            checker,
            notifier,
            template,
        }
    }

    /// 按配置组装HTTP检测器、Slack发送器和告警模板
    pub fn from_config(config: &Config) -> Result<Self> {
        let checker = HttpHealthChecker::new()?;
        let notifier = SlackSender::new(&config.notification)?;
        let template = AlertTemplate::from_config(&config.notification)?;

        Ok(Self::new(
            config.endpoints.clone(),
            Arc::new(checker),
            Arc::new(notifier),
            template,
        ))
    }

    pub fn endpoints(&self) -> &[EndpointConfig] {
        &self.endpoints
    }

    /// 执行一轮检测
    ///
    /// 端点串行检测，不因某个端点失败而提前结束；
    /// 每个失败端点各自触发一次通知，不合并。
    pub async fn run_all_checks(&self) -> RunSummary {
        let started_at = Local::now();
        let mut summary = RunSummary::new(started_at);

        info!(
            "=== Running API checks @ {} ===",
            started_at.format("%Y-%m-%d %H:%M:%S%.6f")
        );

        for endpoint in &self.endpoints {
            let result = self.checker.check(endpoint).await;
            summary.record(&result);

            if !result.is_success() {
                let message = self.template.render(&AlertContext::from_result(&result));
                self.notifier.notify(&message.title, &message.body).await;
            }
        }

        debug!(
            "Run {} finished: {}/{} passed",
            summary.run_id, summary.passed, summary.total
        );

        summary
    }
}
