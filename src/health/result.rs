//! 健康检测结果数据结构
//!
//! 定义单次检测的结果和一轮检测的汇总

use crate::error::CheckError;
use chrono::{DateTime, Local};
use std::time::Duration;
use uuid::Uuid;

/// 单次检测的结论，失败时携带原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// 检测通过
    Success,
    /// 检测失败
    Failure(CheckError),
}

impl CheckOutcome {
    /// 是否通过
    pub fn is_success(&self) -> bool {
        matches!(self, CheckOutcome::Success)
    }
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckOutcome::Success => write!(f, "OK"),
            CheckOutcome::Failure(reason) => write!(f, "FAILED: {}", reason),
        }
    }
}

/// 单个端点的检测结果，只在一次检测调用内存在
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// 端点名称
    pub endpoint_name: String,
    /// 端点URL
    pub endpoint_url: String,
    /// HTTP方法
    pub method: String,
    /// 检测时间
    pub timestamp: DateTime<Local>,
    /// 检测结论
    pub outcome: CheckOutcome,
    /// HTTP状态码（拿到响应时才有）
    pub status_code: Option<u16>,
    /// 请求耗时（传输失败时为空）
    pub elapsed: Option<Duration>,
}

impl CheckResult {
    /// 创建新的检测结果
    pub fn new(
        endpoint_name: String,
        endpoint_url: String,
        method: String,
        outcome: CheckOutcome,
    ) -> Self {
        Self {
            endpoint_name,
            endpoint_url,
            method,
            timestamp: Local::now(),
            outcome,
            status_code: None,
            elapsed: None,
        }
    }

    /// 设置HTTP状态码
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// 设置请求耗时
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// 失败原因（仅失败时存在）
    pub fn failure_reason(&self) -> Option<&CheckError> {
        match &self.outcome {
            CheckOutcome::Success => None,
            CheckOutcome::Failure(reason) => Some(reason),
        }
    }

    /// 请求耗时（秒），未知时为0
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.map(|d| d.as_secs_f64()).unwrap_or(0.0)
    }
}

/// 一轮检测的汇总
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// 本轮ID，用于日志关联
    pub run_id: Uuid,
    /// 开始时间
    pub started_at: DateTime<Local>,
    /// 检测的端点数量
    pub total: usize,
    /// 通过数量
    pub passed: usize,
    /// 失败的端点名称（按检测顺序）
    pub failed_endpoints: Vec<String>,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            total: 0,
            passed: 0,
            failed_endpoints: Vec::new(),
        }
    }

    /// 记录一个端点的结果
    pub fn record(&mut self, result: &CheckResult) {
        self.total += 1;
        if result.is_success() {
            self.passed += 1;
        } else {
            self.failed_endpoints.push(result.endpoint_name.clone());
        }
    }

    pub fn failed(&self) -> usize {
        self.failed_endpoints.len()
    }

    pub fn all_passed(&self) -> bool {
        self.failed_endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, outcome: CheckOutcome) -> CheckResult {
        CheckResult::new(
            name.to_string(),
            "http://x/health".to_string(),
            "GET".to_string(),
            outcome,
        )
    }

    #[test]
    fn test_failure_reason_present_only_on_failure() {
        let ok = result("API", CheckOutcome::Success).with_elapsed(Duration::from_millis(120));
        assert!(ok.is_success());
        assert!(ok.failure_reason().is_none());
        assert!((ok.elapsed_secs() - 0.12).abs() < 1e-9);

        let failed = result("API", CheckOutcome::Failure(CheckError::TextNotFound));
        assert!(!failed.is_success());
        assert_eq!(failed.failure_reason(), Some(&CheckError::TextNotFound));
        assert!(failed.elapsed.is_none());
        assert_eq!(failed.elapsed_secs(), 0.0);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(CheckOutcome::Success.to_string(), "OK");
        let failure = CheckOutcome::Failure(CheckError::StatusMismatch {
            expected: 200,
            actual: 503,
        });
        assert_eq!(failure.to_string(), "FAILED: expected 200, got 503");
    }

    #[test]
    fn test_run_summary_counts() {
        let mut summary = RunSummary::new(Local::now());
        summary.record(&result("A", CheckOutcome::Success));
        summary.record(&result("B", CheckOutcome::Failure(CheckError::TextNotFound)));
        summary.record(&result(
            "C",
            CheckOutcome::Failure(CheckError::Transport("connection refused".to_string())),
        ));

        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.failed_endpoints, vec!["B", "C"]);
        assert!(!summary.all_passed());
    }
}
