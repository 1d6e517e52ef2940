//! 任务调度器模块
//!
//! 启动后立即执行一轮检测，之后按固定周期执行，直到收到关闭信号

use crate::health::runner::CheckRunner;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// 固定周期调度器
pub struct Scheduler {
    runner: Arc<CheckRunner>,
    period: Duration,
}

impl Scheduler {
    pub fn new(runner: Arc<CheckRunner>, period: Duration) -> Self {
        Self { runner, period }
    }

    /// 运行调度循环，返回完成的轮次数
    ///
    /// 第一次 tick 立即触发。某轮超出周期时，下一轮在其结束后
    /// 顺延一个完整周期，不会补跑错过的轮次。关闭信号到达时
    /// 正在进行的轮次会被放弃。
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> u64 {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Scheduler started: {} endpoint(s) every {}s",
            self.runner.endpoints().len(),
            self.period.as_secs()
        );

        let mut completed_runs = 0u64;
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown_rx.recv() => break,
            }

            tokio::select! {
                summary = self.runner.run_all_checks() => {
                    completed_runs += 1;
                    if !summary.all_passed() {
                        warn!(
                            "{} of {} endpoint(s) failed: {}",
                            summary.failed(),
                            summary.total,
                            summary.failed_endpoints.join(", ")
                        );
                    }
                }
                _ = shutdown_rx.recv() => {
                    warn!("Shutdown requested during a run, abandoning remaining checks");
                    break;
                }
            }
        }

        info!("Scheduler stopped after {} run(s)", completed_runs);
        completed_runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointConfig;
    use crate::error::NotificationError;
    use crate::health::checker::HealthChecker;
    use crate::health::result::{CheckOutcome, CheckResult};
    use crate::notification::{AlertTemplate, NotificationSender};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingChecker {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl HealthChecker for CountingChecker {
        async fn check(&self, endpoint: &EndpointConfig) -> CheckResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            CheckResult::new(
                endpoint.name.clone(),
                endpoint.url.clone(),
                endpoint.method.clone(),
                CheckOutcome::Success,
            )
        }
    }

    struct SilentSender;

    #[async_trait]
    impl NotificationSender for SilentSender {
        async fn notify(&self, _title: &str, _body: &str) {}

        async fn test_connection(&self) -> Result<(), NotificationError> {
            Ok(())
        }
    }

    fn create_scheduler(checker: Arc<CountingChecker>, period: Duration) -> Scheduler {
        let runner = CheckRunner::new(
            vec![EndpointConfig::new("API", "http://x/health")],
            checker,
            Arc::new(SilentSender),
            AlertTemplate::default(),
        );
        Scheduler::new(Arc::new(runner), period)
    }

    #[tokio::test]
    async fn test_first_run_is_immediate() {
        let checker = Arc::new(CountingChecker::default());
        let scheduler = create_scheduler(checker.clone(), Duration::from_secs(3600));

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown_tx.send(()).unwrap();

        let runs = handle.await.unwrap();
        assert_eq!(runs, 1);
        assert_eq!(checker.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_runs_repeat_on_period() {
        let checker = Arc::new(CountingChecker::default());
        let scheduler = create_scheduler(checker.clone(), Duration::from_millis(50));

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(280)).await;
        shutdown_tx.send(()).unwrap();

        let runs = handle.await.unwrap();
        assert!(runs >= 3, "expected at least 3 runs, got {}", runs);
    }

    #[tokio::test]
    async fn test_shutdown_abandons_slow_run() {
        let checker = Arc::new(CountingChecker {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(3600),
        });
        let scheduler = create_scheduler(checker.clone(), Duration::from_secs(3600));

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(()).unwrap();

        let runs = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
        assert_eq!(runs, 0);
        assert_eq!(checker.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_sender_stops_scheduler() {
        let checker = Arc::new(CountingChecker::default());
        let scheduler = create_scheduler(checker, Duration::from_secs(3600));

        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
        drop(shutdown_tx);

        let runs = tokio::time::timeout(Duration::from_secs(5), scheduler.run(shutdown_rx))
            .await
            .expect("scheduler did not stop");
        assert!(runs <= 1);
    }
}
