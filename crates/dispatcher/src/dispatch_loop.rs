use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use requester_core::{
    models::{PendingRequest, RequestRecord, TeamId, UnassignedRequest},
    traits::{AssignmentClient, RequestSource, TeamDirectory},
    DispatcherConfig, RequesterError, RetryConfig,
};

use crate::backoff::RetryBackoff;
use crate::metrics::DispatchMetrics;
use crate::statistics::DispatchStatistics;

/// 调度循环的结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// 收到取消信号
    Cancelled,
    /// 缓冲区报告没有待处理请求
    BufferExhausted,
}

/// 调度循环配置
#[derive(Debug, Clone)]
pub struct DispatchLoopConfig {
    /// 没有空闲清洁队时的固定等待
    pub idle_wait: Duration,
    /// 每次完成分配后的节奏间隔
    pub iteration_interval: Duration,
    /// 传输失败的退避策略
    pub retry: RetryConfig,
}

impl Default for DispatchLoopConfig {
    fn default() -> Self {
        Self::from(&DispatcherConfig::default())
    }
}

impl From<&DispatcherConfig> for DispatchLoopConfig {
    fn from(config: &DispatcherConfig) -> Self {
        Self {
            idle_wait: config.idle_wait(),
            iteration_interval: config.iteration_interval(),
            retry: config.retry.clone(),
        }
    }
}

/// 调度任务结束后交回的结果
#[derive(Debug)]
pub struct CompletedDispatch {
    pub outcome: DispatchOutcome,
    pub statistics: DispatchStatistics,
}

enum IterationStep {
    Continue(Duration),
    Finished(DispatchOutcome),
}

/// 取消信号，一旦观察到即保持取消状态
struct CancellationSignal {
    shutdown_rx: broadcast::Receiver<()>,
    cancelled: bool,
}

impl CancellationSignal {
    fn new(shutdown_rx: broadcast::Receiver<()>) -> Self {
        Self {
            shutdown_rx,
            cancelled: false,
        }
    }

    /// 收到消息、通道关闭或消息滞后都视为取消
    fn is_cancelled(&mut self) -> bool {
        if !self.cancelled {
            self.cancelled = !matches!(self.shutdown_rx.try_recv(), Err(TryRecvError::Empty));
        }
        self.cancelled
    }

    /// 可被取消打断的等待，返回等待结束时是否已取消
    async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        if duration.is_zero() {
            return false;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.shutdown_rx.recv() => {
                self.cancelled = true;
            }
        }

        self.cancelled
    }
}

/// 调度循环：查询空闲清洁队 → 取出请求 → 依次尝试分配
#[derive(Clone)]
pub struct DispatchLoop {
    team_directory: Arc<dyn TeamDirectory>,
    request_source: Arc<dyn RequestSource>,
    assignment_client: Arc<dyn AssignmentClient>,
    config: DispatchLoopConfig,
    metrics: DispatchMetrics,
}

impl DispatchLoop {
    pub fn new(
        team_directory: Arc<dyn TeamDirectory>,
        request_source: Arc<dyn RequestSource>,
        assignment_client: Arc<dyn AssignmentClient>,
        config: DispatchLoopConfig,
    ) -> Self {
        Self {
            team_directory,
            request_source,
            assignment_client,
            config,
            metrics: DispatchMetrics::new(),
        }
    }

    /// 在独立任务中运行调度循环，统计数据随任务一起移交，join 后交回
    pub fn spawn(
        &self,
        shutdown_rx: broadcast::Receiver<()>,
        mut statistics: DispatchStatistics,
    ) -> JoinHandle<CompletedDispatch> {
        let dispatch_loop = self.clone();
        tokio::spawn(async move {
            let outcome = dispatch_loop.run(shutdown_rx, &mut statistics).await;
            CompletedDispatch {
                outcome,
                statistics,
            }
        })
    }

    /// 运行调度循环直到取消或缓冲区耗尽
    ///
    /// 传输失败只会触发退避重试，不会使循环出错；两种结束方式都会冻结一次总耗时。
    pub async fn run(
        &self,
        shutdown_rx: broadcast::Receiver<()>,
        statistics: &mut DispatchStatistics,
    ) -> DispatchOutcome {
        info!("启动调度循环");

        let mut signal = CancellationSignal::new(shutdown_rx);
        let mut teams_backoff = RetryBackoff::new(self.config.retry.clone());
        let mut pop_backoff = RetryBackoff::new(self.config.retry.clone());
        let mut iteration: u64 = 0;

        let outcome = loop {
            if signal.is_cancelled() {
                break DispatchOutcome::Cancelled;
            }

            iteration += 1;
            self.metrics.iterations_total.increment(1);

            let step = self
                .iterate(&mut signal, &mut teams_backoff, &mut pop_backoff, statistics)
                .instrument(info_span!("dispatch_iteration", iteration))
                .await;

            match step {
                IterationStep::Continue(wait) => {
                    if signal.sleep(wait).await {
                        break DispatchOutcome::Cancelled;
                    }
                }
                IterationStep::Finished(outcome) => break outcome,
            }
        };

        let elapsed = statistics.finalize();
        match outcome {
            DispatchOutcome::Cancelled => info!(
                "调度循环因取消而停止，共 {} 次迭代，耗时 {:.2}秒",
                iteration,
                elapsed.as_secs_f64()
            ),
            DispatchOutcome::BufferExhausted => info!(
                "缓冲区已空，调度循环结束，共 {} 次迭代，耗时 {:.2}秒",
                iteration,
                elapsed.as_secs_f64()
            ),
        }
        info!(
            "已分配 {} 个请求，未分配 {} 个请求",
            statistics.requests().len(),
            statistics.unassigned().len()
        );

        outcome
    }

    async fn iterate(
        &self,
        signal: &mut CancellationSignal,
        teams_backoff: &mut RetryBackoff,
        pop_backoff: &mut RetryBackoff,
        statistics: &mut DispatchStatistics,
    ) -> IterationStep {
        let teams = match self.team_directory.available_teams().await {
            Ok(teams) => {
                teams_backoff.reset();
                teams
            }
            Err(e) => {
                let delay = teams_backoff.next_delay();
                self.metrics.record_transport_failure("available_teams", &e);
                log_call_failure("获取空闲清洁队失败", &e, delay);
                return IterationStep::Continue(delay);
            }
        };

        // 没有空闲清洁队时不取请求，避免取出无法分配的请求
        if teams.is_empty() {
            debug!("没有空闲的清洁队，等待...");
            self.metrics.idle_waits_total.increment(1);
            return IterationStep::Continue(self.config.idle_wait);
        }

        if signal.is_cancelled() {
            return IterationStep::Finished(DispatchOutcome::Cancelled);
        }

        let request = match self.request_source.pop_top().await {
            Ok(Some(request)) => {
                pop_backoff.reset();
                request
            }
            Ok(None) => {
                info!("缓冲区没有待处理的请求，停止调度循环");
                return IterationStep::Finished(DispatchOutcome::BufferExhausted);
            }
            Err(e) => {
                let delay = pop_backoff.next_delay();
                self.metrics.record_transport_failure("pop_top", &e);
                log_call_failure("从缓冲区取出请求失败", &e, delay);
                return IterationStep::Continue(delay);
            }
        };

        debug!(
            "取出请求 {} (优先级 {})，空闲清洁队: {:?}",
            request.id, request.priority, teams
        );

        self.assign(&request, &teams, statistics).await;

        IterationStep::Continue(self.config.iteration_interval)
    }

    /// 按顺序尝试各个空闲清洁队，第一个接受的即为分配结果
    async fn assign(
        &self,
        request: &PendingRequest,
        teams: &[TeamId],
        statistics: &mut DispatchStatistics,
    ) {
        for &team_id in teams {
            match self
                .assignment_client
                .proceed_cleaning(request, team_id)
                .await
            {
                Ok(confirmed) => {
                    let record = RequestRecord::from_assignment(request, &confirmed);
                    info!(
                        "请求 {} 已分配给清洁队 {}",
                        record.id, record.team_id
                    );
                    statistics.record_assignment(record);
                    self.metrics.assignments_total.increment(1);
                    return;
                }
                Err(e) => {
                    warn!("清洁队 {} 未能接受请求 {}: {}", team_id, request.id, e);
                    self.metrics.record_rejection(team_id);
                }
            }
        }

        warn!(
            "所有空闲清洁队 {:?} 都未能接受请求 {}，标记为未分配",
            teams, request.id
        );
        statistics.record_unassigned(UnassignedRequest::new(request, teams.to_vec()));
        self.metrics.unassigned_total.increment(1);
    }
}

/// 瞬时错误按警告记录，其余错误（如 4xx、响应无法解析）按错误记录；两者都会重试
fn log_call_failure(action: &str, error: &RequesterError, delay: Duration) {
    if error.is_transient() {
        warn!("{}: {}，{}ms 后重试", action, error, delay.as_millis());
    } else {
        error!(
            "{}（非瞬时错误）: {}，{}ms 后重试",
            action,
            error,
            delay.as_millis()
        );
    }
}
