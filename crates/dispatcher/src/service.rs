//! 调度服务
//!
//! 对外提供启动调度、停止调度、查询状态和生成统计报告的入口。
//! 统计数据只在调度任务 join 之后才会被读取。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use requester_core::{
    traits::{AssignmentClient, GeneratorTrigger, RequestSource, TeamDirectory},
    DispatcherConfig, ReportConfig, ReportFormat, RequesterError, RequesterResult,
};

use crate::dispatch_loop::{DispatchLoop, DispatchLoopConfig, DispatchOutcome};
use crate::generator_trigger::spawn_generator_trigger;
use crate::report::{write_report, StatisticsReport};
use crate::statistics::DispatchStatistics;

/// 一次调度运行结束后的摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub run_id: Uuid,
    pub outcome: DispatchOutcome,
    pub elapsed_seconds: f64,
    pub assigned: usize,
    pub unassigned: usize,
}

/// 统计报告生成结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub run_id: Uuid,
    pub path: PathBuf,
    pub format: ReportFormat,
    pub elapsed_seconds: f64,
    pub teams: usize,
    pub requests: usize,
    pub unassigned: usize,
}

/// 调度服务的对外状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DispatchStatus {
    Idle,
    Running {
        run_id: Uuid,
        started_at: DateTime<Utc>,
    },
    Finished {
        run_id: Uuid,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        outcome: DispatchOutcome,
        elapsed_seconds: f64,
        assigned: usize,
        unassigned: usize,
    },
}

#[derive(Debug, Clone)]
struct ActiveRun {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    stop_tx: broadcast::Sender<()>,
}

struct StartedRun {
    run: ActiveRun,
    delay_rx: broadcast::Receiver<()>,
    loop_rx: broadcast::Receiver<()>,
}

#[derive(Debug)]
struct FinishedRun {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    outcome: DispatchOutcome,
    statistics: DispatchStatistics,
}

impl FinishedRun {
    fn summary(&self) -> DispatchSummary {
        DispatchSummary {
            run_id: self.run_id,
            outcome: self.outcome,
            elapsed_seconds: self.statistics.elapsed().as_secs_f64(),
            assigned: self.statistics.requests().len(),
            unassigned: self.statistics.unassigned().len(),
        }
    }
}

#[derive(Debug)]
enum DispatchPhase {
    Idle,
    Running(ActiveRun),
    Finished(FinishedRun),
}

pub struct DispatcherService {
    dispatch_loop: DispatchLoop,
    team_directory: Arc<dyn TeamDirectory>,
    generator: Arc<dyn GeneratorTrigger>,
    startup_delay: Duration,
    report_config: ReportConfig,
    phase: RwLock<DispatchPhase>,
}

impl DispatcherService {
    pub fn new(
        team_directory: Arc<dyn TeamDirectory>,
        request_source: Arc<dyn RequestSource>,
        assignment_client: Arc<dyn AssignmentClient>,
        generator: Arc<dyn GeneratorTrigger>,
        config: &DispatcherConfig,
        report_config: ReportConfig,
    ) -> Self {
        let dispatch_loop = DispatchLoop::new(
            team_directory.clone(),
            request_source,
            assignment_client,
            DispatchLoopConfig::from(config),
        );

        Self {
            dispatch_loop,
            team_directory,
            generator,
            startup_delay: config.startup_delay(),
            report_config,
            phase: RwLock::new(DispatchPhase::Idle),
        }
    }

    pub fn report_config(&self) -> &ReportConfig {
        &self.report_config
    }

    /// 运行一次完整的调度，直到取消或缓冲区耗尽
    pub async fn launch(
        &self,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> RequesterResult<DispatchSummary> {
        let started = self.begin_run().await?;
        self.execute_run(started, shutdown_rx).await
    }

    /// 在后台启动调度，立即返回运行 ID
    pub async fn start(
        self: &Arc<Self>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> RequesterResult<Uuid> {
        let started = self.begin_run().await?;
        let run_id = started.run.run_id;

        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = service.execute_run(started, shutdown_rx).await {
                error!("后台调度运行 {} 失败: {}", run_id, e);
            }
        });

        Ok(run_id)
    }

    /// 通知当前运行停止，返回是否存在正在进行的运行
    pub async fn stop(&self) -> bool {
        let phase = self.phase.read().await;
        match &*phase {
            DispatchPhase::Running(run) => {
                info!("请求停止调度运行 {}", run.run_id);
                let _ = run.stop_tx.send(());
                true
            }
            _ => false,
        }
    }

    pub async fn status(&self) -> DispatchStatus {
        let phase = self.phase.read().await;
        match &*phase {
            DispatchPhase::Idle => DispatchStatus::Idle,
            DispatchPhase::Running(run) => DispatchStatus::Running {
                run_id: run.run_id,
                started_at: run.started_at,
            },
            DispatchPhase::Finished(run) => {
                let summary = run.summary();
                DispatchStatus::Finished {
                    run_id: run.run_id,
                    started_at: run.started_at,
                    finished_at: run.finished_at,
                    outcome: run.outcome,
                    elapsed_seconds: summary.elapsed_seconds,
                    assigned: summary.assigned,
                    unassigned: summary.unassigned,
                }
            }
        }
    }

    pub async fn is_running(&self) -> bool {
        matches!(&*self.phase.read().await, DispatchPhase::Running(_))
    }

    /// 最近一次已完成运行的摘要
    pub async fn last_summary(&self) -> Option<DispatchSummary> {
        match &*self.phase.read().await {
            DispatchPhase::Finished(run) => Some(run.summary()),
            _ => None,
        }
    }

    /// 获取清洁队汇总数据并生成统计报告
    ///
    /// 只能在调度运行结束之后调用；获取清洁队数据失败时不会写入任何文件。
    pub async fn create_statistics_report(&self) -> RequesterResult<ReportSummary> {
        let run_id = self.finished_run_id().await?;

        let teams = self.team_directory.teams_stats().await.map_err(|e| {
            error!("获取清洁队统计数据失败: {}", e);
            e
        })?;

        let report = {
            let mut phase = self.phase.write().await;
            let run = match &mut *phase {
                DispatchPhase::Finished(run) if run.run_id == run_id => run,
                DispatchPhase::Running(_) => return Err(RequesterError::DispatchInProgress),
                _ => return Err(RequesterError::NoCompletedRun),
            };
            run.statistics.set_team_snapshot(teams);
            StatisticsReport::build(&run.statistics)
        };

        let path = self.report_config.output_path.clone();
        let format = self.report_config.format;
        write_report(&report, &path, format).await?;

        Ok(ReportSummary {
            run_id,
            path,
            format,
            elapsed_seconds: report.elapsed_seconds,
            teams: report.teams.len(),
            requests: report.requests.len(),
            unassigned: report.unassigned.len(),
        })
    }

    async fn finished_run_id(&self) -> RequesterResult<Uuid> {
        match &*self.phase.read().await {
            DispatchPhase::Finished(run) => Ok(run.run_id),
            DispatchPhase::Running(_) => Err(RequesterError::DispatchInProgress),
            DispatchPhase::Idle => Err(RequesterError::NoCompletedRun),
        }
    }

    async fn begin_run(&self) -> RequesterResult<StartedRun> {
        let mut phase = self.phase.write().await;
        if let DispatchPhase::Running(run) = &*phase {
            warn!("调度运行 {} 尚未结束，拒绝新的启动请求", run.run_id);
            return Err(RequesterError::DispatchInProgress);
        }

        // 在进入 Running 之前订阅，stop() 发出的信号不会丢失
        let (stop_tx, loop_rx) = broadcast::channel(1);
        let delay_rx = stop_tx.subscribe();
        let run = ActiveRun {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            stop_tx,
        };
        *phase = DispatchPhase::Running(run.clone());

        info!("开始调度运行 {}", run.run_id);
        Ok(StartedRun {
            run,
            delay_rx,
            loop_rx,
        })
    }

    async fn execute_run(
        &self,
        started: StartedRun,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> RequesterResult<DispatchSummary> {
        let StartedRun {
            run,
            mut delay_rx,
            loop_rx,
        } = started;

        // 进程级关闭信号转发到本次运行的停止通道
        let forward_tx = run.stop_tx.clone();
        let forwarder = tokio::spawn(async move {
            let _ = shutdown_rx.recv().await;
            let _ = forward_tx.send(());
        });

        let statistics = DispatchStatistics::new();

        spawn_generator_trigger(self.generator.clone());

        if !self.startup_delay.is_zero() {
            info!(
                "等待 {}ms 让生成器产生请求",
                self.startup_delay.as_millis()
            );
            tokio::select! {
                _ = tokio::time::sleep(self.startup_delay) => {}
                _ = delay_rx.recv() => {
                    info!("启动等待期间收到停止信号");
                }
            }
        }

        let joined = self.dispatch_loop.spawn(loop_rx, statistics).await;
        forwarder.abort();

        let mut phase = self.phase.write().await;
        match joined {
            Ok(completed) => {
                let finished = FinishedRun {
                    run_id: run.run_id,
                    started_at: run.started_at,
                    finished_at: Utc::now(),
                    outcome: completed.outcome,
                    statistics: completed.statistics,
                };
                let summary = finished.summary();
                *phase = DispatchPhase::Finished(finished);

                info!(
                    "调度运行 {} 结束: {:?}，已分配 {}，未分配 {}，耗时 {:.2}秒",
                    summary.run_id,
                    summary.outcome,
                    summary.assigned,
                    summary.unassigned,
                    summary.elapsed_seconds
                );
                Ok(summary)
            }
            Err(e) => {
                *phase = DispatchPhase::Idle;
                error!("调度任务异常退出: {}", e);
                Err(RequesterError::Internal(format!("调度任务异常退出: {e}")))
            }
        }
    }
}
