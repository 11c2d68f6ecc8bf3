use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use requester_core::models::{RequestRecord, TeamRecord, UnassignedRequest};

/// 一次调度运行的统计数据
///
/// 只由调度循环所在的任务写入，该任务 join 之后才被读取。
#[derive(Debug, Clone)]
pub struct DispatchStatistics {
    started_at: Instant,
    elapsed: Option<Duration>,
    requests: Vec<RequestRecord>,
    teams: Vec<TeamRecord>,
    unassigned: Vec<UnassignedRequest>,
}

impl DispatchStatistics {
    /// 创建统计对象并开始计时
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            elapsed: None,
            requests: Vec::new(),
            teams: Vec::new(),
            unassigned: Vec::new(),
        }
    }

    pub fn record_assignment(&mut self, record: RequestRecord) {
        self.requests.push(record);
    }

    pub fn record_unassigned(&mut self, request: UnassignedRequest) {
        self.unassigned.push(request);
    }

    /// 用清洁服务的汇总视图替换清洁队快照
    pub fn set_team_snapshot(&mut self, teams: Vec<TeamRecord>) {
        self.teams = teams;
    }

    /// 冻结总耗时，只有第一次调用生效
    pub fn finalize(&mut self) -> Duration {
        match self.elapsed {
            Some(elapsed) => {
                warn!("调度耗时已经确定，忽略重复的结束请求");
                elapsed
            }
            None => {
                let elapsed = self.started_at.elapsed();
                self.elapsed = Some(elapsed);
                elapsed
            }
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.elapsed.is_some()
    }

    /// 调度总耗时，结束前为零
    pub fn elapsed(&self) -> Duration {
        self.elapsed.unwrap_or_default()
    }

    pub fn requests(&self) -> &[RequestRecord] {
        &self.requests
    }

    pub fn teams(&self) -> &[TeamRecord] {
        &self.teams
    }

    pub fn unassigned(&self) -> &[UnassignedRequest] {
        &self.unassigned
    }
}

impl Default for DispatchStatistics {
    fn default() -> Self {
        Self::new()
    }
}
