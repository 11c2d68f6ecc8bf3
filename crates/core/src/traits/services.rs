use async_trait::async_trait;

use crate::{
    models::{ConfirmedAssignment, PendingRequest, TeamId, TeamRecord},
    RequesterResult,
};

/// 清洁队目录接口
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// 查询当前空闲的清洁队，顺序即分配时的尝试顺序
    async fn available_teams(&self) -> RequesterResult<Vec<TeamId>>;

    /// 查询所有清洁队的汇总统计
    async fn teams_stats(&self) -> RequesterResult<Vec<TeamRecord>>;
}

/// 请求来源接口
#[async_trait]
pub trait RequestSource: Send + Sync {
    /// 取出优先级最高的待处理请求，缓冲区为空时返回 `None`
    async fn pop_top(&self) -> RequesterResult<Option<PendingRequest>>;
}

/// 请求分配接口
#[async_trait]
pub trait AssignmentClient: Send + Sync {
    /// 将请求交给指定清洁队处理
    async fn proceed_cleaning(
        &self,
        request: &PendingRequest,
        team_id: TeamId,
    ) -> RequesterResult<ConfirmedAssignment>;
}

/// 请求生成器触发接口
#[async_trait]
pub trait GeneratorTrigger: Send + Sync {
    /// 启动上游请求生成
    async fn start_generator(&self) -> RequesterResult<()>;
}
