use serde::{Deserialize, Serialize};

use super::TeamId;

/// 缓冲区返回的待处理请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub id: u64,
    pub client_id: u64,
    pub generator_id: u64,
    pub priority: u32,
    pub cleaning_type: u32,
    /// 在缓冲区中等待的时间（秒）
    pub time_in_buffer: f64,
}

/// 清洁服务确认的分配结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedAssignment {
    pub request_id: u64,
    pub team_id: TeamId,
    pub priority: u32,
    /// 清洁阶段耗时（秒）
    pub time_in_cleaner: f64,
}

/// 单个请求的统计记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: u64,
    pub generator_id: u64,
    pub team_id: TeamId,
    pub priority: u32,
    pub time_in_cleaner: f64,
    pub time_in_buffer: f64,
}

impl RequestRecord {
    /// 合并清洁服务确认的字段和缓冲区上报的字段
    pub fn from_assignment(pending: &PendingRequest, confirmed: &ConfirmedAssignment) -> Self {
        Self {
            id: confirmed.request_id,
            generator_id: pending.generator_id,
            team_id: confirmed.team_id,
            priority: confirmed.priority,
            time_in_cleaner: confirmed.time_in_cleaner,
            time_in_buffer: pending.time_in_buffer,
        }
    }
}

/// 所有空闲清洁队都拒绝的请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnassignedRequest {
    pub id: u64,
    pub generator_id: u64,
    pub priority: u32,
    pub time_in_buffer: f64,
    /// 按尝试顺序排列的清洁队ID
    pub attempted_teams: Vec<TeamId>,
}

impl UnassignedRequest {
    pub fn new(pending: &PendingRequest, attempted_teams: Vec<TeamId>) -> Self {
        Self {
            id: pending.id,
            generator_id: pending.generator_id,
            priority: pending.priority,
            time_in_buffer: pending.time_in_buffer,
            attempted_teams,
        }
    }
}
