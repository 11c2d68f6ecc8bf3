use serde::{Deserialize, Serialize};

pub type TeamId = u64;

/// 清洁队的汇总统计快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: TeamId,
    pub speed: u32,
    pub processed_requests: u64,
    /// 累计忙碌时间（秒）
    pub total_busy_time: f64,
}
