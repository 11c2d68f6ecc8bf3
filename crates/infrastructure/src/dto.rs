//! 下游服务的 JSON 报文

use serde::{Deserialize, Serialize};

use requester_core::models::{ConfirmedAssignment, PendingRequest, TeamId, TeamRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableTeamsResponse {
    #[serde(default)]
    pub teams_ids: Vec<TeamId>,
}

/// 发送给清洁服务的请求字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningRequestDto {
    pub id: u64,
    pub client_id: u64,
    pub priority: u32,
    pub cleaning_type: u32,
}

impl From<&PendingRequest> for CleaningRequestDto {
    fn from(request: &PendingRequest) -> Self {
        Self {
            id: request.id,
            client_id: request.client_id,
            priority: request.priority,
            cleaning_type: request.cleaning_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProceedCleaningRequest {
    pub req: CleaningRequestDto,
    pub team_id: TeamId,
}

/// 清洁服务确认后的请求，其余字段忽略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanedRequestDto {
    pub id: u64,
    pub team_id: TeamId,
    pub priority: u32,
    #[serde(default)]
    pub time_in_cleaner: f64,
}

impl From<CleanedRequestDto> for ConfirmedAssignment {
    fn from(dto: CleanedRequestDto) -> Self {
        Self {
            request_id: dto.id,
            team_id: dto.team_id,
            priority: dto.priority,
            time_in_cleaner: dto.time_in_cleaner,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProceedCleaningResponse {
    pub req: CleanedRequestDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStatsDto {
    pub id: TeamId,
    pub speed: u32,
    pub processed_requests: u64,
    pub total_busy_time: f64,
}

impl From<TeamStatsDto> for TeamRecord {
    fn from(dto: TeamStatsDto) -> Self {
        Self {
            id: dto.id,
            speed: dto.speed,
            processed_requests: dto.processed_requests,
            total_busy_time: dto.total_busy_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsStatsResponse {
    #[serde(default)]
    pub teams: Vec<TeamStatsDto>,
}

/// 缓冲区返回的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferedRequestDto {
    pub id: u64,
    #[serde(default)]
    pub client_id: u64,
    #[serde(default)]
    pub generator_id: u64,
    pub priority: u32,
    #[serde(default)]
    pub cleaning_type: u32,
    #[serde(default)]
    pub time_in_buffer: f64,
}

impl From<BufferedRequestDto> for PendingRequest {
    fn from(dto: BufferedRequestDto) -> Self {
        Self {
            id: dto.id,
            client_id: dto.client_id,
            generator_id: dto.generator_id,
            priority: dto.priority,
            cleaning_type: dto.cleaning_type,
            time_in_buffer: dto.time_in_buffer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopTopResponse {
    #[serde(default)]
    pub req: Option<BufferedRequestDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaned_request_ignores_extra_fields() {
        let json = r#"{"req":{"id":1,"client_id":3,"team_id":7,"priority":5,"cleaning_type":2,"time_in_cleaner":4.5}}"#;
        let response: ProceedCleaningResponse = serde_json::from_str(json).unwrap();
        let confirmed = ConfirmedAssignment::from(response.req);

        assert_eq!(confirmed.request_id, 1);
        assert_eq!(confirmed.team_id, 7);
        assert_eq!(confirmed.time_in_cleaner, 4.5);
    }

    #[test]
    fn test_pop_top_null_request() {
        let response: PopTopResponse = serde_json::from_str(r#"{"req":null}"#).unwrap();
        assert!(response.req.is_none());

        let response: PopTopResponse = serde_json::from_str("{}").unwrap();
        assert!(response.req.is_none());
    }
}
