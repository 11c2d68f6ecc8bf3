use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use requester_core::RequesterError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("调度器错误: {0}")]
    Requester(#[from] RequesterError),

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, Vec<String>) {
        match self {
            ApiError::Requester(RequesterError::DispatchInProgress) => (
                StatusCode::CONFLICT,
                "DISPATCH_IN_PROGRESS",
                vec![
                    "等待当前调度结束".to_string(),
                    "使用 POST /api/v1/dispatcher/stop 停止当前调度".to_string(),
                ],
            ),
            ApiError::Requester(RequesterError::NoCompletedRun) => (
                StatusCode::CONFLICT,
                "NO_COMPLETED_RUN",
                vec!["先使用 POST /api/v1/dispatcher/launch 完成一次调度".to_string()],
            ),
            ApiError::Requester(
                RequesterError::Transport { service, .. }
                | RequesterError::ServiceStatus { service, .. },
            ) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                vec![format!("请检查 {service} 服务是否可用")],
            ),
            ApiError::Requester(RequesterError::Serialization(_)) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                vec!["下游服务返回了无法解析的数据".to_string()],
            ),
            ApiError::Requester(RequesterError::Io(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "REPORT_WRITE_ERROR",
                vec!["请检查报告输出路径是否可写".to_string()],
            ),
            ApiError::Requester(_) | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                vec!["请查看服务日志".to_string()],
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, suggestions) = self.parts();

        let body = Json(json!({
            "success": false,
            "error": {
                "message": self.to_string(),
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (RequesterError::DispatchInProgress, StatusCode::CONFLICT),
            (RequesterError::NoCompletedRun, StatusCode::CONFLICT),
            (
                RequesterError::transport("cleaner", "connection refused"),
                StatusCode::BAD_GATEWAY,
            ),
            (
                RequesterError::ServiceStatus {
                    service: "cleaner".to_string(),
                    status: 500,
                    body: String::new(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                RequesterError::Io(std::io::Error::other("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let response = ApiError::from(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
