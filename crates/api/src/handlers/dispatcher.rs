use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use requester_dispatcher::{DispatchStatus, ReportSummary};

use crate::{error::ApiResult, response::ApiResponse, routes::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct LaunchResponse {
    pub run_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StopResponse {
    pub stopped: bool,
}

/// 在后台启动一次调度
pub async fn launch_dispatcher(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let run_id = state
        .dispatcher
        .start(state.shutdown_tx.subscribe())
        .await?;

    info!("通过 API 启动调度运行 {}", run_id);
    Ok((
        StatusCode::ACCEPTED,
        ApiResponse::success_with_message(LaunchResponse { run_id }, "调度已启动"),
    ))
}

pub async fn stop_dispatcher(State(state): State<AppState>) -> ApiResponse<StopResponse> {
    let stopped = state.dispatcher.stop().await;
    ApiResponse::success(StopResponse { stopped })
}

pub async fn get_status(State(state): State<AppState>) -> ApiResponse<DispatchStatus> {
    ApiResponse::success(state.dispatcher.status().await)
}

/// 为最近一次完成的调度生成统计报告
pub async fn create_report(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<ReportSummary>> {
    let summary = state.dispatcher.create_statistics_report().await?;
    Ok(ApiResponse::success_with_message(summary, "统计报告已生成"))
}
