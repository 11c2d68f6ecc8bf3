use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::broadcast;

use requester_dispatcher::DispatcherService;

use crate::handlers::{
    dispatcher::{create_report, get_status, launch_dispatcher, stop_dispatcher},
    health::health_check,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<DispatcherService>,
    /// 进程级关闭信号，转发给每次通过 API 启动的调度运行
    pub shutdown_tx: broadcast::Sender<()>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 调度控制API
        .route("/api/v1/dispatcher/launch", post(launch_dispatcher))
        .route("/api/v1/dispatcher/stop", post(stop_dispatcher))
        .route("/api/v1/dispatcher/status", get(get_status))
        .route("/api/v1/dispatcher/report", post(create_report))
        .with_state(state)
}
