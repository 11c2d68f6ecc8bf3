//! # Requester API
//!
//! 调度器的HTTP控制接口，基于Axum构建。
//!
//! ## API 端点
//!
//! - `GET /health` - 健康检查
//! - `POST /api/v1/dispatcher/launch` - 在后台启动一次调度
//! - `POST /api/v1/dispatcher/stop` - 停止当前调度
//! - `GET /api/v1/dispatcher/status` - 查询调度状态
//! - `POST /api/v1/dispatcher/report` - 为最近一次完成的调度生成统计报告
//!
//! ## 错误响应
//!
//! ```json
//! {
//!   "success": false,
//!   "error": {
//!     "message": "调度器错误: 调度循环正在运行",
//!     "type": "DISPATCH_IN_PROGRESS",
//!     "code": 409,
//!     "suggestions": ["等待当前调度结束"],
//!     "timestamp": "2024-01-01T00:00:00Z"
//!   }
//! }
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower::ServiceBuilder;

use requester_dispatcher::DispatcherService;

use middleware::{cors_layer, request_logging, trace_layer};
use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(dispatcher: Arc<DispatcherService>, shutdown_tx: broadcast::Sender<()>) -> Router {
    let state = AppState {
        dispatcher,
        shutdown_tx,
    };

    create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(cors_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    )
}
