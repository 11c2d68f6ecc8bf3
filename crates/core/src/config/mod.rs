//! 配置管理
//!
//! 配置按 默认值 → TOML文件 → `REQUESTER_` 环境变量 → `BUFFER_SERVICE` 等服务地址变量 的顺序叠加，
//! 加载后统一校验。

pub mod api_observability;
pub mod app_config;
pub mod dispatcher;
pub mod report;
pub mod services;

pub use api_observability::{ApiConfig, ObservabilityConfig};
pub use app_config::AppConfig;
pub use dispatcher::{DispatcherConfig, RetryConfig};
pub use report::{ReportConfig, ReportFormat};
pub use services::ServicesConfig;
