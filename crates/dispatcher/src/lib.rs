//! 请求调度
//!
//! 调度循环从缓冲服务取出请求并分配给空闲的清洁队，同时累积统计数据，
//! 运行结束后可以生成统计报告。

pub mod backoff;
pub mod dispatch_loop;
pub mod generator_trigger;
pub mod metrics;
pub mod report;
pub mod service;
pub mod statistics;

pub use backoff::RetryBackoff;
pub use dispatch_loop::{CompletedDispatch, DispatchLoop, DispatchLoopConfig, DispatchOutcome};
pub use generator_trigger::spawn_generator_trigger;
pub use report::{load_percent, write_report, StatisticsReport, TeamReportRow};
pub use service::{DispatchStatus, DispatchSummary, DispatcherService, ReportSummary};
pub use statistics::DispatchStatistics;
