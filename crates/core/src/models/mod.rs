//! # 数据模型
//!
//! 调度器在三个外部服务之间传递的数据结构，以及调度过程中累积的统计记录。
//!
//! ## 核心模型
//!
//! ### PendingRequest - 缓冲区中的待处理请求
//! 由请求缓冲区 `PopTop` 返回，携带生成器ID和在缓冲区中的等待时间。
//!
//! ### ConfirmedAssignment - 清洁服务确认的分配
//! 清洁服务接受请求后返回，携带实际执行的清洁队和清洁耗时。
//!
//! ### RequestRecord - 单个请求的统计记录
//! 由上述两者合并而成，每个成功分配的请求恰好生成一条，创建后不可变。
//!
//! ### TeamRecord - 清洁队的汇总统计
//! 在生成报告时从清洁服务读取的快照，调度过程中不会增量更新。
//!
//! ### UnassignedRequest - 未能分配的请求
//! 一次迭代中所有空闲清洁队都拒绝了该请求时记录。
//!
//! ## 时间字段
//!
//! 服务上报的时长字段均为秒（`f64`），与报告中的 `sec` 单位一致。

pub mod request;
pub mod team;

pub use request::*;
pub use team::*;
