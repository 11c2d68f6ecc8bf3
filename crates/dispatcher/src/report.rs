//! 统计报告
//!
//! 报告在调度任务结束之后根据 [`DispatchStatistics`] 构建，包含清洁队负载表、
//! 已分配请求表和未分配请求表，可以输出为文本或 JSON。

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use requester_core::{
    models::{RequestRecord, TeamId, TeamRecord, UnassignedRequest},
    ReportFormat, RequesterError, RequesterResult,
};

use crate::statistics::DispatchStatistics;

/// 清洁队负载行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamReportRow {
    pub id: TeamId,
    pub speed: u32,
    pub processed_requests: u64,
    pub total_busy_time: f64,
    pub load_percent: f64,
}

/// 一次调度运行的统计报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub generated_at: DateTime<Utc>,
    pub elapsed_seconds: f64,
    pub teams: Vec<TeamReportRow>,
    pub requests: Vec<RequestRecord>,
    pub unassigned: Vec<UnassignedRequest>,
}

/// 负载百分比 = 忙碌时间 / 总耗时 × 100，总耗时为零时记为 0
pub fn load_percent(busy_seconds: f64, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds <= 0.0 {
        return 0.0;
    }
    busy_seconds / elapsed_seconds * 100.0
}

impl TeamReportRow {
    fn from_record(team: &TeamRecord, elapsed_seconds: f64) -> Self {
        Self {
            id: team.id,
            speed: team.speed,
            processed_requests: team.processed_requests,
            total_busy_time: team.total_busy_time,
            load_percent: load_percent(team.total_busy_time, elapsed_seconds),
        }
    }
}

impl StatisticsReport {
    pub fn build(statistics: &DispatchStatistics) -> Self {
        let elapsed_seconds = statistics.elapsed().as_secs_f64();

        Self {
            generated_at: Utc::now(),
            elapsed_seconds,
            teams: statistics
                .teams()
                .iter()
                .map(|team| TeamReportRow::from_record(team, elapsed_seconds))
                .collect(),
            requests: statistics.requests().to_vec(),
            unassigned: statistics.unassigned().to_vec(),
        }
    }

    pub fn render(&self, format: ReportFormat) -> RequesterResult<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();

        // 写入 String 不会失败
        let _ = writeln!(out, "Statistics Report");
        let _ = writeln!(
            out,
            "Generated at: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(out, "Total dispatch time: {:.2}sec", self.elapsed_seconds);
        let _ = writeln!(out);

        let _ = writeln!(out, "Team Statistics");
        let _ = writeln!(
            out,
            "{:>8} | {:>8} | {:>18} | {:>16} | {:>10}",
            "ID", "Speed", "Processed Requests", "Total Busy Time", "Load (%)"
        );
        for team in &self.teams {
            let _ = writeln!(
                out,
                "{:>8} | {:>8} | {:>18} | {:>16} | {:>10.2}",
                team.id,
                team.speed,
                team.processed_requests,
                format!("{:.2}sec", team.total_busy_time),
                team.load_percent
            );
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Request Statistics");
        let _ = writeln!(
            out,
            "{:>8} | {:>12} | {:>8} | {:>8} | {:>16} | {:>16}",
            "ID", "Generator ID", "Team ID", "Priority", "Time in Cleaner", "Time in Buffer"
        );
        for request in &self.requests {
            let _ = writeln!(
                out,
                "{:>8} | {:>12} | {:>8} | {:>8} | {:>16} | {:>16}",
                request.id,
                request.generator_id,
                request.team_id,
                request.priority,
                format!("{:.2}sec", request.time_in_cleaner),
                format!("{:.2}sec", request.time_in_buffer)
            );
        }

        if !self.unassigned.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Unassigned Requests");
            let _ = writeln!(
                out,
                "{:>8} | {:>12} | {:>8} | {:>16} | Attempted Teams",
                "ID", "Generator ID", "Priority", "Time in Buffer"
            );
            for request in &self.unassigned {
                let attempted = request
                    .attempted_teams
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(
                    out,
                    "{:>8} | {:>12} | {:>8} | {:>16} | {}",
                    request.id,
                    request.generator_id,
                    request.priority,
                    format!("{:.2}sec", request.time_in_buffer),
                    attempted
                );
            }
        }

        out
    }
}

/// 渲染报告并写入文件，必要时创建上级目录
pub async fn write_report(
    report: &StatisticsReport,
    path: &Path,
    format: ReportFormat,
) -> RequesterResult<()> {
    let content = report.render(format)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    tokio::fs::write(path, content).await.map_err(|e| {
        RequesterError::Io(std::io::Error::new(
            e.kind(),
            format!("写入统计报告 {} 失败: {}", path.display(), e),
        ))
    })?;

    info!("统计报告已生成: {} ({})", path.display(), format);
    Ok(())
}
