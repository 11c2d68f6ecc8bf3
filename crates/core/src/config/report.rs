use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 统计报告输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[serde(alias = "txt")]
    Text,
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_path: PathBuf,
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("statistics.txt"),
            format: ReportFormat::Text,
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.output_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("报告输出路径不能为空"));
        }

        Ok(())
    }
}
