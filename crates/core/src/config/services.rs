use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 外部服务地址配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub buffer_url: String,
    pub generator_url: String,
    pub cleaner_url: String,
    /// 单次请求的传输层超时
    pub request_timeout_seconds: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            buffer_url: "http://localhost:8081".to_string(),
            generator_url: "http://localhost:8082".to_string(),
            cleaner_url: "http://localhost:8083".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl ServicesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("buffer_url", &self.buffer_url),
            ("generator_url", &self.generator_url),
            ("cleaner_url", &self.cleaner_url),
        ] {
            if url.trim().is_empty() {
                return Err(anyhow::anyhow!("{name} 不能为空"));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!("{name} 必须以 http:// 或 https:// 开头: {url}"));
            }
        }

        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("请求超时时间必须大于0"));
        }

        Ok(())
    }
}

/// 为不带协议的地址（如 `buffer:50051`）补全 `http://`
pub fn with_http_scheme(target: &str) -> String {
    let target = target.trim().trim_end_matches('/');
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("http://{target}")
    }
}
