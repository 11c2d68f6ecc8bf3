use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// 启动生成器后、开始轮询前的等待时间
    pub startup_delay_ms: u64,
    /// 每次迭代结束后的节奏间隔，0 表示不等待
    pub iteration_interval_ms: u64,
    /// 没有空闲清洁队时的固定等待时间
    pub idle_wait_ms: u64,
    pub retry: RetryConfig,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            startup_delay_ms: 3000,
            iteration_interval_ms: 1000,
            idle_wait_ms: 1000,
            retry: RetryConfig::default(),
        }
    }
}

impl DispatcherConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn iteration_interval(&self) -> Duration {
        Duration::from_millis(self.iteration_interval_ms)
    }

    pub fn idle_wait(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.idle_wait_ms == 0 {
            return Err(anyhow::anyhow!("空闲等待时间必须大于0"));
        }

        self.retry.validate()
    }
}

/// 传输失败时的重试退避配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 基础重试间隔（毫秒）
    pub base_interval_ms: u64,
    /// 最大重试间隔（毫秒）
    pub max_interval_ms: u64,
    /// 指数退避倍数，1.0 即固定间隔
    pub backoff_multiplier: f64,
    /// 重试间隔的随机抖动范围（0.0-1.0）
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 3000,
            max_interval_ms: 30_000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    /// 固定间隔重试，不做退避也不加抖动
    pub fn fixed(interval_ms: u64) -> Self {
        Self {
            base_interval_ms: interval_ms,
            max_interval_ms: interval_ms,
            backoff_multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_interval_ms == 0 {
            return Err(anyhow::anyhow!("基础重试间隔必须大于0"));
        }

        if self.max_interval_ms < self.base_interval_ms {
            return Err(anyhow::anyhow!(
                "最大重试间隔 {}ms 不能小于基础重试间隔 {}ms",
                self.max_interval_ms,
                self.base_interval_ms
            ));
        }

        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return Err(anyhow::anyhow!("退避倍数必须不小于1.0"));
        }

        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(anyhow::anyhow!("抖动因子必须在0.0到1.0之间"));
        }

        Ok(())
    }
}
