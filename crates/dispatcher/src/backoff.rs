use std::time::Duration;

use requester_core::RetryConfig;

/// 单个调用的指数退避状态
///
/// 连续失败次数决定下一次等待时间，调用成功后通过 [`RetryBackoff::reset`] 归零。
#[derive(Debug, Clone)]
pub struct RetryBackoff {
    config: RetryConfig,
    consecutive_failures: u32,
}

impl RetryBackoff {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            consecutive_failures: 0,
        }
    }

    /// 记录一次失败并返回本次应等待的时间
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.delay_for(self.consecutive_failures);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        delay
    }

    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn delay_for(&self, retry_count: u32) -> Duration {
        let base_interval = self.config.base_interval_ms as f64;
        let max_interval = self.config.max_interval_ms as f64;
        let multiplier = self.config.backoff_multiplier;
        let jitter_factor = self.config.jitter_factor;

        let exponent = retry_count.min(i32::MAX as u32) as i32;
        let exponential_interval = base_interval * multiplier.powi(exponent);
        let capped_interval = exponential_interval.min(max_interval);

        // 随机抖动，避免多个实例同时重试
        let jitter = if jitter_factor > 0.0 {
            capped_interval * jitter_factor * (rand::random::<f64>() - 0.5) * 2.0
        } else {
            0.0
        };
        let final_interval = (capped_interval + jitter).clamp(base_interval, max_interval);

        Duration::from_millis(final_interval as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_interval_never_grows() {
        let mut backoff = RetryBackoff::new(RetryConfig::fixed(3000));
        for _ in 0..5 {
            assert_eq!(backoff.next_delay(), Duration::from_secs(3));
        }
        assert_eq!(backoff.consecutive_failures(), 5);
    }

    #[test]
    fn test_exponential_growth_is_capped() {
        let mut backoff = RetryBackoff::new(RetryConfig {
            base_interval_ms: 100,
            max_interval_ms: 1000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        });

        let delays: Vec<u64> = (0..6)
            .map(|_| backoff.next_delay().as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1000, 1000]);
    }

    #[test]
    fn test_reset_restarts_from_base() {
        let mut backoff = RetryBackoff::new(RetryConfig {
            base_interval_ms: 100,
            max_interval_ms: 1000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        });
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let mut backoff = RetryBackoff::new(RetryConfig {
            base_interval_ms: 1000,
            max_interval_ms: 4000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.5,
        });
        for _ in 0..20 {
            let delay = backoff.next_delay();
            assert!(delay >= Duration::from_millis(1000));
            assert!(delay <= Duration::from_millis(4000));
        }
    }
}
