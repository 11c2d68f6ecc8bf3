use thiserror::Error;

/// 调度器错误类型定义
#[derive(Debug, Error)]
pub enum RequesterError {
    #[error("{service} 服务通信失败: {message}")]
    Transport { service: String, message: String },

    #[error("{service} 服务返回错误状态 HTTP {status}: {body}")]
    ServiceStatus {
        service: String,
        status: u16,
        body: String,
    },

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("调度循环正在运行")]
    DispatchInProgress,

    #[error("尚无已完成的调度运行")]
    NoCompletedRun,

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl RequesterError {
    pub fn transport(service: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.to_string(),
        }
    }

    /// 是否为可通过重试恢复的瞬时错误
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::ServiceStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for RequesterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// 统一的Result类型
pub type RequesterResult<T> = std::result::Result<T, RequesterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(RequesterError::transport("buffer", "connection refused").is_transient());
        assert!(RequesterError::ServiceStatus {
            service: "cleaner".to_string(),
            status: 503,
            body: String::new(),
        }
        .is_transient());
        assert!(!RequesterError::ServiceStatus {
            service: "cleaner".to_string(),
            status: 409,
            body: "team busy".to_string(),
        }
        .is_transient());
        assert!(!RequesterError::NoCompletedRun.is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = RequesterError::transport("cleaner", "timed out");
        assert_eq!(err.to_string(), "cleaner 服务通信失败: timed out");
    }
}
