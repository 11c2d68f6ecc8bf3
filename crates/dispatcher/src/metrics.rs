use metrics::{counter, Counter};

use requester_core::{RequesterError, TeamId};

/// 调度循环的计数指标
#[derive(Clone)]
pub struct DispatchMetrics {
    pub assignments_total: Counter,
    pub unassigned_total: Counter,
    pub idle_waits_total: Counter,
    pub iterations_total: Counter,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self {
            assignments_total: counter!("requester_assignments_total"),
            unassigned_total: counter!("requester_unassigned_requests_total"),
            idle_waits_total: counter!("requester_idle_waits_total"),
            iterations_total: counter!("requester_dispatch_iterations_total"),
        }
    }

    pub fn record_rejection(&self, team_id: TeamId) {
        counter!("requester_assignment_rejections_total", "team_id" => team_id.to_string())
            .increment(1);
    }

    pub fn record_transport_failure(&self, call: &'static str, error: &RequesterError) {
        counter!(
            "requester_transport_failures_total",
            "call" => call,
            "kind" => failure_kind(error)
        )
        .increment(1);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// 失败调用的指标标签
pub fn failure_kind(error: &RequesterError) -> &'static str {
    if error.is_transient() {
        "transient"
    } else {
        "permanent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_follows_error_class() {
        assert_eq!(
            failure_kind(&RequesterError::transport("buffer", "connection refused")),
            "transient"
        );
        assert_eq!(
            failure_kind(&RequesterError::ServiceStatus {
                service: "cleaner".to_string(),
                status: 503,
                body: String::new(),
            }),
            "transient"
        );
        assert_eq!(
            failure_kind(&RequesterError::ServiceStatus {
                service: "buffer".to_string(),
                status: 400,
                body: "bad request".to_string(),
            }),
            "permanent"
        );
        assert_eq!(
            failure_kind(&RequesterError::Serialization("eof".to_string())),
            "permanent"
        );
    }
}
