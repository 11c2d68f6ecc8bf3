//! Test data builders for creating test entities
//!
//! Builders start from sensible defaults so a test only spells out the fields
//! it actually asserts on.

use requester_core::models::{PendingRequest, TeamId, TeamRecord};

/// Builder for creating test PendingRequest entities
pub struct PendingRequestBuilder {
    request: PendingRequest,
}

impl PendingRequestBuilder {
    pub fn new() -> Self {
        Self {
            request: PendingRequest {
                id: 1,
                client_id: 1,
                generator_id: 1,
                priority: 1,
                cleaning_type: 0,
                time_in_buffer: 0.5,
            },
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.request.id = id;
        self
    }

    pub fn with_client_id(mut self, client_id: u64) -> Self {
        self.request.client_id = client_id;
        self
    }

    pub fn with_generator_id(mut self, generator_id: u64) -> Self {
        self.request.generator_id = generator_id;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.request.priority = priority;
        self
    }

    pub fn with_cleaning_type(mut self, cleaning_type: u32) -> Self {
        self.request.cleaning_type = cleaning_type;
        self
    }

    pub fn with_time_in_buffer(mut self, seconds: f64) -> Self {
        self.request.time_in_buffer = seconds;
        self
    }

    pub fn build(self) -> PendingRequest {
        self.request
    }
}

impl Default for PendingRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test TeamRecord entities
pub struct TeamRecordBuilder {
    team: TeamRecord,
}

impl TeamRecordBuilder {
    pub fn new(id: TeamId) -> Self {
        Self {
            team: TeamRecord {
                id,
                speed: 1,
                processed_requests: 0,
                total_busy_time: 0.0,
            },
        }
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.team.speed = speed;
        self
    }

    pub fn with_processed_requests(mut self, processed_requests: u64) -> Self {
        self.team.processed_requests = processed_requests;
        self
    }

    pub fn with_total_busy_time(mut self, seconds: f64) -> Self {
        self.team.total_busy_time = seconds;
        self
    }

    pub fn build(self) -> TeamRecord {
        self.team
    }
}

/// Sequential pending requests with ids `start..start + count`
pub fn pending_requests(start: u64, count: usize) -> Vec<PendingRequest> {
    (start..start + count as u64)
        .map(|id| {
            PendingRequestBuilder::new()
                .with_id(id)
                .with_generator_id(id % 3 + 1)
                .with_priority((id % 5) as u32 + 1)
                .build()
        })
        .collect()
}
