use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use requester_core::{
    models::{ConfirmedAssignment, PendingRequest, TeamId, TeamRecord},
    traits::{AssignmentClient, TeamDirectory},
    RequesterResult,
};

use crate::dto::{
    AvailableTeamsResponse, CleaningRequestDto, ProceedCleaningRequest, ProceedCleaningResponse,
    TeamsStatsResponse,
};
use crate::http_client::ServiceEndpoint;

/// 清洁服务客户端
#[derive(Debug, Clone)]
pub struct CleanerClient {
    endpoint: ServiceEndpoint,
}

impl CleanerClient {
    pub fn new(base_url: &str, timeout: Duration) -> RequesterResult<Self> {
        Ok(Self {
            endpoint: ServiceEndpoint::new("cleaner", base_url, timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }
}

#[async_trait]
impl TeamDirectory for CleanerClient {
    async fn available_teams(&self) -> RequesterResult<Vec<TeamId>> {
        let url = self.endpoint.url("/api/v1/teams/available");
        let response = self
            .endpoint
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| self.endpoint.transport_error(e))?;

        let response = self.endpoint.ensure_success(response).await?;
        let body: AvailableTeamsResponse = self.endpoint.decode(response).await?;

        debug!("空闲清洁队: {:?}", body.teams_ids);
        Ok(body.teams_ids)
    }

    async fn teams_stats(&self) -> RequesterResult<Vec<TeamRecord>> {
        let url = self.endpoint.url("/api/v1/teams/stats");
        let response = self
            .endpoint
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| self.endpoint.transport_error(e))?;

        let response = self.endpoint.ensure_success(response).await?;
        let body: TeamsStatsResponse = self.endpoint.decode(response).await?;

        Ok(body.teams.into_iter().map(TeamRecord::from).collect())
    }
}

#[async_trait]
impl AssignmentClient for CleanerClient {
    async fn proceed_cleaning(
        &self,
        request: &PendingRequest,
        team_id: TeamId,
    ) -> RequesterResult<ConfirmedAssignment> {
        let url = self.endpoint.url("/api/v1/cleaning");
        let payload = ProceedCleaningRequest {
            req: CleaningRequestDto::from(request),
            team_id,
        };

        let response = self
            .endpoint
            .client()
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.endpoint.transport_error(e))?;

        let response = self.endpoint.ensure_success(response).await?;
        let body: ProceedCleaningResponse = self.endpoint.decode(response).await?;

        Ok(ConfirmedAssignment::from(body.req))
    }
}
