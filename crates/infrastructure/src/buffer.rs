use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use requester_core::{models::PendingRequest, traits::RequestSource, RequesterResult};

use crate::dto::PopTopResponse;
use crate::http_client::ServiceEndpoint;

/// 请求缓冲服务客户端
#[derive(Debug, Clone)]
pub struct BufferClient {
    endpoint: ServiceEndpoint,
}

impl BufferClient {
    pub fn new(base_url: &str, timeout: Duration) -> RequesterResult<Self> {
        Ok(Self {
            endpoint: ServiceEndpoint::new("buffer", base_url, timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }
}

#[async_trait]
impl RequestSource for BufferClient {
    /// 204、404 或 `{"req": null}` 都表示缓冲区没有待处理的请求
    async fn pop_top(&self) -> RequesterResult<Option<PendingRequest>> {
        let url = self.endpoint.url("/api/v1/requests/pop");
        let response = self
            .endpoint
            .client()
            .post(&url)
            .send()
            .await
            .map_err(|e| self.endpoint.transport_error(e))?;

        if matches!(
            response.status(),
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND
        ) {
            debug!("缓冲区返回 HTTP {}，没有待处理的请求", response.status());
            return Ok(None);
        }

        let response = self.endpoint.ensure_success(response).await?;
        let body: PopTopResponse = self.endpoint.decode(response).await?;

        Ok(body.req.map(PendingRequest::from))
    }
}
