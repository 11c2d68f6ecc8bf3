use std::time::Duration;

use async_trait::async_trait;

use requester_core::{traits::GeneratorTrigger, RequesterResult};

use crate::http_client::ServiceEndpoint;

/// 请求生成服务客户端
#[derive(Debug, Clone)]
pub struct GeneratorClient {
    endpoint: ServiceEndpoint,
}

impl GeneratorClient {
    pub fn new(base_url: &str, timeout: Duration) -> RequesterResult<Self> {
        Ok(Self {
            endpoint: ServiceEndpoint::new("generator", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl GeneratorTrigger for GeneratorClient {
    async fn start_generator(&self) -> RequesterResult<()> {
        let url = self.endpoint.url("/api/v1/generator/start");
        let response = self
            .endpoint
            .client()
            .post(&url)
            .send()
            .await
            .map_err(|e| self.endpoint.transport_error(e))?;

        self.endpoint.ensure_success(response).await?;
        Ok(())
    }
}
