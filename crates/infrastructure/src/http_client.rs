use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use requester_core::{RequesterError, RequesterResult};

/// 某个下游服务的 HTTP 端点
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    service: &'static str,
    base_url: String,
    client: Client,
}

impl ServiceEndpoint {
    pub fn new(service: &'static str, base_url: &str, timeout: Duration) -> RequesterResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RequesterError::Configuration(format!("创建 {service} HTTP 客户端失败: {e}")))?;

        Ok(Self {
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 把连接、超时等错误映射为传输错误
    pub fn transport_error(&self, err: reqwest::Error) -> RequesterError {
        RequesterError::transport(self.service, err)
    }

    /// 非 2xx 响应转换为 `ServiceStatus` 错误
    pub async fn ensure_success(&self, response: Response) -> RequesterResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RequesterError::ServiceStatus {
            service: self.service.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    /// 读取响应体并解码为 JSON
    pub async fn decode<T: DeserializeOwned>(&self, response: Response) -> RequesterResult<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            RequesterError::Serialization(format!("解析 {} 服务响应失败: {}", self.service, e))
        })
    }
}
