//! 下游服务的 HTTP 客户端
//!
//! 为缓冲服务、清洁服务和生成服务实现 `requester-core` 中定义的服务接口。

pub mod buffer;
pub mod cleaner;
pub mod dto;
pub mod generator;
pub mod http_client;

use std::sync::Arc;

use requester_core::{RequesterResult, ServicesConfig};

pub use buffer::BufferClient;
pub use cleaner::CleanerClient;
pub use generator::GeneratorClient;
pub use http_client::ServiceEndpoint;

/// 按配置创建的全部下游服务客户端
#[derive(Debug, Clone)]
pub struct ServiceClients {
    pub buffer: Arc<BufferClient>,
    pub cleaner: Arc<CleanerClient>,
    pub generator: Arc<GeneratorClient>,
}

impl ServiceClients {
    pub fn from_config(config: &ServicesConfig) -> RequesterResult<Self> {
        let timeout = config.request_timeout();

        Ok(Self {
            buffer: Arc::new(BufferClient::new(&config.buffer_url, timeout)?),
            cleaner: Arc::new(CleanerClient::new(&config.cleaner_url, timeout)?),
            generator: Arc::new(GeneratorClient::new(&config.generator_url, timeout)?),
        })
    }
}
