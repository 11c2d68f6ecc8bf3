use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api_observability::{ApiConfig, ObservabilityConfig},
    dispatcher::DispatcherConfig,
    report::ReportConfig,
    services::{with_http_scheme, ServicesConfig},
};

/// 部署环境注入的服务地址变量
const ENV_BUFFER_SERVICE: &str = "BUFFER_SERVICE";
const ENV_GENERATOR_SERVICE: &str = "GENERATOR_SERVICE";
const ENV_CLEANER_SERVICE: &str = "CLEANER_SERVICE";

/// System configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub services: ServicesConfig,
    pub dispatcher: DispatcherConfig,
    pub report: ReportConfig,
    pub api: ApiConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: REQUESTER_, nested keys separated by `__`)
    /// 4. `BUFFER_SERVICE` / `GENERATOR_SERVICE` / `CLEANER_SERVICE`
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults =
            ConfigBuilder::try_from(&AppConfig::default()).context("构建默认配置失败")?;
        let mut builder = ConfigBuilder::builder().add_source(defaults);

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = ["config/requester.toml", "requester.toml"];
            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("REQUESTER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder = builder
            .set_override_option(
                "services.buffer_url",
                std::env::var(ENV_BUFFER_SERVICE)
                    .ok()
                    .map(|v| with_http_scheme(&v)),
            )?
            .set_override_option(
                "services.generator_url",
                std::env::var(ENV_GENERATOR_SERVICE)
                    .ok()
                    .map(|v| with_http_scheme(&v)),
            )?
            .set_override_option(
                "services.cleaner_url",
                std::env::var(ENV_CLEANER_SERVICE)
                    .ok()
                    .map(|v| with_http_scheme(&v)),
            )?;

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn validate(&self) -> Result<()> {
        self.services.validate().context("服务地址配置验证失败")?;

        self.dispatcher
            .validate()
            .context("Dispatcher配置验证失败")?;

        self.report.validate().context("报告配置验证失败")?;

        self.api.validate().context("API配置验证失败")?;

        self.observability
            .validate()
            .context("可观测性配置验证失败")?;

        Ok(())
    }
}
