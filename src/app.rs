use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use requester_api::create_app;
use requester_core::AppConfig;
use requester_dispatcher::DispatcherService;
use requester_infrastructure::ServiceClients;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::{info, warn};

/// 关闭时等待后台调度运行结束的轮询间隔
const RUN_DRAIN_POLL: Duration = Duration::from_millis(100);

/// 应用运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// 启动 HTTP 控制接口，由调用方触发调度
    Serve,
    /// 前台执行一次调度并生成统计报告
    Run,
}

impl AppMode {
    pub fn parse(mode: &str, config: &AppConfig) -> Result<Self> {
        match mode {
            "serve" => {
                if !config.api.enabled {
                    return Err(anyhow::anyhow!("API被禁用，无法以serve模式运行"));
                }
                Ok(AppMode::Serve)
            }
            "run" => Ok(AppMode::Run),
            _ => Err(anyhow::anyhow!("不支持的运行模式: {mode}")),
        }
    }
}

/// 主应用程序
pub struct Application {
    config: AppConfig,
    mode: AppMode,
    dispatcher: Arc<DispatcherService>,
}

impl Application {
    pub fn new(config: AppConfig, mode: AppMode) -> Result<Self> {
        info!("初始化应用程序，模式: {:?}", mode);
        info!(
            "服务地址: buffer={}, generator={}, cleaner={}",
            config.services.buffer_url, config.services.generator_url, config.services.cleaner_url
        );

        let clients =
            ServiceClients::from_config(&config.services).context("创建服务客户端失败")?;

        let dispatcher = Arc::new(DispatcherService::new(
            clients.cleaner.clone(),
            clients.buffer,
            clients.cleaner,
            clients.generator,
            &config.dispatcher,
            config.report.clone(),
        ));

        Ok(Self {
            config,
            mode,
            dispatcher,
        })
    }

    /// 运行应用程序
    ///
    /// `shutdown_tx` 供 serve 模式下的 API 为每次调度订阅关闭信号。
    pub async fn run(
        &self,
        shutdown_tx: broadcast::Sender<()>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        info!("启动应用程序，模式: {:?}", self.mode);

        match self.mode {
            AppMode::Serve => self.run_api(shutdown_tx, shutdown_rx).await,
            AppMode::Run => self.run_once(shutdown_rx).await,
        }
    }

    /// 运行API模式
    async fn run_api(
        &self,
        shutdown_tx: broadcast::Sender<()>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let bind_address = &self.config.api.bind_address;
        info!("启动API服务器: {}", bind_address);

        let app = create_app(Arc::clone(&self.dispatcher), shutdown_tx);

        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))?;

        info!("API服务器启动在 http://{}", bind_address);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        // 进行中的调度已经收到同一个关闭信号，等待它写回统计数据
        while self.dispatcher.is_running().await {
            tokio::time::sleep(RUN_DRAIN_POLL).await;
        }

        if let Some(summary) = self.dispatcher.last_summary().await {
            info!(
                "最后一次调度运行 {}: {:?}，已分配 {}，未分配 {}",
                summary.run_id, summary.outcome, summary.assigned, summary.unassigned
            );
        }

        info!("API服务器已停止");
        Ok(())
    }

    /// 前台执行一次调度，结束后生成统计报告
    async fn run_once(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let summary = self
            .dispatcher
            .launch(shutdown_rx)
            .await
            .context("调度运行失败")?;

        info!(
            "调度运行 {} 结束: {:?}，耗时 {:.2}秒",
            summary.run_id, summary.outcome, summary.elapsed_seconds
        );
        if summary.unassigned > 0 {
            warn!("{} 个请求没有清洁队接收", summary.unassigned);
        }

        let report = self
            .dispatcher
            .create_statistics_report()
            .await
            .context("生成统计报告失败")?;

        info!(
            "统计报告已写入 {} ({})：{} 个清洁队，{} 个请求",
            report.path.display(),
            report.format,
            report.teams,
            report.requests
        );
        Ok(())
    }
}
