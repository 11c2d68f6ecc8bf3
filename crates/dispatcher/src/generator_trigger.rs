use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use requester_core::{traits::GeneratorTrigger, RequesterResult};

/// 在独立任务中启动请求生成器
///
/// 启动失败只记录日志，结果通过返回的句柄交出；调度循环不会等待这个任务。
pub fn spawn_generator_trigger(
    generator: Arc<dyn GeneratorTrigger>,
) -> JoinHandle<RequesterResult<()>> {
    tokio::spawn(async move {
        match generator.start_generator().await {
            Ok(()) => {
                info!("请求生成器已启动");
                Ok(())
            }
            Err(e) => {
                error!("启动请求生成器失败: {}", e);
                Err(e)
            }
        }
    })
}
