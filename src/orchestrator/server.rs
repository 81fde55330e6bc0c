//! 应用服务器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：选择存储网关、导入种子数据、输出启动信息
//! 2. **资源管理**：唯一持有存储网关，通过 `QuestionFlow` 共享给所有连接
//! 3. **服务运行**：绑定监听地址，收到 Ctrl-C 后优雅退出

use std::convert::Infallible;
use std::future::Future;
use std::net::TcpListener;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::{MemoryGateway, SqliteGateway, StorageGateway};
use crate::models::{load_seed_file, seed_gateway};
use crate::orchestrator::router::handle_request;
use crate::utils::logging::{log_seeded, log_startup};
use crate::workflow::QuestionFlow;

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<QuestionFlow>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let gateway = open_gateway(&config)?;

        if let Some(seed_file) = &config.seed_file {
            if gateway.list_questions()?.is_empty() {
                info!("📁 正在导入种子数据: {}", seed_file.display());
                let seed = load_seed_file(seed_file).await?;
                let total = seed.questions.len();
                let inserted = seed_gateway(gateway.as_ref(), seed)?;
                log_seeded(inserted, total);
            } else {
                info!("存储中已有题目，跳过种子数据导入");
            }
        }

        log_startup(&config.bind_address, gateway.kind());

        Ok(Self {
            config,
            flow: Arc::new(QuestionFlow::new(gateway)),
        })
    }

    pub fn flow(&self) -> Arc<QuestionFlow> {
        self.flow.clone()
    }

    /// 运行服务直到收到 Ctrl-C
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_address)
            .with_context(|| format!("无法绑定监听地址: {}", self.config.bind_address))?;

        serve(self.flow, listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("无法监听 Ctrl-C 信号: {}", e);
                std::future::pending::<()>().await;
            }
            info!("👋 收到退出信号，正在关闭服务...");
        })
        .await
    }
}

fn open_gateway(config: &Config) -> Result<Arc<dyn StorageGateway>> {
    let gateway: Arc<dyn StorageGateway> = match &config.database_path {
        Some(path) => Arc::new(
            SqliteGateway::open(path)
                .with_context(|| format!("无法打开数据库: {}", path.display()))?,
        ),
        None => Arc::new(MemoryGateway::new()),
    };
    Ok(gateway)
}

/// 在已绑定的监听器上提供服务，`shutdown` 完成后优雅退出
///
/// # 参数
/// - `flow`: 题目接口流程
/// - `listener`: 已绑定的 TCP 监听器（测试中可绑定到 0 端口）
/// - `shutdown`: 退出信号
pub async fn serve<F>(flow: Arc<QuestionFlow>, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    listener.set_nonblocking(true)?;
    let local_addr = listener.local_addr()?;

    let make_svc = make_service_fn(move |_conn| {
        let flow = flow.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| handle_request(flow.clone(), req)))
        }
    });

    let server = Server::from_tcp(listener)?.serve(make_svc);
    info!("✓ 服务已就绪: http://{}", local_addr);

    server
        .with_graceful_shutdown(shutdown)
        .await
        .context("服务运行失败")?;

    info!("服务已停止");
    Ok(())
}
