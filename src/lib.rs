//! # Trivia API
//!
//! 一个提供题库浏览、搜索、增删和随机测验的 HTTP 服务
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有存储资源，只暴露读写能力
//! - `StorageGateway` - 存储网关抽象
//! - `MemoryGateway` / `SqliteGateway` - 内存与 SQLite 两种实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心 HTTP
//! - `pagination` - 分页引擎
//! - `question_search` - 题干搜索
//! - `quiz_selector` - 测验随机选题
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个请求"的完整处理流程
//! - `payload` - 请求体解析
//! - `QuestionFlow` - 校验 → 能力调用 → 响应组装
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/server` - 应用生命周期和监听
//! - `orchestrator/router` - 路由分发和响应格式
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ApiError, ApiResult, StorageError, StorageResult};
pub use infrastructure::{Deletion, MemoryGateway, SqliteGateway, StorageGateway};
pub use models::question::{Category, NewQuestion, Question};
pub use orchestrator::{handle_request, serve, App};
pub use workflow::QuestionFlow;
