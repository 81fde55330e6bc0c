//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责 HTTP 服务的生命周期和请求分发，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `server` - 应用服务器
//! - 管理应用生命周期（初始化、运行、优雅退出）
//! - 选择存储网关（SQLite 或内存）
//! - 导入种子数据
//!
//! ### `router` - 路由
//! - 按方法和路径分发到 `QuestionFlow`
//! - 组装 JSON 响应、错误响应和 CORS 头
//! - 记录每个请求的方法、路径和状态码
//!
//! ## 层次关系
//!
//! ```text
//! server (监听、连接)
//!     ↓
//! router (处理单个 HTTP 请求)
//!     ↓
//! workflow::QuestionFlow (校验 + 用例)
//!     ↓
//! services (能力层：pagination / search / quiz)
//!     ↓
//! infrastructure (基础设施：StorageGateway)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层创建存储网关
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：只做分发和响应组装，不做具体业务判断

pub mod router;
pub mod server;

// 重新导出主要类型
pub use router::{dispatch, dispatch_with_rng, handle_request, Reply};
pub use server::{serve, App};
