//! 流程层（Workflow）
//!
//! 一个接口请求的完整处理流程：解析请求体 → 校验 → 调用能力层 → 组装响应。

pub mod payload;
pub mod question_flow;

pub use payload::{QuestionsPayload, QuizCategory, QuizPayload};
pub use question_flow::QuestionFlow;
