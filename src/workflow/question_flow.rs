//! 题目接口流程 - 流程层
//!
//! 核心职责：把一次请求翻译成能力层调用，并决定结果如何对外呈现
//!
//! - 字段校验先于任何存储调用
//! - 空页、空搜索结果 → `NotFound`
//! - 测验无题可出 → 成功响应，`question` 为 `null`

use std::sync::Arc;

use rand::Rng;
use serde_json::{json, Value as JsonValue};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::infrastructure::{Deletion, StorageGateway};
use crate::models::question::{categories_by_id, Category, NewQuestion};
use crate::services::{paginate, search, select_quiz_question, QUESTIONS_PER_PAGE};
use crate::workflow::payload::{parse_object_body, parse_optional_body, QuestionsPayload, QuizPayload};

/// 题目接口流程
///
/// - 持有存储网关句柄，显式传入每个能力调用
/// - 不持有任何可变状态，可在所有连接间共享
#[derive(Clone)]
pub struct QuestionFlow {
    gateway: Arc<dyn StorageGateway>,
}

impl QuestionFlow {
    /// 创建新的题目接口流程
    pub fn new(gateway: Arc<dyn StorageGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &dyn StorageGateway {
        self.gateway.as_ref()
    }

    /// 全部分类，没有任何分类时返回 404
    fn categories(&self) -> ApiResult<Vec<Category>> {
        let categories = self
            .gateway
            .list_categories()
            .map_err(ApiError::storage_read)?;
        if categories.is_empty() {
            return Err(ApiError::not_found("no category found"));
        }
        Ok(categories)
    }

    /// `GET /categories`
    pub fn list_categories(&self) -> ApiResult<JsonValue> {
        let categories = self.categories()?;
        Ok(json!({
            "success": true,
            "categories": categories_by_id(&categories),
        }))
    }

    /// `GET /questions?page=N`
    pub fn list_questions(&self, page: i64) -> ApiResult<JsonValue> {
        let questions = self
            .gateway
            .list_questions()
            .map_err(ApiError::storage_read)?;
        let current = paginate(questions, page, QUESTIONS_PER_PAGE);

        if current.is_empty() {
            return Err(ApiError::not_found("questions not found"));
        }

        let categories = self.categories()?;

        Ok(json!({
            "success": true,
            "questions": current.items,
            "total_questions": current.total,
            "categories": categories_by_id(&categories),
            "current_category": null,
        }))
    }

    /// `GET /categories/{id}/questions?page=N`
    pub fn questions_by_category(&self, category_id: i64, page: i64) -> ApiResult<JsonValue> {
        self.require_category(category_id)?;

        let questions = self
            .gateway
            .list_questions_by_category(category_id)
            .map_err(ApiError::storage_read)?;
        let current = paginate(questions, page, QUESTIONS_PER_PAGE);

        if current.is_empty() {
            return Err(ApiError::not_found("questions not found"));
        }

        Ok(json!({
            "success": true,
            "questions": current.items,
            "total_questions": current.total,
            "current_category": category_id,
        }))
    }

    /// `DELETE /questions/{id}`
    pub fn delete_question(&self, question_id: i64) -> ApiResult<JsonValue> {
        match self
            .gateway
            .delete_question(question_id)
            .map_err(ApiError::storage_write)?
        {
            Deletion::Deleted => {
                info!("🗑️ 已删除题目 #{}", question_id);
                Ok(json!({
                    "success": true,
                    "deleted": question_id,
                }))
            }
            Deletion::NotFound => Err(ApiError::not_found("question not found")),
        }
    }

    /// `POST /questions`：有搜索词时搜索，否则新建题目
    pub fn create_or_search(&self, body: &[u8]) -> ApiResult<JsonValue> {
        let payload: QuestionsPayload = parse_object_body(body)?;

        match payload.search_term() {
            Some(term) => self.search_questions(term, payload.page.unwrap_or(1)),
            None => self.create_question(payload),
        }
    }

    /// 搜索题目，无结果时返回带搜索词的 404
    pub fn search_questions(&self, term: &str, page: i64) -> ApiResult<JsonValue> {
        let current = search(self.gateway(), term, page).map_err(ApiError::storage_read)?;

        if current.is_empty() {
            return Err(ApiError::not_found(format!(
                "no questions found with term - {}",
                term
            )));
        }

        Ok(json!({
            "success": true,
            "questions": current.items,
            "total_questions": current.total,
            "current_category": null,
        }))
    }

    /// 新建题目
    pub fn create_question(&self, payload: QuestionsPayload) -> ApiResult<JsonValue> {
        let question = validate_new_question(payload)?;
        let preview = crate::utils::logging::truncate_text(&question.question, 40);

        let id = self
            .gateway
            .insert_question(question)
            .map_err(ApiError::storage_write)?;

        info!("✓ 已创建题目 #{}: {}", id, preview);
        Ok(json!({
            "success": true,
            "created": id,
        }))
    }

    /// `POST /quizzes`
    ///
    /// # 参数
    /// - `body`: 请求体，可为空
    /// - `rng`: 随机源
    pub fn play_quiz<R: Rng + ?Sized>(&self, body: &[u8], rng: &mut R) -> ApiResult<JsonValue> {
        let payload: QuizPayload = parse_optional_body(body)?;
        let category = payload.category_id();

        if let Some(category_id) = category {
            self.require_category(category_id)?;
        }

        let question = select_quiz_question(
            self.gateway(),
            category,
            payload.previous_questions(),
            rng,
        )
        .map_err(ApiError::storage_read)?;

        match &question {
            Some(q) => info!("🎲 测验出题: {}", q),
            None => info!("测验题目已用尽 (分类: {:?})", category),
        }

        Ok(json!({
            "success": true,
            "question": question,
        }))
    }

    fn require_category(&self, category_id: i64) -> ApiResult<Category> {
        self.gateway
            .get_category(category_id)
            .map_err(ApiError::storage_read)?
            .ok_or_else(|| ApiError::not_found("category not found"))
    }
}

/// 校验新建题目的字段，任何字段为空时返回 400
fn validate_new_question(payload: QuestionsPayload) -> ApiResult<NewQuestion> {
    let question = payload
        .question
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::blank_field("question"))?;
    let answer = payload
        .answer
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::blank_field("answer"))?;
    let category = payload
        .category
        .filter(|v| *v != 0)
        .ok_or_else(|| ApiError::blank_field("category"))?;
    let difficulty = payload
        .difficulty
        .filter(|v| *v != 0)
        .ok_or_else(|| ApiError::blank_field("difficulty"))?;

    if difficulty < 0 {
        return Err(ApiError::bad_request("difficulty must be a positive integer"));
    }

    Ok(NewQuestion {
        question,
        answer,
        category,
        difficulty,
    })
}
