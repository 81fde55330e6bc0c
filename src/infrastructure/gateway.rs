//! 存储网关 - 基础设施层
//!
//! 持有题目与分类两张表的读写能力，不认识分页、搜索排名或测验规则。

use crate::error::StorageResult;
use crate::models::question::{Category, NewQuestion, Question};
use crate::utils::text::contains_ignore_case;

/// 删除结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// 已删除
    Deleted,
    /// 目标不存在，未做任何修改
    NotFound,
}

/// 存储网关
///
/// 职责：
/// - 所有列表按 ID 升序返回
/// - 插入时保证分类引用有效（违反时返回 `StorageError::Constraint`）
/// - 插入/删除是原子的
///
/// 实现必须是 `Send + Sync`，由服务端在所有连接间共享。
pub trait StorageGateway: Send + Sync {
    /// 网关类型名称（仅用于日志）
    fn kind(&self) -> &'static str;

    /// 全部题目，按 ID 升序
    fn list_questions(&self) -> StorageResult<Vec<Question>>;

    /// 指定分类下的题目，按 ID 升序
    fn list_questions_by_category(&self, category_id: i64) -> StorageResult<Vec<Question>>;

    /// 题干包含 `term`（忽略大小写、字面匹配）的题目，按 ID 升序
    ///
    /// 默认实现在 `list_questions()` 的结果上过滤。
    fn search_questions(&self, term: &str) -> StorageResult<Vec<Question>> {
        let questions = self.list_questions()?;
        Ok(questions
            .into_iter()
            .filter(|q| contains_ignore_case(&q.question, term))
            .collect())
    }

    /// 按 ID 查询分类
    fn get_category(&self, id: i64) -> StorageResult<Option<Category>>;

    /// 全部分类，按 ID 升序
    fn list_categories(&self) -> StorageResult<Vec<Category>>;

    /// 写入分类（ID 已存在则更新名称）
    fn upsert_category(&self, category: Category) -> StorageResult<()>;

    /// 插入题目并返回分配的 ID
    fn insert_question(&self, question: NewQuestion) -> StorageResult<i64>;

    /// 按 ID 删除题目
    fn delete_question(&self, id: i64) -> StorageResult<Deletion>;
}
