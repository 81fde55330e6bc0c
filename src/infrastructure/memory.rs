//! 内存存储网关

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::infrastructure::gateway::{Deletion, StorageGateway};
use crate::models::question::{Category, NewQuestion, Question};

/// 基于 `BTreeMap` 的内存网关
///
/// BTreeMap 按键有序，列表天然是 ID 升序。ID 单调递增，删除后不复用。
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<i64, Category>,
    questions: BTreeMap<i64, Question>,
    last_question_id: i64,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置分类
    pub fn with_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let gateway = Self::new();
        {
            let mut tables = gateway.tables.write().unwrap_or_else(|e| e.into_inner());
            for category in categories {
                tables.categories.insert(category.id, category);
            }
        }
        gateway
    }

    /// 以指定 ID 写入题目（测试夹具用，绕过自增 ID）
    ///
    /// 分类引用规则与 `insert_question` 相同。
    pub fn insert_with_id(&self, question: Question) -> StorageResult<()> {
        let mut tables = self.tables.write()?;
        if !tables.categories.contains_key(&question.category) {
            return Err(StorageError::Constraint(format!(
                "分类 {} 不存在",
                question.category
            )));
        }
        tables.last_question_id = tables.last_question_id.max(question.id);
        tables.questions.insert(question.id, question);
        Ok(())
    }
}

impl StorageGateway for MemoryGateway {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn list_questions(&self) -> StorageResult<Vec<Question>> {
        let tables = self.tables.read()?;
        Ok(tables.questions.values().cloned().collect())
    }

    fn list_questions_by_category(&self, category_id: i64) -> StorageResult<Vec<Question>> {
        let tables = self.tables.read()?;
        Ok(tables
            .questions
            .values()
            .filter(|q| q.category == category_id)
            .cloned()
            .collect())
    }

    fn get_category(&self, id: i64) -> StorageResult<Option<Category>> {
        let tables = self.tables.read()?;
        Ok(tables.categories.get(&id).cloned())
    }

    fn list_categories(&self) -> StorageResult<Vec<Category>> {
        let tables = self.tables.read()?;
        Ok(tables.categories.values().cloned().collect())
    }

    fn upsert_category(&self, category: Category) -> StorageResult<()> {
        let mut tables = self.tables.write()?;
        tables.categories.insert(category.id, category);
        Ok(())
    }

    fn insert_question(&self, question: NewQuestion) -> StorageResult<i64> {
        let mut tables = self.tables.write()?;
        if !tables.categories.contains_key(&question.category) {
            return Err(StorageError::Constraint(format!(
                "分类 {} 不存在",
                question.category
            )));
        }

        tables.last_question_id += 1;
        let id = tables.last_question_id;
        tables.questions.insert(id, question.with_id(id));
        Ok(id)
    }

    fn delete_question(&self, id: i64) -> StorageResult<Deletion> {
        let mut tables = self.tables.write()?;
        match tables.questions.remove(&id) {
            Some(_) => Ok(Deletion::Deleted),
            None => Ok(Deletion::NotFound),
        }
    }
}
