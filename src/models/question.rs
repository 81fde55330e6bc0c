use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// 所属分类 ID
    pub category: i64,
    /// 难度（正整数）
    pub difficulty: i64,
}

/// 待插入的题目（尚未分配 ID）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

impl NewQuestion {
    /// 分配 ID 后转换为完整题目
    pub fn with_id(self, id: i64) -> Question {
        Question {
            id,
            question: self.question,
            answer: self.answer,
            category: self.category,
            difficulty: self.difficulty,
        }
    }
}

/// 题目分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// 将分类列表转换为 `{id: type}` 映射，供前端直接按 ID 取名称
pub fn categories_by_id(categories: &[Category]) -> BTreeMap<i64, String> {
    categories
        .iter()
        .map(|c| (c.id, c.kind.clone()))
        .collect()
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断题干以便日志显示（最多40个字符）
        let preview = crate::utils::logging::truncate_text(&self.question, 40);
        write!(f, "#{} {} [分类: {}]", self.id, preview, self.category)
    }
}
