//! 题目搜索服务 - 业务能力层
//!
//! 只负责"按题干子串搜索并分页"，不关心空结果如何对外呈现

use crate::error::StorageResult;
use crate::infrastructure::StorageGateway;
use crate::models::question::Question;
use crate::services::pagination::{paginate, Page, QUESTIONS_PER_PAGE};
use crate::utils::text::contains_ignore_case;
use tracing::debug;

/// 搜索题干包含 `term` 的题目
///
/// 匹配规则：忽略大小写、字面子串，不做分词，标点不作为通配符。
/// 调用方负责把空搜索词路由到其他流程，这里不对空串做特殊处理。
///
/// # 参数
/// - `gateway`: 存储网关
/// - `term`: 搜索词
/// - `page`: 页码（从 1 开始）
///
/// # 返回
/// 返回本页命中的题目和命中总数
pub fn search(gateway: &dyn StorageGateway, term: &str, page: i64) -> StorageResult<Page<Question>> {
    debug!("搜索题目 - 搜索词: {:?}, 页码: {}", term, page);

    // 网关可以用自身的检索能力预筛，这里再按字面规则过滤一次
    let matches: Vec<Question> = gateway
        .search_questions(term)?
        .into_iter()
        .filter(|q| contains_ignore_case(&q.question, term))
        .collect();

    debug!("搜索词 {:?} 共命中 {} 道题目", term, matches.len());

    Ok(paginate(matches, page, QUESTIONS_PER_PAGE))
}
