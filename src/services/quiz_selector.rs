//! 测验选题服务 - 业务能力层
//!
//! 只负责"从候选集中均匀随机抽一道没出过的题"，不保存任何会话状态

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::StorageResult;
use crate::infrastructure::StorageGateway;
use crate::models::question::Question;

/// 候选集：指定分类（或全部分类）中未出现在 `excluded` 里的题目，按 ID 升序
pub fn eligible_questions(
    gateway: &dyn StorageGateway,
    category: Option<i64>,
    excluded: &[i64],
) -> StorageResult<Vec<Question>> {
    let excluded: HashSet<i64> = excluded.iter().copied().collect();
    let candidates = match category {
        Some(category_id) => gateway.list_questions_by_category(category_id)?,
        None => gateway.list_questions()?,
    };

    Ok(candidates
        .into_iter()
        .filter(|q| !excluded.contains(&q.id))
        .collect())
}

/// 抽取一道测验题目
///
/// # 参数
/// - `gateway`: 存储网关
/// - `category`: 分类 ID，`None` 表示全部分类
/// - `excluded`: 本轮已出过的题目 ID
/// - `rng`: 随机源（生产环境用 `thread_rng`，测试中传入固定种子）
///
/// # 返回
/// 候选集非空时返回其中均匀随机的一道题，否则返回 `None`
pub fn select_quiz_question<R: Rng + ?Sized>(
    gateway: &dyn StorageGateway,
    category: Option<i64>,
    excluded: &[i64],
    rng: &mut R,
) -> StorageResult<Option<Question>> {
    let eligible = eligible_questions(gateway, category, excluded)?;
    debug!(
        "测验选题 - 分类: {:?}, 已出题 {} 道, 候选 {} 道",
        category,
        excluded.len(),
        eligible.len()
    );

    Ok(eligible.choose(rng).cloned())
}
