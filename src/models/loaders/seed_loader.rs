use crate::infrastructure::StorageGateway;
use crate::models::question::{Category, NewQuestion};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 种子数据文件结构
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub questions: Vec<NewQuestion>,
}

/// 从 TOML 文件加载种子数据
pub async fn load_seed_file(seed_file_path: &Path) -> Result<SeedData> {
    let content = fs::read_to_string(seed_file_path)
        .await
        .with_context(|| format!("无法读取种子文件: {}", seed_file_path.display()))?;

    let seed: SeedData = toml::from_str(&content)
        .with_context(|| format!("无法解析种子文件: {}", seed_file_path.display()))?;

    tracing::info!(
        "已加载种子文件 {}: {} 个分类, {} 道题目",
        seed_file_path.display(),
        seed.categories.len(),
        seed.questions.len()
    );

    Ok(seed)
}

/// 将种子数据写入存储网关
///
/// 分类按给定 ID 写入（已存在则覆盖名称），题目由网关分配 ID。
/// 单道题目写入失败只记录警告，不中断整体导入。
///
/// # 返回
/// 成功写入的题目数量
pub fn seed_gateway(gateway: &dyn StorageGateway, seed: SeedData) -> Result<usize> {
    for category in seed.categories {
        gateway
            .upsert_category(category.clone())
            .with_context(|| format!("无法写入分类: {} ({})", category.kind, category.id))?;
    }

    let mut inserted = 0;
    for question in seed.questions {
        let preview = crate::utils::logging::truncate_text(&question.question, 40);
        match gateway.insert_question(question) {
            Ok(id) => {
                tracing::debug!("种子题目 #{} 已写入: {}", id, preview);
                inserted += 1;
            }
            Err(e) => {
                tracing::warn!("种子题目写入失败 ({}): {}", preview, e);
            }
        }
    }

    Ok(inserted)
}
