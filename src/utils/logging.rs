/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

/// 记录程序启动信息
///
/// # 参数
/// - `bind_address`: 监听地址
/// - `gateway_kind`: 存储网关类型
pub fn log_startup(bind_address: &str, gateway_kind: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 Trivia API 启动");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 监听地址: http://{}", bind_address);
    info!("🗄️ 存储网关: {}", gateway_kind);
    info!("{}", "=".repeat(60));
}

/// 记录种子数据导入结果
pub fn log_seeded(inserted: usize, total: usize) {
    info!("✓ 种子题目导入完成: {}/{}", inserted, total);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
