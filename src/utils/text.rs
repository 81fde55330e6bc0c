/// 忽略大小写的字面子串匹配
///
/// 两侧都按 Unicode 规则转小写后比较，`term` 中的任何字符（`%`、`_`、`*` 等）
/// 都只代表其本身。
pub fn contains_ignore_case(text: &str, term: &str) -> bool {
    text.to_lowercase().contains(&term.to_lowercase())
}
