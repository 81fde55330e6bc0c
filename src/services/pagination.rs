//! 分页引擎 - 业务能力层
//!
//! 只负责"切出第 N 页"，不关心数据从哪来、空页如何对外呈现。

/// 每页题目数量
pub const QUESTIONS_PER_PAGE: usize = 10;

/// 一页结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// 本页条目
    pub items: Vec<T>,
    /// 未分页前的总数
    pub total: usize,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 计算第 `page` 页在长度为 `total` 的集合中的下标区间 `[start, end)`
///
/// 页码从 1 开始。`page <= 0`、`page_size == 0` 或超出最后一页时返回 `None`。
pub fn page_bounds(page: i64, page_size: usize, total: usize) -> Option<(usize, usize)> {
    if page < 1 || page_size == 0 {
        return None;
    }

    let index = usize::try_from(page - 1).ok()?;
    let start = index.checked_mul(page_size)?;
    if start >= total {
        return None;
    }

    let end = start.saturating_add(page_size).min(total);
    Some((start, end))
}

/// 对已排序的集合分页
///
/// # 参数
/// - `items`: 已按调用方要求排序的完整集合
/// - `page`: 页码（从 1 开始）
/// - `page_size`: 每页条数
///
/// # 返回
/// 返回本页条目和集合总数；页码越界时条目为空，总数仍为真实值
pub fn paginate<T>(items: Vec<T>, page: i64, page_size: usize) -> Page<T> {
    let total = items.len();
    let items = match page_bounds(page, page_size, total) {
        Some((start, end)) => items.into_iter().skip(start).take(end - start).collect(),
        None => Vec::new(),
    };
    Page { items, total }
}

/// 解析页码参数
///
/// 缺失或不是整数时返回 1；0、负数和超出 `i64` 的数字原样（饱和）返回，由 `paginate` 产出空页。
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(saturating_parse_int).unwrap_or(1)
}

/// 解析十进制整数（可带前导 `-`），超出 `i64` 范围时饱和到 `i64::MAX` / `i64::MIN`
///
/// 不是整数时返回 `None`。
pub fn saturating_parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    match trimmed.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) if negative => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}
