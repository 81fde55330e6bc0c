//! 请求体结构
//!
//! 前端提交的整数字段可能是数字也可能是数字字符串（如下拉框选中的分类 ID），
//! 这里统一宽松解析为 `Option<i64>`。

use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::error::{ApiError, ApiResult};
use crate::services::saturating_parse_int;

/// `POST /questions` 请求体：带 `searchTerm` 时为搜索，否则为新建题目
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionsPayload {
    #[serde(rename = "searchTerm", default)]
    pub search_term: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_page")]
    pub page: Option<i64>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    pub category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    pub difficulty: Option<i64>,
}

impl QuestionsPayload {
    /// 非空搜索词；空串和缺失都视为"不是搜索"
    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref().filter(|term| !term.is_empty())
    }
}

/// `POST /quizzes` 请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizPayload {
    #[serde(default)]
    pub previous_questions: Option<Vec<i64>>,
    #[serde(default)]
    pub quiz_category: Option<QuizCategory>,
}

/// 测验分类，`id` 为 0 或缺失表示"全部"
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizCategory {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    pub id: Option<i64>,
}

impl QuizPayload {
    /// 要限定的分类 ID，`None` 表示全部分类
    pub fn category_id(&self) -> Option<i64> {
        self.quiz_category
            .as_ref()
            .and_then(|c| c.id)
            .filter(|id| *id != 0)
    }

    pub fn previous_questions(&self) -> &[i64] {
        self.previous_questions.as_deref().unwrap_or(&[])
    }
}

/// 解析必须为非空 JSON 对象的请求体
pub fn parse_object_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let value = parse_json(body)?;
    match &value {
        JsonValue::Object(map) if !map.is_empty() => {}
        _ => return Err(ApiError::bad_request("invalid body JSON")),
    }
    decode(value)
}

/// 解析可以为空的请求体，空体或 `null` 时得到默认值
pub fn parse_optional_body<T: DeserializeOwned + Default>(body: &[u8]) -> ApiResult<T> {
    if is_blank(body) {
        return Ok(T::default());
    }
    let value = parse_json(body)?;
    match &value {
        JsonValue::Null => Ok(T::default()),
        JsonValue::Object(_) => decode(value),
        _ => Err(ApiError::bad_request("invalid body JSON")),
    }
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

fn parse_json(body: &[u8]) -> ApiResult<JsonValue> {
    if is_blank(body) {
        return Err(ApiError::bad_request("invalid body JSON"));
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("请求体 JSON 解析失败: {}", e);
        ApiError::BadRequest(None)
    })
}

fn decode<T: DeserializeOwned>(value: JsonValue) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::bad_request(e.to_string()))
}

// Helper function to deserialize an integer given as number or numeric string
fn deserialize_lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientIntVisitor { saturate: false })
}

// Same as above, but out-of-range integers saturate so they behave as a page past the end
fn deserialize_lenient_page<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientIntVisitor { saturate: true })
}

struct LenientIntVisitor {
    saturate: bool,
}

impl<'de> Visitor<'de> for LenientIntVisitor {
    type Value = Option<i64>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer or a string containing an integer")
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Some(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match i64::try_from(value) {
            Ok(v) => Ok(Some(v)),
            Err(_) if self.saturate => Ok(Some(i64::MAX)),
            Err(_) => Err(E::custom(format!("integer {} is out of range", value))),
        }
    }

    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if value.fract() != 0.0 || !value.is_finite() {
            return Err(E::custom(format!("expected an integer, got {}", value)));
        }
        if self.saturate || value.abs() < i64::MAX as f64 {
            // `as` 转换在越界时饱和
            Ok(Some(value as i64))
        } else {
            Err(E::custom(format!("integer {} is out of range", value)))
        }
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let parsed = if self.saturate {
            saturating_parse_int(trimmed)
        } else {
            trimmed.parse::<i64>().ok()
        };
        parsed
            .map(Some)
            .ok_or_else(|| E::custom(format!("expected an integer, got {:?}", value)))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(None)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(None)
    }
}
