//! 路由 - 编排层
//!
//! 把 HTTP 方法和路径映射到 `QuestionFlow` 的用例，并统一组装 JSON 响应和 CORS 头。

use std::convert::Infallible;
use std::sync::Arc;

use hyper::body::HttpBody;
use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, CONTENT_TYPE,
};
use hyper::{Body, Method, Request, Response, StatusCode};
use rand::Rng;
use serde_json::{json, Value as JsonValue};
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::services::parse_page;
use crate::workflow::QuestionFlow;

const ALLOW_ORIGIN: &str = "*";
const ALLOW_HEADERS: &str = "Content-Type,Authorization,true";
const ALLOW_METHODS: &str = "GET,PATCH,POST,DELETE,OPTIONS";

/// 请求体大小上限（字节）
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// 路由结果
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 200 + JSON 响应体
    Json(JsonValue),
    /// 204，预检请求
    NoContent,
}

/// 已识别的路由
enum Route {
    Categories,
    Questions,
    Question(i64),
    CategoryQuestions(i64),
    Quizzes,
}

impl Route {
    /// 按路径段匹配路由，ID 不是整数时视为未知路由
    fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["categories"] => Some(Route::Categories),
            ["questions"] => Some(Route::Questions),
            ["questions", id] => id.parse().ok().map(Route::Question),
            ["categories", id, "questions"] => id.parse().ok().map(Route::CategoryQuestions),
            ["quizzes"] => Some(Route::Quizzes),
            _ => None,
        }
    }
}

/// 取查询串中第一个名为 `name` 的参数（已做百分号解码，`+` 视为空格）
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// 分发请求，测验使用线程本地随机源
pub fn dispatch(
    flow: &QuestionFlow,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: &[u8],
) -> ApiResult<Reply> {
    dispatch_with_rng(flow, method, path, query, body, &mut rand::thread_rng())
}

/// 分发请求
///
/// # 参数
/// - `flow`: 题目接口流程
/// - `method` / `path` / `query`: 请求行
/// - `body`: 已读取的完整请求体
/// - `rng`: 测验选题用的随机源
///
/// # 返回
/// 成功时返回响应体；路径已知但方法不匹配返回 405，未知路径返回 404
pub fn dispatch_with_rng<R: Rng + ?Sized>(
    flow: &QuestionFlow,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: &[u8],
    rng: &mut R,
) -> ApiResult<Reply> {
    if *method == Method::OPTIONS {
        return Ok(Reply::NoContent);
    }

    let route = Route::parse(path).ok_or(ApiError::NotFound(None))?;
    let page = || parse_page(query_param(query, "page").as_deref());

    let payload = match (route, method) {
        (Route::Categories, &Method::GET) => flow.list_categories()?,
        (Route::Questions, &Method::GET) => flow.list_questions(page())?,
        (Route::Questions, &Method::POST) => flow.create_or_search(body)?,
        (Route::Question(id), &Method::DELETE) => flow.delete_question(id)?,
        (Route::CategoryQuestions(id), &Method::GET) => flow.questions_by_category(id, page())?,
        (Route::Quizzes, &Method::POST) => flow.play_quiz(body, rng)?,
        _ => return Err(ApiError::MethodNotAllowed(None)),
    };

    Ok(Reply::Json(payload))
}

/// 错误响应体
pub fn error_body(err: &ApiError) -> JsonValue {
    json!({
        "success": false,
        "error": err.status().as_u16(),
        "message": err.message(),
    })
}

/// 读取请求体，超过 `limit` 字节时返回 413
///
/// `Content-Length` 声明已超限时直接拒绝，不读取任何数据；
/// 否则边读边累计，超限时立即停止。
pub async fn read_body(headers: &HeaderMap, mut body: Body, limit: usize) -> ApiResult<Vec<u8>> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    if let Some(length) = declared {
        if length > limit as u64 {
            warn!("请求体声明长度 {} 超出上限 {}", length, limit);
            return Err(ApiError::PayloadTooLarge(None));
        }
    }

    let mut buffer = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk.map_err(|e| {
            warn!("读取请求体失败: {}", e);
            ApiError::BadRequest(None)
        })?;
        if buffer.len() + chunk.len() > limit {
            warn!("请求体超出上限 {}", limit);
            return Err(ApiError::PayloadTooLarge(None));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

/// hyper 服务函数
///
/// 存储调用是同步的（SQLite 持锁查询），在阻塞线程池中执行。
pub async fn handle_request(
    flow: Arc<QuestionFlow>,
    req: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_string();

    let result = match read_body(&parts.headers, body, MAX_BODY_BYTES).await {
        Ok(bytes) => {
            let method = parts.method.clone();
            let route_path = path.clone();
            let query = parts.uri.query().map(str::to_string);
            tokio::task::spawn_blocking(move || {
                dispatch(&flow, &method, &route_path, query.as_deref(), &bytes)
            })
            .await
            .unwrap_or_else(|e| {
                error!("请求处理任务异常: {}", e);
                Err(ApiError::Internal(None))
            })
        }
        Err(err) => Err(err),
    };

    let response = match result {
        Ok(Reply::Json(body)) => json_response(StatusCode::OK, &body),
        Ok(Reply::NoContent) => empty_response(StatusCode::NO_CONTENT),
        Err(err) => json_response(err.status(), &error_body(&err)),
    };

    info!("{} {} → {}", parts.method, path, response.status().as_u16());
    Ok(response)
}

fn json_response(status: StatusCode, body: &JsonValue) -> Response<Body> {
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(response)
}

fn empty_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    with_cors(response)
}

fn with_cors(mut response: Response<Body>) -> Response<Body> {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{MemoryGateway, StorageGateway};
    use crate::models::question::{Category, NewQuestion};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flow() -> QuestionFlow {
        let gateway = MemoryGateway::with_categories([Category {
            id: 1,
            kind: "Science".to_string(),
        }]);
        gateway
            .insert_with_id(
                NewQuestion {
                    question: "What is the heaviest organ in the human body?".to_string(),
                    answer: "The Liver".to_string(),
                    category: 1,
                    difficulty: 4,
                }
                .with_id(20),
            )
            .unwrap();
        QuestionFlow::new(Arc::new(gateway))
    }

    #[test]
    fn test_query_param() {
        assert_eq!(query_param(Some("page=2"), "page").as_deref(), Some("2"));
        assert_eq!(query_param(Some("a=1&page=3&page=4"), "page").as_deref(), Some("3"));
        assert_eq!(query_param(Some("page"), "page").as_deref(), Some(""));
        assert_eq!(query_param(Some("pages=1"), "page"), None);
        assert_eq!(query_param(None, "page"), None);
    }

    #[test]
    fn test_query_param_decodes() {
        assert_eq!(query_param(Some("page=%32"), "page").as_deref(), Some("2"));
        assert_eq!(query_param(Some("p%61ge=3"), "page").as_deref(), Some("3"));
        assert_eq!(query_param(Some("page=+4"), "page").as_deref(), Some(" 4"));
        assert_eq!(parse_page(query_param(Some("page=+4"), "page").as_deref()), 4);
    }

    #[test]
    fn test_encoded_page_reaches_second_page() {
        let gateway = MemoryGateway::with_categories([Category {
            id: 1,
            kind: "Science".to_string(),
        }]);
        for i in 0..12 {
            gateway
                .insert_question(NewQuestion {
                    question: format!("q{i}"),
                    answer: "a".to_string(),
                    category: 1,
                    difficulty: 1,
                })
                .unwrap();
        }
        let flow = QuestionFlow::new(Arc::new(gateway));
        let reply = dispatch(&flow, &Method::GET, "/questions", Some("page=%32"), b"").unwrap();
        match reply {
            Reply::Json(body) => assert_eq!(body["questions"].as_array().unwrap().len(), 2),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let bytes = read_body(&HeaderMap::new(), Body::from("hello"), 5).await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_read_body_rejects_oversized_stream() {
        let err = read_body(&HeaderMap::new(), Body::from("hello!"), 5)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::PayloadTooLarge(None));
    }

    #[tokio::test]
    async fn test_read_body_rejects_declared_length() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1000000"));
        let err = read_body(&headers, Body::from("{}"), MAX_BODY_BYTES)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::PayloadTooLarge(None));
    }

    #[tokio::test]
    async fn test_oversized_post_is_413() {
        let flow = Arc::new(flow());
        let body = format!(r#"{{"searchTerm": "{}"}}"#, "x".repeat(MAX_BODY_BYTES));
        let req = Request::builder()
            .method(Method::POST)
            .uri("/questions")
            .body(Body::from(body))
            .unwrap();
        let response = handle_request(flow, req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_requests_on_sqlite() {
        let gateway = crate::infrastructure::SqliteGateway::open_in_memory().unwrap();
        gateway
            .upsert_category(Category {
                id: 1,
                kind: "Science".to_string(),
            })
            .unwrap();
        for i in 0..5 {
            gateway
                .insert_question(NewQuestion {
                    question: format!("q{i}"),
                    answer: "a".to_string(),
                    category: 1,
                    difficulty: 1,
                })
                .unwrap();
        }
        let flow = Arc::new(QuestionFlow::new(Arc::new(gateway)));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let flow = flow.clone();
                tokio::spawn(async move {
                    let req = Request::builder()
                        .method(Method::GET)
                        .uri("/questions?page=1")
                        .body(Body::empty())
                        .unwrap();
                    handle_request(flow, req).await.unwrap().status()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), StatusCode::OK);
        }
    }

    #[test]
    fn test_routes() {
        let flow = flow();
        let reply = dispatch(&flow, &Method::GET, "/categories", None, b"").unwrap();
        assert_eq!(
            reply,
            Reply::Json(json!({"success": true, "categories": {"1": "Science"}}))
        );

        assert!(dispatch(&flow, &Method::GET, "/questions/", Some("page=1"), b"").is_ok());
        assert!(dispatch(&flow, &Method::GET, "/categories/1/questions", None, b"").is_ok());
    }

    #[test]
    fn test_unknown_path_and_bad_id() {
        let flow = flow();
        for path in ["/", "/nope", "/questions/abc", "/categories/x/questions", "/questions/1/extra"] {
            assert_eq!(
                dispatch(&flow, &Method::GET, path, None, b"").unwrap_err(),
                ApiError::NotFound(None),
                "{path}"
            );
        }
    }

    #[test]
    fn test_wrong_method() {
        let flow = flow();
        for (method, path) in [
            (Method::POST, "/categories"),
            (Method::PATCH, "/questions"),
            (Method::GET, "/questions/20"),
            (Method::GET, "/quizzes"),
            (Method::DELETE, "/categories/1/questions"),
        ] {
            assert_eq!(
                dispatch(&flow, &method, path, None, b"").unwrap_err(),
                ApiError::MethodNotAllowed(None),
                "{method} {path}"
            );
        }
    }

    #[test]
    fn test_options_preflight() {
        let flow = flow();
        assert_eq!(
            dispatch(&flow, &Method::OPTIONS, "/anything", None, b"").unwrap(),
            Reply::NoContent
        );
    }

    #[test]
    fn test_quiz_with_seeded_rng() {
        let flow = flow();
        let mut rng = StdRng::seed_from_u64(5);
        let reply = dispatch_with_rng(&flow, &Method::POST, "/quizzes", None, b"", &mut rng).unwrap();
        match reply {
            Reply::Json(body) => assert_eq!(body["question"]["id"], 20),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_error_body() {
        let body = error_body(&ApiError::not_found("questions not found"));
        assert_eq!(
            body,
            json!({"success": false, "error": 404, "message": "questions not found"})
        );
        assert_eq!(error_body(&ApiError::MethodNotAllowed(None))["message"], "method not allowed");
    }
}
