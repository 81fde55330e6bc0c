use hyper::StatusCode;
use thiserror::Error;

/// 接口错误类型
///
/// 每个变体对应一种 HTTP 错误码，可携带调用方给出的具体信息；
/// 未提供时使用该错误码的默认描述。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 请求体格式错误或字段缺失
    #[error("{}", message_or(.0, "bad request"))]
    BadRequest(Option<String>),
    /// 资源不存在或查询结果为空
    #[error("{}", message_or(.0, "resource not found"))]
    NotFound(Option<String>),
    /// 路由存在但不支持该方法
    #[error("{}", message_or(.0, "method not allowed"))]
    MethodNotAllowed(Option<String>),
    /// 请求体超出大小上限
    #[error("{}", message_or(.0, "payload too large"))]
    PayloadTooLarge(Option<String>),
    /// 存储层写入失败（约束冲突等）
    #[error("{}", message_or(.0, "unprocessable entity"))]
    Unprocessable(Option<String>),
    /// 存储层读取失败
    #[error("{}", message_or(.0, "internal server error"))]
    Internal(Option<String>),
}

fn message_or<'a>(message: &'a Option<String>, default: &'a str) -> &'a str {
    message.as_deref().unwrap_or(default)
}

impl ApiError {
    /// 对应的 HTTP 状态码
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给客户端的错误信息
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(Some(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(Some(message.into()))
    }

    /// 字段为空时的错误
    pub fn blank_field(field: &str) -> Self {
        ApiError::bad_request(format!("{} cannot be blank", field))
    }
}

// ========== 存储层错误 ==========

/// 存储网关错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 违反引用完整性等约束
    #[error("约束冲突: {0}")]
    Constraint(String),
    /// SQLite 底层错误
    #[error("数据库错误: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// 锁已被污染（持锁线程 panic）
    #[error("存储锁已损坏")]
    Poisoned,
}

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StorageError::Poisoned
    }
}

// ========== 便捷转换 ==========

impl ApiError {
    /// 读取路径上的存储错误，统一为 500
    pub fn storage_read(err: StorageError) -> Self {
        tracing::error!("存储读取失败: {}", err);
        ApiError::Internal(None)
    }

    /// 写入路径（新增/删除）上的存储错误，统一为 422
    pub fn storage_write(err: StorageError) -> Self {
        tracing::warn!("存储写入失败: {}", err);
        ApiError::Unprocessable(None)
    }
}

// ========== Result 类型别名 ==========

/// 接口层结果类型
pub type ApiResult<T> = Result<T, ApiError>;

/// 存储层结果类型
pub type StorageResult<T> = Result<T, StorageError>;
