use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// API 错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 设备未找到
    DeviceNotFound(String),
    /// 验证错误
    ValidationError(String),
    /// 内部错误
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::DeviceNotFound(id) => write!(f, "Device not found: {}", id),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::DeviceNotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::ValidationError(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InternalError(ref msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

// 从 mockfab_device::DeviceError 转换
impl From<mockfab_device::DeviceError> for ApiError {
    fn from(err: mockfab_device::DeviceError) -> Self {
        match err {
            mockfab_device::DeviceError::NotFound(id) => ApiError::DeviceNotFound(id),
            mockfab_device::DeviceError::ValidationError(msg) => ApiError::ValidationError(msg),
            // 策略解析失败是程序不变量违例，对外表现为 500
            mockfab_device::DeviceError::StrategyResolution(kind) => {
                ApiError::InternalError(format!("No strategy registered for: {}", kind))
            }
            mockfab_device::DeviceError::InternalError(msg) => ApiError::InternalError(msg),
            mockfab_device::DeviceError::Other(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
