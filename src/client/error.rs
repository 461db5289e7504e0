// ==========================================
// SupplySight 库存驾驶舱 - 数据接口错误类型
// ==========================================
// 区分: 传输失败 / HTTP 状态异常 / 后端拒绝 / 响应形状不符
// ==========================================

use thiserror::Error;

use crate::repository::error::RepositoryError;

/// 数据接口错误类型
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("网络请求失败: {0}")]
    Transport(String),

    #[error("HTTP 状态异常: status={status}, body={body}")]
    HttpStatus { status: u16, body: String },

    /// 后端拒绝（GraphQL errors[]）,消息原样保留
    #[error("后端拒绝 {operation}: {}", .messages.join("; "))]
    Rejected {
        operation: String,
        messages: Vec<String>,
    },

    #[error("响应缺少数据: {operation}")]
    MissingData { operation: String },

    #[error("响应解析失败: {0}")]
    Decode(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// Result 类型别名
pub type GatewayResult<T> = Result<T, GatewayError>;
