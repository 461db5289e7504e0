// ==========================================
// SupplySight 库存驾驶舱 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,将数据接口/仓储错误转换为用户可读的错误消息
// 约定: 后端拒绝的消息原样保留,由视图层作为错误通知展示
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::error::GatewayError;
use crate::repository::error::RepositoryError;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入校验错误（不发起远程调用）
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 操作校验失败（带全部违规项）
    #[error("操作校验失败: {reason}")]
    ActionValidationError {
        reason: String,
        violations: Vec<ValidationViolation>,
    },

    // ==========================================
    // 远程错误
    // ==========================================
    /// 后端拒绝（权威校验,例如并发修改导致库存不足）
    #[error("{message}")]
    RemoteRejected { operation: String, message: String },

    #[error("远程服务状态异常: status={status}")]
    RemoteStatus { status: u16, body: String },

    #[error("网络错误: {0}")]
    TransportError(String),

    #[error("响应解析失败: {0}")]
    DecodeError(String),

    // ==========================================
    // 数据访问错误（离线沙箱 / 配置库）
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 错误代码（面向调用方的稳定标识）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::ActionValidationError { .. } => "ACTION_VALIDATION_ERROR",
            ApiError::RemoteRejected { .. } => "REMOTE_REJECTED",
            ApiError::RemoteStatus { .. } => "REMOTE_STATUS",
            ApiError::TransportError(_) => "TRANSPORT_ERROR",
            ApiError::DecodeError(_) => "DECODE_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }

    /// 是否为提交前的输入校验错误
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidInput(_) | ApiError::ActionValidationError { .. }
        )
    }

    /// 展示给用户的消息
    ///
    /// 校验失败时逐条列出违规原因
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ActionValidationError { violations, .. } if !violations.is_empty() => {
                violations
                    .iter()
                    .map(|v| v.reason.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            }
            ApiError::InvalidInput(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

// ==========================================
// 从 GatewayError 转换
// ==========================================
impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(msg) => ApiError::TransportError(msg),
            GatewayError::HttpStatus { status, body } => ApiError::RemoteStatus { status, body },
            GatewayError::Rejected {
                operation,
                messages,
            } => ApiError::RemoteRejected {
                operation,
                message: messages.join("; "),
            },
            GatewayError::MissingData { operation } => {
                ApiError::DecodeError(format!("{} 响应缺少数据", operation))
            }
            GatewayError::Decode(msg) => ApiError::DecodeError(msg),
            GatewayError::Repository(err) => ApiError::from(err),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::BusinessRuleViolation(msg) => ApiError::RemoteRejected {
                operation: "sandbox".to_string(),
                message: msg,
            },
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::ImportError(msg) => ApiError::InternalError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验违规详情
// ==========================================

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// 违规类型（QTY_NOT_POSITIVE / TARGET_MISSING / ...）
    pub violation_type: String,
    /// 产品ID
    pub product_id: String,
    /// 违规原因
    pub reason: String,
    /// 额外信息（可选）
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_keeps_backend_message() {
        let err: ApiError = GatewayError::Rejected {
            operation: "TransferStock".to_string(),
            messages: vec!["Insufficient stock for transfer".to_string()],
        }
        .into();
        assert_eq!(err.code(), "REMOTE_REJECTED");
        assert_eq!(err.to_string(), "Insufficient stock for transfer");
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_validation_user_message_lists_violations() {
        let err = ApiError::ActionValidationError {
            reason: "2 violations".to_string(),
            violations: vec![
                ValidationViolation {
                    violation_type: "QTY_NOT_POSITIVE".to_string(),
                    product_id: "P-1".to_string(),
                    reason: "a".to_string(),
                    details: None,
                },
                ValidationViolation {
                    violation_type: "TARGET_MISSING".to_string(),
                    product_id: "P-1".to_string(),
                    reason: "b".to_string(),
                    details: None,
                },
            ],
        };
        assert_eq!(err.user_message(), "a; b");
        assert!(err.is_input_error());
    }

    #[test]
    fn test_transport_and_decode_mapping() {
        let err: ApiError = GatewayError::Transport("connection refused".to_string()).into();
        assert_eq!(err.code(), "TRANSPORT_ERROR");

        let err: ApiError = GatewayError::MissingData {
            operation: "GetProducts".to_string(),
        }
        .into();
        assert_eq!(err.code(), "DECODE_ERROR");
    }
}
