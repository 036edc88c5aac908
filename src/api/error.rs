// ==========================================
// 辅导排课系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型, 转换Repository错误为调用方可处理的错误
// 约定: 硬约束不通过不是错误; 这里只表达基础设施失败与调用方误用
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用方误用
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// change/unassign 要求时段当前有指派
    #[error("时段 {slot_id} 当前没有指派教师")]
    NoTeacherAssigned { slot_id: String },

    // ==========================================
    // 事务性失败 (均已回滚, 无半应用状态)
    // ==========================================
    /// 审计操作人引用完整性失败 → 整个事务回滚
    #[error("引用完整性失败: {0}")]
    ReferentialIntegrity(String),

    /// 同一时段并发操作冲突; 由调用方决定是否重试
    #[error("并发冲突: {0}")]
    ConcurrencyConflict(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为调用方可处理的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} {} 不存在", entity, id))
            }
            RepositoryError::ForeignKeyViolation(msg) => ApiError::ReferentialIntegrity(msg),
            RepositoryError::ConcurrencyConflict(msg) => ApiError::ConcurrencyConflict(msg),
            RepositoryError::LockError(msg)
            | RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
        }
    }
}

// rusqlite 错误统一先经 RepositoryError 分类
impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::from(RepositoryError::from(err))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
