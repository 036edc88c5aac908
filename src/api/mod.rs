// ==========================================
// 辅导排课系统 - API 层
// ==========================================
// 职责: 面向调用方 (UI/应用层) 的业务接口
// 组成: 推荐服务 (只读) + 指派事务管理器 (读写)
// ==========================================

pub mod assignment_api;
pub mod error;
pub mod recommend_api;

// 重导出核心接口
pub use assignment_api::{AssignmentApi, AssignmentRecord};
pub use error::{ApiError, ApiResult};
pub use recommend_api::{Candidate, RecommendApi, RecommendationResult};
