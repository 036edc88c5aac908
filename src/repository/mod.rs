// ==========================================
// 辅导排课系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑, 只做数据映射
// 职责: 提供数据访问接口, 屏蔽数据库细节
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

pub mod assignment_repo;
pub mod audit_log_repo;
pub mod error;
pub mod settings_repo;
pub mod slot_repo;
pub mod student_repo;
pub mod teacher_repo;
pub mod user_repo;

// 重导出核心仓储
pub use assignment_repo::AssignmentRepository;
pub use audit_log_repo::AuditLogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use settings_repo::SettingsRepository;
pub use slot_repo::SlotRepository;
pub use student_repo::StudentRepository;
pub use teacher_repo::TeacherRepository;
pub use user_repo::UserRepository;
