// ==========================================
// 辅导排课系统 - 领域层
// ==========================================
// 职责: 实体与值类型定义, 不含数据访问
// ==========================================

pub mod audit;
pub mod settings;
pub mod slot;
pub mod student;
pub mod teacher;

// 重导出核心实体
pub use audit::{AuditLogEntry, AuditPayload};
pub use settings::Settings;
pub use slot::{Assignment, AssignmentLoad, Slot, SlotSeat};
pub use student::Student;
pub use teacher::{Skill, Teacher};
