// ==========================================
// 辅导排课系统 - 教师指派核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (人工最终控制权)
// 职责: 候选教师推荐 + 指派事务管理
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则 (纯函数, 无 I/O)
pub mod engine;

// API 层 - 业务接口
pub mod api;

// 数据库基础设施（连接初始化/PRAGMA 统一/内嵌 schema）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Assignment, AssignmentLoad, AuditLogEntry, AuditPayload, Settings, Skill, Slot, SlotSeat,
    Student, Teacher,
};

// 引擎
pub use engine::{
    CandidateFilter, CandidateScorer, FilterVerdicts, RejectionReason, ScoreBreakdown,
};

// API
pub use api::{
    ApiError, ApiResult, AssignmentApi, AssignmentRecord, Candidate, RecommendApi,
    RecommendationResult,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "辅导排课系统";
