// ==========================================
// 辅导排课系统 - 引擎层
// ==========================================
// 红线: 引擎层为纯函数, 无状态、无副作用、无 I/O
// 职责: 硬约束过滤 + 软约束打分
// ==========================================

pub mod candidate_filter;
pub mod candidate_scorer;

// 重导出核心引擎
pub use candidate_filter::{CandidateFilter, FilterVerdicts, RejectionReason};
pub use candidate_scorer::{CandidateScorer, ScoreBreakdown, MAX_GRADE_SPAN};
