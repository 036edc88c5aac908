// ==========================================
// 辅导排课系统 - 打分权重配置
// ==========================================
// 对齐: settings 表 (单行, CHECK settings_id = 1)
// 约束: 引擎侧只读; 打分函数以参数显式接收,
//       不读全局状态
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Settings - 软约束权重与一对二策略
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ===== 软约束权重 (均为非负) =====
    pub load_weight: f64,        // 负载均衡权重
    pub continuity_weight: f64,  // 续教连续性权重
    pub grade_diff_weight: f64,  // 年级差权重

    // ===== 一对二落座策略 (供管理端落座校验使用) =====
    pub pair_same_subject_required: bool, // 一对二是否要求同科目
    pub pair_max_grade_gap: i32,          // 一对二最大年级差
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            load_weight: 1.0,
            continuity_weight: 1.0,
            grade_diff_weight: 1.0,
            pair_same_subject_required: true,
            pair_max_grade_gap: 2,
        }
    }
}
