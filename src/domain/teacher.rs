// ==========================================
// 辅导排课系统 - 教师领域模型
// ==========================================
// 对齐: teacher / teacher_skill / availability 表
// 约束: 教师主数据由管理端 CRUD 维护,
//       引擎侧只读（availability 由指派事务翻转除外）
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Skill - 可授科目
// ==========================================
// 每位教师每科目一行, 带闭区间年级段
// 对齐: teacher_skill 表, UNIQUE(teacher_id, subject)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub teacher_id: String,     // 教师ID
    pub subject: String,        // 科目
    pub grade_min: i32,         // 最低年级 (含)
    pub grade_max: i32,         // 最高年级 (含)
}

impl Skill {
    /// 判断该技能是否覆盖 (科目, 年级)
    pub fn covers(&self, subject: &str, grade: i32) -> bool {
        self.subject == subject && self.grade_min <= grade && grade <= self.grade_max
    }
}

// ==========================================
// Teacher - 教师
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub teacher_id: String,     // 教师ID
    pub name: String,           // 姓名
    pub cap_week_slots: i32,    // 周时段容量上限 (>0)
    pub cap_students: i32,      // 在读学生容量上限 (>0)
    pub allow_pair: bool,       // 是否接受一对二
    pub active: bool,           // 在职标记

    // ===== 聚合子数据 =====
    pub skills: Vec<Skill>,                 // 可授科目集合
    pub availability: HashMap<String, bool>, // slot_id → 可用标记
}

impl Teacher {
    /// 查询该教师在指定时段的可用标记（无记录视为不可用）
    pub fn is_available(&self, slot_id: &str) -> bool {
        self.availability.get(slot_id).copied().unwrap_or(false)
    }

    /// 判断能否教授 (科目, 年级)
    pub fn can_teach(&self, subject: &str, grade: i32) -> bool {
        self.skills.iter().any(|s| s.covers(subject, grade))
    }
}
