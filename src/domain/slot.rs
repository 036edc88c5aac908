// ==========================================
// 辅导排课系统 - 时段/指派领域模型
// ==========================================
// 对齐: slot / slot_seat / assignment 表
// 术语: 时段ID为“星期×节次”代码, 如 MON-0
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// SlotSeat - 时段内的学生座位
// ==========================================
// 一个时段最多两个座位; 两座位即“一对二时段”
// NG 名单冗余在座位上, 供候选过滤直接使用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSeat {
    pub student_id: String,          // 学生ID
    pub subject: String,             // 本时段授课科目
    pub grade: i32,                  // 学生年级
    pub ng_teacher_ids: Vec<String>, // 该生的 NG 教师名单
}

// ==========================================
// Slot - 周固定时段
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub slot_id: String,        // 时段ID (星期×节次)
    pub seats: Vec<SlotSeat>,   // 已落座学生 (0..=2)
}

impl Slot {
    /// 已落座人数
    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    /// 是否为一对二时段
    pub fn is_pair_slot(&self) -> bool {
        self.seats.len() >= 2
    }

    /// 座位间年级跨度 (max - min); 少于两座位为 0
    pub fn grade_span(&self) -> i32 {
        let grades: Vec<i32> = self.seats.iter().map(|s| s.grade).collect();
        match (grades.iter().min(), grades.iter().max()) {
            (Some(min), Some(max)) => max - min,
            _ => 0,
        }
    }
}

// ==========================================
// Assignment - 指派 (slot ↔ teacher 边)
// ==========================================
// 不变式: 每时段至多一条 (schema 以 slot_id 为主键保证)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub slot_id: String,             // 时段ID
    pub teacher_id: String,          // 教师ID
    pub assigned_by: String,         // 操作人ID
    pub assigned_at: NaiveDateTime,  // 指派时间
}

// ==========================================
// AssignmentLoad - 教师当前负载
// ==========================================
// 用途: 容量判定 (under_capacity) 与负载均衡打分
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AssignmentLoad {
    pub slot_count: i32,     // 已指派时段数
    pub student_count: i32,  // 已指派学生座位总数
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(student_id: &str, grade: i32) -> SlotSeat {
        SlotSeat {
            student_id: student_id.to_string(),
            subject: "Math".to_string(),
            grade,
            ng_teacher_ids: vec![],
        }
    }

    #[test]
    fn test_grade_span_empty_slot() {
        let slot = Slot {
            slot_id: "MON-0".to_string(),
            seats: vec![],
        };
        assert_eq!(slot.grade_span(), 0);
        assert!(!slot.is_pair_slot());
    }

    #[test]
    fn test_grade_span_pair_slot() {
        let slot = Slot {
            slot_id: "MON-0".to_string(),
            seats: vec![seat("S1", 7), seat("S2", 9)],
        };
        assert_eq!(slot.grade_span(), 2);
        assert!(slot.is_pair_slot());
    }
}
