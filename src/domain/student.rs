// ==========================================
// 辅导排课系统 - 学生领域模型
// ==========================================
// 对齐: student / student_subject / student_ng_teacher 表
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Student - 学生
// ==========================================
// NG 名单: 该生绝不可被指派的教师集合
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,          // 学生ID
    pub name: String,                // 姓名
    pub grade: i32,                  // 年级 (1-12)
    pub requires_solo: bool,         // 是否要求一对一
    pub active: bool,                // 在读标记

    // ===== 聚合子数据 =====
    pub subjects: Vec<String>,       // 在学科目
    pub ng_teacher_ids: Vec<String>, // NG 教师名单
}

impl Student {
    /// 判断指定教师是否在该生的 NG 名单中
    pub fn is_ng_teacher(&self, teacher_id: &str) -> bool {
        self.ng_teacher_ids.iter().any(|id| id == teacher_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ng_teacher() {
        let student = Student {
            student_id: "S1".to_string(),
            name: "学生一".to_string(),
            grade: 8,
            requires_solo: false,
            active: true,
            subjects: vec!["Math".to_string()],
            ng_teacher_ids: vec!["T3".to_string()],
        };
        assert!(student.is_ng_teacher("T3"));
        assert!(!student.is_ng_teacher("T1"));
    }
}
