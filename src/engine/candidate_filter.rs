// ==========================================
// 辅导排课系统 - 候选过滤引擎 (硬约束)
// ==========================================
// 职责: 对 (时段, 教师) 逐项判定硬约束, 输出命名判定集
// 红线: 无状态、无副作用、无 I/O
// 约定: 硬约束不通过是正常业务结果, 以数据表达, 不抛错误
// ==========================================

use crate::domain::{AssignmentLoad, Slot, Teacher};
use serde::{Deserialize, Serialize};

// ==========================================
// FilterVerdicts - 命名判定集
// ==========================================
// 五项全真 → 该教师为合格候选
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterVerdicts {
    pub has_availability: bool,       // 本时段可用标记为真
    pub can_teach_all_subjects: bool, // 能覆盖每个座位的 (科目, 年级)
    pub not_in_ng_list: bool,         // 不在任何座位学生的 NG 名单
    pub allows_pair: bool,            // 一对二时段需教师接受一对二
    pub under_capacity: bool,         // 周时段容量与学生容量均未超
}

impl FilterVerdicts {
    /// 五项判定全真即合格
    pub fn is_eligible(&self) -> bool {
        self.has_availability
            && self.can_teach_all_subjects
            && self.not_in_ng_list
            && self.allows_pair
            && self.under_capacity
    }

    /// 每项为假的判定产生一个排除原因 (多项不通过则逐项计数)
    pub fn rejection_reasons(&self) -> Vec<RejectionReason> {
        let mut reasons = Vec::new();
        if !self.has_availability {
            reasons.push(RejectionReason::NoAvailability);
        }
        if !self.can_teach_all_subjects {
            reasons.push(RejectionReason::CannotTeachSubjects);
        }
        if !self.not_in_ng_list {
            reasons.push(RejectionReason::InNgList);
        }
        if !self.allows_pair {
            reasons.push(RejectionReason::DoesNotAllowPair);
        }
        if !self.under_capacity {
            reasons.push(RejectionReason::OverCapacity);
        }
        reasons
    }
}

// ==========================================
// RejectionReason - 排除原因
// ==========================================
// as_str 即排除直方图的桶键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    NoAvailability,      // 本时段不可用
    CannotTeachSubjects, // 科目/年级段不覆盖
    InNgList,            // 被学生 NG
    DoesNotAllowPair,    // 不接受一对二
    OverCapacity,        // 容量已满
    NoStudents,          // 时段无落座学生 (服务层专用桶)
}

impl RejectionReason {
    /// 转换为直方图桶键
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::NoAvailability => "no_availability",
            RejectionReason::CannotTeachSubjects => "cannot_teach_subjects",
            RejectionReason::InNgList => "in_ng_list",
            RejectionReason::DoesNotAllowPair => "does_not_allow_pair",
            RejectionReason::OverCapacity => "over_capacity",
            RejectionReason::NoStudents => "no_students",
        }
    }
}

// ==========================================
// CandidateFilter - 纯函数工具类
// ==========================================
pub struct CandidateFilter;

impl CandidateFilter {
    /// 逐项判定硬约束
    ///
    /// # 规则
    /// - has_availability: 教师在本时段的可用标记为真
    /// - can_teach_all_subjects: 对每个座位, 存在科目匹配且
    ///   grade_min ≤ 年级 ≤ grade_max 的技能; 空时段恒真
    /// - not_in_ng_list: 任何座位学生的 NG 名单均不含该教师
    /// - allows_pair: 座位数 ≤ 1 恒真; 否则取教师 allow_pair
    /// - under_capacity: 已指派时段数 < cap_week_slots 且
    ///   已指派学生数 + 本时段座位数 ≤ cap_students
    ///
    /// # 参数
    /// - slot: 目标时段 (含落座学生)
    /// - teacher: 候选教师 (含技能与可用标记)
    /// - load: 该教师当前负载
    pub fn evaluate(slot: &Slot, teacher: &Teacher, load: AssignmentLoad) -> FilterVerdicts {
        let has_availability = teacher.is_available(&slot.slot_id);

        let can_teach_all_subjects = slot
            .seats
            .iter()
            .all(|seat| teacher.can_teach(&seat.subject, seat.grade));

        let not_in_ng_list = !slot
            .seats
            .iter()
            .any(|seat| seat.ng_teacher_ids.iter().any(|id| id == &teacher.teacher_id));

        let allows_pair = !slot.is_pair_slot() || teacher.allow_pair;

        let seat_count = slot.seat_count() as i32;
        let under_capacity = load.slot_count < teacher.cap_week_slots
            && load.student_count + seat_count <= teacher.cap_students;

        FilterVerdicts {
            has_availability,
            can_teach_all_subjects,
            not_in_ng_list,
            allows_pair,
            under_capacity,
        }
    }
}
