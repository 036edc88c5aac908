// ==========================================
// 辅导排课系统 - 候选打分引擎 (软约束)
// ==========================================
// 职责: 对通过硬约束的教师计算加权分与可读追踪
// 红线: 无状态、无副作用、无 I/O
// 约定: 权重通过 Settings 参数显式注入, 打分为输入的纯函数
// ==========================================

use crate::domain::{AssignmentLoad, Settings, Slot, Teacher};
use serde::{Deserialize, Serialize};

/// 年级跨度归一化上限 (固定常数, 非配置项)
///
/// 一对二座位间年级差超过 6 视为最大惩罚
pub const MAX_GRADE_SPAN: i32 = 6;

// ==========================================
// ScoreBreakdown - 打分明细
// ==========================================
// trace 依次为: 负载项、连续性项、年级差项、总分
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub load_term: f64,        // 负载均衡项
    pub continuity_term: f64,  // 续教连续性项
    pub grade_diff_term: f64,  // 年级差项
    pub total: f64,            // 三项之和
    pub trace: Vec<String>,    // 可读追踪 (展示给最终用户)
}

// ==========================================
// CandidateScorer - 纯函数工具类
// ==========================================
pub struct CandidateScorer;

impl CandidateScorer {
    /// 计算软约束得分
    ///
    /// # 规则
    /// - 负载项 = load_weight × (1 - 已指派时段数 / cap_week_slots)
    ///   利用率越低得分越高 (负载均衡偏置)
    /// - 连续性项 = continuity_weight × (曾被该教师教过的座位数 / 座位总数)
    ///   无座位时为 0
    /// - 年级差项: 座位数 ≤ 1 → 直接取 grade_diff_weight;
    ///   否则 grade_diff_weight × (1 - min(跨度, 6) / 6)
    ///
    /// # 参数
    /// - slot: 目标时段 (含落座学生)
    /// - teacher: 候选教师 (cap_week_slots > 0 由 schema 保证)
    /// - load: 该教师当前负载
    /// - previously_taught: 座位学生中曾被该教师教过的人数
    /// - settings: 权重配置 (显式注入)
    pub fn score(
        slot: &Slot,
        teacher: &Teacher,
        load: AssignmentLoad,
        previously_taught: usize,
        settings: &Settings,
    ) -> ScoreBreakdown {
        let mut trace = Vec::with_capacity(4);

        // 负载项
        let utilization = load.slot_count as f64 / teacher.cap_week_slots as f64;
        let load_term = settings.load_weight * (1.0 - utilization);
        trace.push(format!(
            "load: {:.3} (assigned={}/{}, weight={})",
            load_term, load.slot_count, teacher.cap_week_slots, settings.load_weight
        ));

        // 连续性项
        let seat_count = slot.seat_count();
        let continuity_ratio = if seat_count == 0 {
            0.0
        } else {
            previously_taught as f64 / seat_count as f64
        };
        let continuity_term = settings.continuity_weight * continuity_ratio;
        trace.push(format!(
            "continuity: {:.3} (taught={}/{}, weight={})",
            continuity_term, previously_taught, seat_count, settings.continuity_weight
        ));

        // 年级差项
        let grade_diff_term = if seat_count <= 1 {
            trace.push(format!(
                "grade_diff: {:.3} (single seat, weight={})",
                settings.grade_diff_weight, settings.grade_diff_weight
            ));
            settings.grade_diff_weight
        } else {
            let span = slot.grade_span().min(MAX_GRADE_SPAN);
            let term =
                settings.grade_diff_weight * (1.0 - span as f64 / MAX_GRADE_SPAN as f64);
            trace.push(format!(
                "grade_diff: {:.3} (span={}, weight={})",
                term,
                slot.grade_span(),
                settings.grade_diff_weight
            ));
            term
        };

        let total = load_term + continuity_term + grade_diff_term;
        trace.push(format!("total: {:.3}", total));

        ScoreBreakdown {
            load_term,
            continuity_term,
            grade_diff_term,
            total,
            trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Skill, SlotSeat};
    use std::collections::HashMap;

    const EPS: f64 = 1e-9;

    fn make_teacher(cap_week_slots: i32) -> Teacher {
        Teacher {
            teacher_id: "T1".to_string(),
            name: "教师一".to_string(),
            cap_week_slots,
            cap_students: 5,
            allow_pair: true,
            active: true,
            skills: vec![Skill {
                teacher_id: "T1".to_string(),
                subject: "Math".to_string(),
                grade_min: 1,
                grade_max: 12,
            }],
            availability: HashMap::new(),
        }
    }

    fn seat(student_id: &str, grade: i32) -> SlotSeat {
        SlotSeat {
            student_id: student_id.to_string(),
            subject: "English".to_string(),
            grade,
            ng_teacher_ids: vec![],
        }
    }

    fn make_slot(seats: Vec<SlotSeat>) -> Slot {
        Slot {
            slot_id: "MON-0".to_string(),
            seats,
        }
    }

    #[test]
    fn test_load_term_rewards_underused_teacher() {
        let teacher = make_teacher(10);
        let slot = make_slot(vec![seat("S1", 8)]);
        let settings = Settings::default();

        let idle = CandidateScorer::score(
            &slot,
            &teacher,
            AssignmentLoad { slot_count: 0, student_count: 0 },
            0,
            &settings,
        );
        let busy = CandidateScorer::score(
            &slot,
            &teacher,
            AssignmentLoad { slot_count: 8, student_count: 4 },
            0,
            &settings,
        );

        assert!((idle.load_term - 1.0).abs() < EPS);
        assert!((busy.load_term - 0.2).abs() < EPS);
        assert!(idle.total > busy.total);
    }

    #[test]
    fn test_continuity_term_ratio() {
        let teacher = make_teacher(10);
        let slot = make_slot(vec![seat("S1", 7), seat("S2", 7)]);
        let mut settings = Settings::default();
        settings.continuity_weight = 2.0;

        let breakdown = CandidateScorer::score(
            &slot,
            &teacher,
            AssignmentLoad::default(),
            1, // 两座位中教过一个
            &settings,
        );
        assert!((breakdown.continuity_term - 1.0).abs() < EPS);
    }

    #[test]
    fn test_single_seat_full_grade_diff_term() {
        let teacher = make_teacher(10);
        let slot = make_slot(vec![seat("S1", 8)]);
        let mut settings = Settings::default();
        settings.grade_diff_weight = 3.0;

        let breakdown =
            CandidateScorer::score(&slot, &teacher, AssignmentLoad::default(), 0, &settings);
        assert!((breakdown.grade_diff_term - 3.0).abs() < EPS);
    }

    // 场景 C: 年级 7/9 的一对二 → grade_diff_weight × (1 - 2/6)
    #[test]
    fn test_pair_slot_grade_diff_penalty() {
        let teacher = make_teacher(10);
        let slot = make_slot(vec![seat("S1", 7), seat("S2", 9)]);
        let settings = Settings::default();

        let breakdown =
            CandidateScorer::score(&slot, &teacher, AssignmentLoad::default(), 0, &settings);
        assert!((breakdown.grade_diff_term - (1.0 - 2.0 / 6.0)).abs() < EPS);
    }

    #[test]
    fn test_grade_span_clamped_at_six() {
        let teacher = make_teacher(10);
        let slot = make_slot(vec![seat("S1", 2), seat("S2", 12)]); // 跨度 10 → 按 6 截断
        let settings = Settings::default();

        let breakdown =
            CandidateScorer::score(&slot, &teacher, AssignmentLoad::default(), 0, &settings);
        assert!(breakdown.grade_diff_term.abs() < EPS);
    }

    #[test]
    fn test_trace_order_and_total() {
        let teacher = make_teacher(10);
        let slot = make_slot(vec![seat("S1", 7), seat("S2", 9)]);
        let settings = Settings::default();

        let breakdown = CandidateScorer::score(
            &slot,
            &teacher,
            AssignmentLoad { slot_count: 5, student_count: 3 },
            2,
            &settings,
        );

        // trace 顺序: load → continuity → grade_diff → total
        assert_eq!(breakdown.trace.len(), 4);
        assert!(breakdown.trace[0].starts_with("load:"));
        assert!(breakdown.trace[1].starts_with("continuity:"));
        assert!(breakdown.trace[2].starts_with("grade_diff:"));
        assert!(breakdown.trace[3].starts_with("total:"));

        let expected =
            breakdown.load_term + breakdown.continuity_term + breakdown.grade_diff_term;
        assert!((breakdown.total - expected).abs() < EPS);
    }

    #[test]
    fn test_zero_weights_give_zero_total() {
        let teacher = make_teacher(10);
        let slot = make_slot(vec![seat("S1", 8)]);
        let settings = Settings {
            load_weight: 0.0,
            continuity_weight: 0.0,
            grade_diff_weight: 0.0,
            ..Settings::default()
        };

        let breakdown =
            CandidateScorer::score(&slot, &teacher, AssignmentLoad::default(), 1, &settings);
        assert!(breakdown.total.abs() < EPS);
    }
}
