// ==========================================
// RecommendApi - 候选教师推荐服务
// ==========================================
// 职责: 对目标时段跑 过滤 → 打分 → 排序 全流程,
//       并聚合被排除教师的原因直方图
// 红线: 只读; 从不修改教师/指派/可用标记状态
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::Slot;
use crate::engine::{CandidateFilter, CandidateScorer, FilterVerdicts, RejectionReason, ScoreBreakdown};
use crate::repository::{
    AssignmentRepository, SettingsRepository, SlotRepository, TeacherRepository,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// Candidate - 合格候选
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub teacher_id: String,         // 教师ID
    pub teacher_name: String,       // 姓名 (展示用)
    pub score: f64,                 // 总分
    pub breakdown: ScoreBreakdown,  // 打分明细与追踪
    pub verdicts: FilterVerdicts,   // 硬约束判定集 (全真)
}

// ==========================================
// RecommendationResult - 推荐结果
// ==========================================
// candidates 按总分降序, 同分按 teacher_id 升序 (全序且稳定)
// rejection_histogram 用 BTreeMap 保证迭代顺序确定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub slot_id: String,
    pub candidates: Vec<Candidate>,
    pub rejection_histogram: BTreeMap<String, u32>,
}

// ==========================================
// RecommendApi
// ==========================================
pub struct RecommendApi {
    teacher_repo: Arc<TeacherRepository>,
    slot_repo: Arc<SlotRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    settings_repo: Arc<SettingsRepository>,
}

impl RecommendApi {
    /// 创建新的推荐服务实例
    pub fn new(
        teacher_repo: Arc<TeacherRepository>,
        slot_repo: Arc<SlotRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        settings_repo: Arc<SettingsRepository>,
    ) -> Self {
        Self {
            teacher_repo,
            slot_repo,
            assignment_repo,
            settings_repo,
        }
    }

    /// 从共享连接创建 (种子工具/测试用)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self::new(
            Arc::new(TeacherRepository::new(conn.clone())),
            Arc::new(SlotRepository::new(conn.clone())),
            Arc::new(AssignmentRepository::new(conn.clone())),
            Arc::new(SettingsRepository::new(conn)),
        )
    }

    /// 对目标时段推荐候选教师
    ///
    /// # 算法
    /// 1. 时段无落座学生 → 直接返回空候选 + no_students 桶
    /// 2. 遍历全部在职教师: 过滤 → 通过则打分入候选,
    ///    否则每个为假的判定计入直方图一次
    /// 3. 排序: 总分降序, 同分按 teacher_id 升序
    ///
    /// # 返回
    /// - Ok(RecommendationResult): 排好序的候选与排除直方图
    /// - Err(ApiError::NotFound): 时段不存在
    pub fn recommend(&self, slot_id: &str) -> ApiResult<RecommendationResult> {
        if slot_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("时段ID不能为空".to_string()));
        }

        let slot = self
            .slot_repo
            .find_by_id(slot_id)?
            .ok_or_else(|| ApiError::NotFound(format!("时段 {} 不存在", slot_id)))?;

        let mut histogram: BTreeMap<String, u32> = BTreeMap::new();

        // 无落座学生: 没有打分对象, 不逐教师评估
        if slot.seats.is_empty() {
            tracing::debug!(slot_id, "推荐短路: 时段无落座学生");
            histogram.insert(RejectionReason::NoStudents.as_str().to_string(), 1);
            return Ok(RecommendationResult {
                slot_id: slot_id.to_string(),
                candidates: vec![],
                rejection_histogram: histogram,
            });
        }

        let settings = self.settings_repo.get()?;
        let teachers = self.teacher_repo.find_active()?;
        let student_ids: Vec<String> =
            slot.seats.iter().map(|s| s.student_id.clone()).collect();

        let mut candidates = Vec::new();
        for teacher in &teachers {
            let load = self.assignment_repo.current_load(&teacher.teacher_id)?;
            let verdicts = CandidateFilter::evaluate(&slot, teacher, load);

            if verdicts.is_eligible() {
                let previously_taught = self.assignment_repo.count_previously_taught(
                    &teacher.teacher_id,
                    &student_ids,
                    &slot.slot_id,
                )?;
                let breakdown =
                    CandidateScorer::score(&slot, teacher, load, previously_taught, &settings);
                candidates.push(Candidate {
                    teacher_id: teacher.teacher_id.clone(),
                    teacher_name: teacher.name.clone(),
                    score: breakdown.total,
                    breakdown,
                    verdicts,
                });
            } else {
                for reason in verdicts.rejection_reasons() {
                    *histogram.entry(reason.as_str().to_string()).or_insert(0) += 1;
                }
            }
        }

        Self::sort_candidates(&mut candidates);

        tracing::info!(
            slot_id,
            candidate_count = candidates.len(),
            rejected_buckets = histogram.len(),
            "推荐完成"
        );

        Ok(RecommendationResult {
            slot_id: slot_id.to_string(),
            candidates,
            rejection_histogram: histogram,
        })
    }

    /// 总分降序, 同分按 teacher_id 升序 — 对相同输入重复调用顺序不变
    fn sort_candidates(candidates: &mut [Candidate]) {
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.teacher_id.cmp(&b.teacher_id))
        });
    }

    /// 目标时段聚合视图 (调用方展示用)
    pub fn get_slot(&self, slot_id: &str) -> ApiResult<Option<Slot>> {
        Ok(self.slot_repo.find_by_id(slot_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Skill, Teacher};
    use std::collections::HashMap;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO slot (slot_id) VALUES ('MON-0');
            INSERT INTO slot (slot_id) VALUES ('TUE-3');
            INSERT INTO slot (slot_id) VALUES ('WED-1');
            INSERT INTO student (student_id, name, grade) VALUES ('S1', '学生一', 7);
            INSERT INTO student (student_id, name, grade) VALUES ('S2', '学生二', 9);
            INSERT INTO slot_seat (slot_id, student_id, subject, grade) VALUES ('MON-0', 'S1', 'English', 7);
            INSERT INTO slot_seat (slot_id, student_id, subject, grade) VALUES ('MON-0', 'S2', 'English', 9);
            INSERT INTO slot_seat (slot_id, student_id, subject, grade) VALUES ('TUE-3', 'S1', 'English', 7);
            "#,
        )
        .unwrap();
        Arc::new(Mutex::new(conn))
    }

    fn make_teacher(teacher_id: &str, allow_pair: bool) -> Teacher {
        Teacher {
            teacher_id: teacher_id.to_string(),
            name: format!("教师{}", teacher_id),
            cap_week_slots: 10,
            cap_students: 5,
            allow_pair,
            active: true,
            skills: vec![Skill {
                teacher_id: teacher_id.to_string(),
                subject: "English".to_string(),
                grade_min: 1,
                grade_max: 12,
            }],
            availability: HashMap::from([
                ("MON-0".to_string(), true),
                ("TUE-3".to_string(), true),
            ]),
        }
    }

    fn insert_teachers(conn: &Arc<Mutex<Connection>>, teachers: &[Teacher]) {
        let repo = TeacherRepository::new(conn.clone());
        for t in teachers {
            repo.insert(t).unwrap();
        }
    }

    #[test]
    fn test_recommend_not_found_slot() {
        let conn = setup_test_db();
        let api = RecommendApi::from_connection(conn);
        let err = api.recommend("ghost").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_recommend_empty_slot_short_circuits() {
        let conn = setup_test_db();
        insert_teachers(&conn, &[make_teacher("T1", true)]);
        let api = RecommendApi::from_connection(conn);

        let result = api.recommend("WED-1").unwrap();
        assert!(result.candidates.is_empty());
        assert_eq!(result.rejection_histogram.get("no_students"), Some(&1));
        assert_eq!(result.rejection_histogram.len(), 1);
    }

    // 场景 C: 不接受一对二的教师被排除, 接受者入选
    #[test]
    fn test_pair_slot_filters_and_scores() {
        let conn = setup_test_db();
        insert_teachers(
            &conn,
            &[make_teacher("T1", false), make_teacher("T2", true)],
        );
        let api = RecommendApi::from_connection(conn);

        let result = api.recommend("MON-0").unwrap();
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].teacher_id, "T2");
        assert_eq!(
            result.rejection_histogram.get("does_not_allow_pair"),
            Some(&1)
        );
        // grade_diff_weight × (1 - 2/6)
        let breakdown = &result.candidates[0].breakdown;
        assert!((breakdown.grade_diff_term - (1.0 - 2.0 / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_ranking_prefers_underused_and_ties_by_id() {
        let conn = setup_test_db();
        insert_teachers(
            &conn,
            &[
                make_teacher("T3", true),
                make_teacher("T1", true),
                make_teacher("T2", true),
            ],
        );

        // T3 已有一个指派 → 负载项更低
        {
            let guard = conn.lock().unwrap();
            guard
                .execute(
                    "INSERT INTO assignment (slot_id, teacher_id, assigned_by, assigned_at) VALUES ('TUE-3', 'T3', 'A1', '2026-02-10 09:00:00')",
                    [],
                )
                .unwrap();
        }

        let api = RecommendApi::from_connection(conn);
        let result = api.recommend("MON-0").unwrap();

        let ids: Vec<&str> = result
            .candidates
            .iter()
            .map(|c| c.teacher_id.as_str())
            .collect();
        // T3: 负载项 0.9 + 续教 (教过 S1, 1/2) 0.5 → 领先
        // T1/T2: 负载项 1.0, 无续教 → 同分, 按 id 升序
        assert_eq!(ids, vec!["T3", "T1", "T2"]);
        assert!(result.candidates[0].score > result.candidates[1].score);
        assert!(
            (result.candidates[1].score - result.candidates[2].score).abs() < 1e-9
        );
    }

    // 排名确定性: 相同输入重复调用结果完全一致
    #[test]
    fn test_recommend_is_deterministic() {
        let conn = setup_test_db();
        insert_teachers(
            &conn,
            &[
                make_teacher("T1", true),
                make_teacher("T2", true),
                make_teacher("T3", true),
            ],
        );
        let api = RecommendApi::from_connection(conn);

        let first = api.recommend("MON-0").unwrap();
        let second = api.recommend("MON-0").unwrap();

        let first_ids: Vec<&str> =
            first.candidates.iter().map(|c| c.teacher_id.as_str()).collect();
        let second_ids: Vec<&str> =
            second.candidates.iter().map(|c| c.teacher_id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
        assert_eq!(first.rejection_histogram, second.rejection_histogram);
    }

    // 排除计数: 每个为假的判定逐教师记一次
    #[test]
    fn test_rejection_accounting() {
        let conn = setup_test_db();
        let mut t1 = make_teacher("T1", false); // 不接受一对二
        t1.availability.remove("MON-0"); // 且本时段不可用
        let mut t2 = make_teacher("T2", false); // 仅不接受一对二
        t2.skills[0].grade_max = 8; // 且年级段不覆盖 S2(9年级)
        let t3 = make_teacher("T3", true); // 合格
        insert_teachers(&conn, &[t1, t2, t3]);

        let api = RecommendApi::from_connection(conn);
        let result = api.recommend("MON-0").unwrap();

        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.rejection_histogram.get("no_availability"), Some(&1));
        assert_eq!(
            result.rejection_histogram.get("does_not_allow_pair"),
            Some(&2)
        );
        assert_eq!(
            result.rejection_histogram.get("cannot_teach_subjects"),
            Some(&1)
        );
        // 桶内计数总和 = 含该假判定的教师数 (T1: 2项, T2: 2项)
        let total: u32 = result.rejection_histogram.values().sum();
        assert_eq!(total, 4);
    }

    // 只读性: recommend 前后指派/可用标记不变
    #[test]
    fn test_recommend_is_read_only() {
        let conn = setup_test_db();
        insert_teachers(&conn, &[make_teacher("T1", true)]);
        let api = RecommendApi::from_connection(conn.clone());

        api.recommend("MON-0").unwrap();

        let guard = conn.lock().unwrap();
        let assignments: i64 = guard
            .query_row("SELECT COUNT(*) FROM assignment", [], |r| r.get(0))
            .unwrap();
        let available: i64 = guard
            .query_row(
                "SELECT COUNT(*) FROM availability WHERE available = 1",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(assignments, 0);
        assert_eq!(available, 2); // T1 的 MON-0 / TUE-3 声明可用未被动过
    }
}
