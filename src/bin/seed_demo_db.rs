// ==========================================
// 辅导排课系统 - 演示数据库种子工具
// ==========================================
// 用途: 建一个小型演示库, 跑一轮推荐并指派,
//       便于开发期快速验证全链路
// 用法: seed_demo_db [db_path]   (默认 ./tutor_assign_demo.db)
// ==========================================

use rusqlite::Connection;
use std::error::Error;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tutor_assign::db::open_and_init;
use tutor_assign::domain::{Settings, Skill, Student, Teacher};
use tutor_assign::logging;
use tutor_assign::repository::{
    SettingsRepository, SlotRepository, StudentRepository, TeacherRepository, UserRepository,
};
use tutor_assign::{AssignmentApi, RecommendApi};

const DEFAULT_DB_PATH: &str = "./tutor_assign_demo.db";

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
    if Path::new(&db_path).exists() {
        std::fs::remove_file(&db_path)?;
        tracing::info!(db_path, "已删除旧演示库");
    }

    tracing::info!("==================================================");
    tracing::info!("{} - 演示数据库种子工具", tutor_assign::APP_NAME);
    tracing::info!("系统版本: {}", tutor_assign::VERSION);
    tracing::info!("==================================================");

    let conn = Arc::new(Mutex::new(open_and_init(&db_path)?));
    seed(&conn)?;

    // 跑一轮推荐
    let recommend_api = RecommendApi::from_connection(conn.clone());
    let result = recommend_api.recommend("MON-0")?;

    tracing::info!("时段 MON-0 候选教师 ({} 人):", result.candidates.len());
    for candidate in &result.candidates {
        tracing::info!(
            "  {} ({}) score={:.3}",
            candidate.teacher_name,
            candidate.teacher_id,
            candidate.score
        );
        for line in &candidate.breakdown.trace {
            tracing::debug!("    {}", line);
        }
    }
    for (bucket, count) in &result.rejection_histogram {
        tracing::info!("  排除 {}: {} 人", bucket, count);
    }

    // 取首位候选执行指派
    if let Some(top) = result.candidates.first() {
        let assignment_api = AssignmentApi::new(conn);
        let record = assignment_api.assign_teacher("MON-0", &top.teacher_id, "A1")?;
        tracing::info!(
            "已指派 {} → MON-0 (操作人 {})",
            record.teacher_name,
            record.assigned_by
        );
    }

    tracing::info!(db_path, "种子完成");
    Ok(())
}

fn seed(conn: &Arc<Mutex<Connection>>) -> Result<(), Box<dyn Error>> {
    let user_repo = UserRepository::new(conn.clone());
    user_repo.insert("A1", "教务管理员")?;

    let slot_repo = SlotRepository::new(conn.clone());
    for slot_id in ["MON-0", "MON-1", "TUE-0", "WED-2"] {
        slot_repo.insert(slot_id)?;
    }

    let student_repo = StudentRepository::new(conn.clone());
    student_repo.insert(&Student {
        student_id: "S1".to_string(),
        name: "佐藤".to_string(),
        grade: 7,
        requires_solo: false,
        active: true,
        subjects: vec!["English".to_string()],
        ng_teacher_ids: vec![],
    })?;
    student_repo.insert(&Student {
        student_id: "S2".to_string(),
        name: "铃木".to_string(),
        grade: 9,
        requires_solo: false,
        active: true,
        subjects: vec!["English".to_string(), "Math".to_string()],
        ng_teacher_ids: vec!["T3".to_string()],
    })?;

    // MON-0 为一对二时段 (7/9 年级, 同科目)
    slot_repo.seat_student("MON-0", "S1", "English", 7)?;
    slot_repo.seat_student("MON-0", "S2", "English", 9)?;
    slot_repo.seat_student("TUE-0", "S2", "Math", 9)?;

    let teacher_repo = TeacherRepository::new(conn.clone());
    let all_slots_available = |teacher_id: &str| -> Teacher {
        Teacher {
            teacher_id: teacher_id.to_string(),
            name: String::new(),
            cap_week_slots: 8,
            cap_students: 6,
            allow_pair: true,
            active: true,
            skills: vec![],
            availability: ["MON-0", "MON-1", "TUE-0", "WED-2"]
                .iter()
                .map(|s| (s.to_string(), true))
                .collect(),
        }
    };

    let mut t1 = all_slots_available("T1");
    t1.name = "高桥".to_string();
    t1.skills = vec![
        Skill {
            teacher_id: "T1".to_string(),
            subject: "English".to_string(),
            grade_min: 1,
            grade_max: 12,
        },
        Skill {
            teacher_id: "T1".to_string(),
            subject: "Math".to_string(),
            grade_min: 1,
            grade_max: 9,
        },
    ];
    teacher_repo.insert(&t1)?;

    let mut t2 = all_slots_available("T2");
    t2.name = "田中".to_string();
    t2.allow_pair = false;
    t2.skills = vec![Skill {
        teacher_id: "T2".to_string(),
        subject: "English".to_string(),
        grade_min: 1,
        grade_max: 12,
    }];
    teacher_repo.insert(&t2)?;

    let mut t3 = all_slots_available("T3");
    t3.name = "伊藤".to_string();
    t3.skills = vec![Skill {
        teacher_id: "T3".to_string(),
        subject: "English".to_string(),
        grade_min: 1,
        grade_max: 12,
    }];
    teacher_repo.insert(&t3)?;

    let settings_repo = SettingsRepository::new(conn.clone());
    settings_repo.update(&Settings::default())?;

    tracing::info!("种子数据写入完成: 教师 3, 学生 2, 时段 4");
    Ok(())
}
