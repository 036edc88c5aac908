// ==========================================
// TeacherRepository - 教师仓储
// ==========================================
// 红线: Repository 不做业务逻辑, 只做数据映射
// 范围: teacher / teacher_skill / availability 三表的聚合读写
// ==========================================

use crate::domain::{Skill, Teacher};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct TeacherRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TeacherRepository {
    /// 创建新的教师仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作 (管理端 CRUD / 种子工具用)
    // ==========================================

    /// 插入教师及其技能、声明可用时段
    pub fn insert(&self, teacher: &Teacher) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO teacher (teacher_id, name, cap_week_slots, cap_students, allow_pair, active)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                teacher.teacher_id,
                teacher.name,
                teacher.cap_week_slots,
                teacher.cap_students,
                teacher.allow_pair,
                teacher.active,
            ],
        )?;

        for skill in &teacher.skills {
            tx.execute(
                "INSERT INTO teacher_skill (teacher_id, subject, grade_min, grade_max) VALUES (?, ?, ?, ?)",
                params![teacher.teacher_id, skill.subject, skill.grade_min, skill.grade_max],
            )?;
        }

        for (slot_id, available) in &teacher.availability {
            tx.execute(
                "INSERT INTO availability (teacher_id, slot_id, available) VALUES (?, ?, ?)",
                params![teacher.teacher_id, slot_id, available],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 设置教师声明的可用时段 (管理端维护; 指派侧翻转走事务帮助函数)
    pub fn set_declared_availability(
        &self,
        teacher_id: &str,
        slot_id: &str,
        available: bool,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO availability (teacher_id, slot_id, available) VALUES (?1, ?2, ?3)
            ON CONFLICT (teacher_id, slot_id) DO UPDATE SET available = ?3
            "#,
            params![teacher_id, slot_id, available],
        )?;
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询单个教师 (含技能与可用标记)
    pub fn find_by_id(&self, teacher_id: &str) -> RepositoryResult<Option<Teacher>> {
        let conn = self.get_conn()?;
        let teachers = Self::load_teachers(&conn, Some(teacher_id), false)?;
        Ok(teachers.into_iter().next())
    }

    /// 查询所有在职教师 (含技能与可用标记), 按 teacher_id 升序
    pub fn find_active(&self) -> RepositoryResult<Vec<Teacher>> {
        let conn = self.get_conn()?;
        Self::load_teachers(&conn, None, true)
    }

    /// 查询教师姓名 (指派审计载荷用); 不存在返回 NotFound
    pub fn find_name_tx(conn: &Connection, teacher_id: &str) -> RepositoryResult<String> {
        conn.query_row(
            "SELECT name FROM teacher WHERE teacher_id = ?1",
            params![teacher_id],
            |row| row.get::<_, String>(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Teacher".to_string(),
                id: teacher_id.to_string(),
            },
            other => other.into(),
        })
    }

    // ==========================================
    // 内部: 聚合装配
    // ==========================================

    fn load_teachers(
        conn: &Connection,
        teacher_id: Option<&str>,
        active_only: bool,
    ) -> RepositoryResult<Vec<Teacher>> {
        let mut sql = String::from(
            "SELECT teacher_id, name, cap_week_slots, cap_students, allow_pair, active FROM teacher",
        );
        match (teacher_id, active_only) {
            (Some(_), _) => sql.push_str(" WHERE teacher_id = ?1"),
            (None, true) => sql.push_str(" WHERE active = 1"),
            (None, false) => {}
        }
        sql.push_str(" ORDER BY teacher_id ASC");

        let mut stmt = conn.prepare(&sql)?;
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<Teacher> {
            Ok(Teacher {
                teacher_id: row.get(0)?,
                name: row.get(1)?,
                cap_week_slots: row.get(2)?,
                cap_students: row.get(3)?,
                allow_pair: row.get(4)?,
                active: row.get(5)?,
                skills: vec![],
                availability: HashMap::new(),
            })
        };

        let rows: Vec<Teacher> = match teacher_id {
            Some(id) => stmt
                .query_map(params![id], map_row)?
                .collect::<rusqlite::Result<_>>()?,
            None => stmt
                .query_map([], map_row)?
                .collect::<rusqlite::Result<_>>()?,
        };

        let mut skill_stmt = conn.prepare(
            "SELECT subject, grade_min, grade_max FROM teacher_skill WHERE teacher_id = ?1 ORDER BY subject",
        )?;
        let mut avail_stmt =
            conn.prepare("SELECT slot_id, available FROM availability WHERE teacher_id = ?1")?;

        let mut teachers = Vec::with_capacity(rows.len());
        for mut teacher in rows {
            teacher.skills = skill_stmt
                .query_map(params![teacher.teacher_id], |row| {
                    Ok(Skill {
                        teacher_id: teacher.teacher_id.clone(),
                        subject: row.get(0)?,
                        grade_min: row.get(1)?,
                        grade_max: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<_>>()?;

            teacher.availability = avail_stmt
                .query_map(params![teacher.teacher_id], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
                })?
                .collect::<rusqlite::Result<_>>()?;

            teachers.push(teacher);
        }

        Ok(teachers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        // availability.slot_id 有外键, 测试先备好时段
        conn.execute("INSERT INTO slot (slot_id) VALUES ('MON-0')", [])
            .unwrap();
        Arc::new(Mutex::new(conn))
    }

    fn make_teacher(teacher_id: &str, active: bool) -> Teacher {
        Teacher {
            teacher_id: teacher_id.to_string(),
            name: format!("教师{}", teacher_id),
            cap_week_slots: 10,
            cap_students: 5,
            allow_pair: true,
            active,
            skills: vec![Skill {
                teacher_id: teacher_id.to_string(),
                subject: "Math".to_string(),
                grade_min: 1,
                grade_max: 9,
            }],
            availability: HashMap::from([("MON-0".to_string(), true)]),
        }
    }

    #[test]
    fn test_insert_and_find_by_id_aggregates() {
        let conn = setup_test_db();
        let repo = TeacherRepository::new(conn);

        repo.insert(&make_teacher("T1", true)).unwrap();

        let found = repo.find_by_id("T1").unwrap().unwrap();
        assert_eq!(found.name, "教师T1");
        assert_eq!(found.skills.len(), 1);
        assert_eq!(found.skills[0].subject, "Math");
        assert!(found.is_available("MON-0"));
    }

    #[test]
    fn test_find_active_excludes_inactive_and_sorts() {
        let conn = setup_test_db();
        let repo = TeacherRepository::new(conn);

        repo.insert(&make_teacher("T2", true)).unwrap();
        repo.insert(&make_teacher("T1", true)).unwrap();
        repo.insert(&make_teacher("T3", false)).unwrap();

        let active = repo.find_active().unwrap();
        let ids: Vec<&str> = active.iter().map(|t| t.teacher_id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2"]);
    }

    #[test]
    fn test_set_declared_availability_upserts() {
        let conn = setup_test_db();
        let repo = TeacherRepository::new(conn.clone());

        repo.insert(&make_teacher("T1", true)).unwrap();
        {
            let guard = conn.lock().unwrap();
            guard
                .execute("INSERT INTO slot (slot_id) VALUES ('TUE-3')", [])
                .unwrap();
        }

        repo.set_declared_availability("T1", "TUE-3", true).unwrap();
        assert!(repo.find_by_id("T1").unwrap().unwrap().is_available("TUE-3"));

        repo.set_declared_availability("T1", "TUE-3", false).unwrap();
        assert!(!repo.find_by_id("T1").unwrap().unwrap().is_available("TUE-3"));
    }

    #[test]
    fn test_find_name_tx_not_found() {
        let conn = setup_test_db();
        let guard = conn.lock().unwrap();
        let err = TeacherRepository::find_name_tx(&guard, "ghost").unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
