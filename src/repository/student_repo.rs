// ==========================================
// StudentRepository - 学生仓储
// ==========================================
// 红线: Repository 不做业务逻辑, 只做数据映射
// 范围: student / student_subject / student_ng_teacher 三表
// ==========================================

use crate::domain::Student;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct StudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentRepository {
    /// 创建新的学生仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入学生及其科目、NG 名单
    pub fn insert(&self, student: &Student) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO student (student_id, name, grade, requires_solo, active) VALUES (?, ?, ?, ?, ?)",
            params![
                student.student_id,
                student.name,
                student.grade,
                student.requires_solo,
                student.active,
            ],
        )?;

        for subject in &student.subjects {
            tx.execute(
                "INSERT INTO student_subject (student_id, subject) VALUES (?, ?)",
                params![student.student_id, subject],
            )?;
        }

        for teacher_id in &student.ng_teacher_ids {
            tx.execute(
                "INSERT INTO student_ng_teacher (student_id, teacher_id) VALUES (?, ?)",
                params![student.student_id, teacher_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 向学生 NG 名单追加教师
    pub fn add_ng_teacher(&self, student_id: &str, teacher_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO student_ng_teacher (student_id, teacher_id) VALUES (?, ?)",
            params![student_id, teacher_id],
        )?;
        Ok(())
    }

    /// 查询单个学生 (含科目与 NG 名单)
    pub fn find_by_id(&self, student_id: &str) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;

        let student = conn
            .query_row(
                "SELECT student_id, name, grade, requires_solo, active FROM student WHERE student_id = ?1",
                params![student_id],
                |row| {
                    Ok(Student {
                        student_id: row.get(0)?,
                        name: row.get(1)?,
                        grade: row.get(2)?,
                        requires_solo: row.get(3)?,
                        active: row.get(4)?,
                        subjects: vec![],
                        ng_teacher_ids: vec![],
                    })
                },
            );

        let mut student = match student {
            Ok(s) => s,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut subject_stmt = conn
            .prepare("SELECT subject FROM student_subject WHERE student_id = ?1 ORDER BY subject")?;
        student.subjects = subject_stmt
            .query_map(params![student_id], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        let mut ng_stmt = conn.prepare(
            "SELECT teacher_id FROM student_ng_teacher WHERE student_id = ?1 ORDER BY teacher_id",
        )?;
        student.ng_teacher_ids = ng_stmt
            .query_map(params![student_id], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        Ok(Some(student))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO teacher (teacher_id, name, cap_week_slots, cap_students) VALUES ('T9', 'NG对象', 10, 5)",
            [],
        )
        .unwrap();
        Arc::new(Mutex::new(conn))
    }

    fn make_student(student_id: &str) -> Student {
        Student {
            student_id: student_id.to_string(),
            name: format!("学生{}", student_id),
            grade: 8,
            requires_solo: false,
            active: true,
            subjects: vec!["English".to_string(), "Math".to_string()],
            ng_teacher_ids: vec![],
        }
    }

    #[test]
    fn test_insert_and_find_by_id() {
        let conn = setup_test_db();
        let repo = StudentRepository::new(conn);

        repo.insert(&make_student("S1")).unwrap();

        let found = repo.find_by_id("S1").unwrap().unwrap();
        assert_eq!(found.grade, 8);
        assert_eq!(found.subjects, vec!["English", "Math"]);
        assert!(found.ng_teacher_ids.is_empty());
    }

    #[test]
    fn test_find_missing_returns_none() {
        let conn = setup_test_db();
        let repo = StudentRepository::new(conn);
        assert!(repo.find_by_id("ghost").unwrap().is_none());
    }

    #[test]
    fn test_add_ng_teacher() {
        let conn = setup_test_db();
        let repo = StudentRepository::new(conn);

        repo.insert(&make_student("S1")).unwrap();
        repo.add_ng_teacher("S1", "T9").unwrap();

        let found = repo.find_by_id("S1").unwrap().unwrap();
        assert!(found.is_ng_teacher("T9"));
        assert!(!found.is_ng_teacher("T1"));
    }
}
