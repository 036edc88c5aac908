// ==========================================
// SlotRepository - 时段仓储
// ==========================================
// 红线: Repository 不做业务逻辑, 只做数据映射
// 范围: slot / slot_seat 两表; 读取时座位连带学生 NG 名单
// ==========================================

use crate::domain::{Slot, SlotSeat};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct SlotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SlotRepository {
    /// 创建新的时段仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建时段
    pub fn insert(&self, slot_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO slot (slot_id) VALUES (?1)", params![slot_id])?;
        Ok(())
    }

    /// 学生落座 (座位数上限=2 由管理端校验, 此处只做映射)
    pub fn seat_student(
        &self,
        slot_id: &str,
        student_id: &str,
        subject: &str,
        grade: i32,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO slot_seat (slot_id, student_id, subject, grade) VALUES (?, ?, ?, ?)",
            params![slot_id, student_id, subject, grade],
        )?;
        Ok(())
    }

    /// 时段是否存在
    pub fn exists(&self, slot_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        Ok(Self::exists_tx(&conn, slot_id)?)
    }

    /// 时段是否存在 (事务内版本)
    pub fn exists_tx(conn: &Connection, slot_id: &str) -> rusqlite::Result<bool> {
        let found: Option<bool> = conn
            .query_row(
                "SELECT 1 FROM slot WHERE slot_id = ?1",
                params![slot_id],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }

    /// 查询时段 (含座位与每位学生的 NG 名单)
    pub fn find_by_id(&self, slot_id: &str) -> RepositoryResult<Option<Slot>> {
        let conn = self.get_conn()?;

        if !Self::exists_tx(&conn, slot_id)? {
            return Ok(None);
        }

        let mut seat_stmt = conn.prepare(
            "SELECT student_id, subject, grade FROM slot_seat WHERE slot_id = ?1 ORDER BY student_id",
        )?;
        let mut seats: Vec<SlotSeat> = seat_stmt
            .query_map(params![slot_id], |row| {
                Ok(SlotSeat {
                    student_id: row.get(0)?,
                    subject: row.get(1)?,
                    grade: row.get(2)?,
                    ng_teacher_ids: vec![],
                })
            })?
            .collect::<rusqlite::Result<_>>()?;

        let mut ng_stmt = conn.prepare(
            "SELECT teacher_id FROM student_ng_teacher WHERE student_id = ?1 ORDER BY teacher_id",
        )?;
        for seat in &mut seats {
            seat.ng_teacher_ids = ng_stmt
                .query_map(params![seat.student_id], |row| row.get(0))?
                .collect::<rusqlite::Result<_>>()?;
        }

        Ok(Some(Slot {
            slot_id: slot_id.to_string(),
            seats,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO teacher (teacher_id, name, cap_week_slots, cap_students) VALUES ('T1', '教师一', 10, 5);
            INSERT INTO student (student_id, name, grade) VALUES ('S1', '学生一', 7);
            INSERT INTO student (student_id, name, grade) VALUES ('S2', '学生二', 9);
            INSERT INTO student_ng_teacher (student_id, teacher_id) VALUES ('S2', 'T1');
            "#,
        )
        .unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_insert_and_exists() {
        let conn = setup_test_db();
        let repo = SlotRepository::new(conn);

        repo.insert("MON-0").unwrap();
        assert!(repo.exists("MON-0").unwrap());
        assert!(!repo.exists("TUE-3").unwrap());
    }

    #[test]
    fn test_find_by_id_empty_slot() {
        let conn = setup_test_db();
        let repo = SlotRepository::new(conn);

        repo.insert("MON-0").unwrap();
        let slot = repo.find_by_id("MON-0").unwrap().unwrap();
        assert_eq!(slot.seat_count(), 0);
    }

    #[test]
    fn test_find_by_id_with_seats_and_ng() {
        let conn = setup_test_db();
        let repo = SlotRepository::new(conn);

        repo.insert("MON-0").unwrap();
        repo.seat_student("MON-0", "S1", "English", 7).unwrap();
        repo.seat_student("MON-0", "S2", "English", 9).unwrap();

        let slot = repo.find_by_id("MON-0").unwrap().unwrap();
        assert!(slot.is_pair_slot());
        assert_eq!(slot.grade_span(), 2);
        assert_eq!(slot.seats[1].student_id, "S2");
        assert_eq!(slot.seats[1].ng_teacher_ids, vec!["T1"]);
    }

    #[test]
    fn test_find_missing_returns_none() {
        let conn = setup_test_db();
        let repo = SlotRepository::new(conn);
        assert!(repo.find_by_id("ghost").unwrap().is_none());
    }
}
