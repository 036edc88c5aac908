// ==========================================
// AssignmentRepository - 指派/可用标记仓储
// ==========================================
// 红线: Repository 不做业务逻辑, 只做数据映射
// 范围: assignment / availability 两表
// 约定: *_tx 帮助函数接收事务内连接, 由指派事务管理器
//       在同一事务中组合调用
// ==========================================

use crate::domain::{Assignment, AssignmentLoad};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct AssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentRepository {
    /// 创建新的指派仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询时段当前指派
    pub fn find_by_slot(&self, slot_id: &str) -> RepositoryResult<Option<Assignment>> {
        let conn = self.get_conn()?;
        Ok(Self::find_by_slot_tx(&conn, slot_id)?)
    }

    /// 查询时段当前指派 (事务内版本)
    pub fn find_by_slot_tx(
        conn: &Connection,
        slot_id: &str,
    ) -> rusqlite::Result<Option<Assignment>> {
        conn.query_row(
            "SELECT slot_id, teacher_id, assigned_by, assigned_at FROM assignment WHERE slot_id = ?1",
            params![slot_id],
            |row| {
                let ts: String = row.get(3)?;
                Ok(Assignment {
                    slot_id: row.get(0)?,
                    teacher_id: row.get(1)?,
                    assigned_by: row.get(2)?,
                    assigned_at: NaiveDateTime::parse_from_str(&ts, TS_FORMAT)
                        .unwrap_or_default(),
                })
            },
        )
        .optional()
    }

    /// 查询教师当前负载
    ///
    /// # 返回
    /// - slot_count: 已指派时段数
    /// - student_count: 已指派时段中的学生座位总数
    pub fn current_load(&self, teacher_id: &str) -> RepositoryResult<AssignmentLoad> {
        let conn = self.get_conn()?;

        let slot_count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM assignment WHERE teacher_id = ?1",
            params![teacher_id],
            |row| row.get(0),
        )?;

        let student_count: i32 = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM assignment a
            JOIN slot_seat ss ON ss.slot_id = a.slot_id
            WHERE a.teacher_id = ?1
            "#,
            params![teacher_id],
            |row| row.get(0),
        )?;

        Ok(AssignmentLoad {
            slot_count,
            student_count,
        })
    }

    /// 统计指定学生中曾被该教师教过的人数 (续教连续性打分用)
    ///
    /// # 参数
    /// - teacher_id: 教师ID
    /// - student_ids: 目标时段的座位学生
    /// - exclude_slot_id: 排除目标时段自身
    pub fn count_previously_taught(
        &self,
        teacher_id: &str,
        student_ids: &[String],
        exclude_slot_id: &str,
    ) -> RepositoryResult<usize> {
        if student_ids.is_empty() {
            return Ok(0);
        }

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT ss.student_id
            FROM assignment a
            JOIN slot_seat ss ON ss.slot_id = a.slot_id
            WHERE a.teacher_id = ?1 AND a.slot_id != ?2
            "#,
        )?;
        let taught: HashSet<String> = stmt
            .query_map(params![teacher_id, exclude_slot_id], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        Ok(student_ids.iter().filter(|id| taught.contains(*id)).count())
    }

    // ==========================================
    // 事务内写入帮助函数 (由指派事务管理器组合)
    // ==========================================

    /// 写入/覆盖时段指派 (upsert, 每时段至多一条由主键保证)
    pub fn upsert_tx(conn: &Connection, assignment: &Assignment) -> rusqlite::Result<()> {
        conn.execute(
            r#"
            INSERT INTO assignment (slot_id, teacher_id, assigned_by, assigned_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (slot_id) DO UPDATE SET
                teacher_id = ?2, assigned_by = ?3, assigned_at = ?4
            "#,
            params![
                assignment.slot_id,
                assignment.teacher_id,
                assignment.assigned_by,
                assignment.assigned_at.format(TS_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// 删除时段指派; 返回是否确有删除
    pub fn delete_tx(conn: &Connection, slot_id: &str) -> rusqlite::Result<bool> {
        let rows = conn.execute(
            "DELETE FROM assignment WHERE slot_id = ?1",
            params![slot_id],
        )?;
        Ok(rows > 0)
    }

    /// 翻转可用标记 (指派消费=false / 解除恢复=true)
    pub fn set_availability_tx(
        conn: &Connection,
        teacher_id: &str,
        slot_id: &str,
        available: bool,
    ) -> rusqlite::Result<()> {
        conn.execute(
            r#"
            INSERT INTO availability (teacher_id, slot_id, available) VALUES (?1, ?2, ?3)
            ON CONFLICT (teacher_id, slot_id) DO UPDATE SET available = ?3
            "#,
            params![teacher_id, slot_id, available],
        )?;
        Ok(())
    }

    /// 读取可用标记 (无记录视为不可用)
    pub fn availability_tx(
        conn: &Connection,
        teacher_id: &str,
        slot_id: &str,
    ) -> rusqlite::Result<bool> {
        let flag: Option<bool> = conn
            .query_row(
                "SELECT available FROM availability WHERE teacher_id = ?1 AND slot_id = ?2",
                params![teacher_id, slot_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(flag.unwrap_or(false))
    }
}
