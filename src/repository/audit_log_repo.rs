// ==========================================
// AuditLogRepository - 审计日志仓储
// ==========================================
// 红线: append-only; 引擎侧从不更新/删除
// 约定: actor 外键引用 app_user, 未知操作人在此写入失败,
//       由指派事务整体回滚
// ==========================================

use crate::domain::{AuditLogEntry, AuditPayload};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct AuditLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AuditLogRepository {
    /// 创建新的审计日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 追加审计日志 (事务内版本, 由指派事务管理器调用)
    pub fn insert_tx(conn: &Connection, entry: &AuditLogEntry) -> RepositoryResult<()> {
        let payload_json = serde_json::to_string(&entry.payload)
            .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO audit_log (audit_id, action_type, actor, action_ts, payload_json)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                entry.audit_id,
                entry.payload.action_type(),
                entry.actor,
                entry.action_ts.format(TS_FORMAT).to_string(),
                payload_json,
            ],
        )?;
        Ok(())
    }

    /// 追加审计日志
    pub fn insert(&self, entry: &AuditLogEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_tx(&conn, entry)
    }

    // ==========================================
    // 查询操作 (审计查看界面用)
    // ==========================================

    /// 查询最近 N 条日志, 按时间倒序
    pub fn find_recent(&self, limit: usize) -> RepositoryResult<Vec<AuditLogEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT audit_id, actor, action_ts, payload_json
            FROM audit_log
            ORDER BY action_ts DESC, audit_id DESC
            LIMIT ?1
            "#,
        )?;
        let entries = stmt
            .query_map(params![limit as i64], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        entries.into_iter().collect()
    }

    /// 查询某时段相关的全部日志, 按时间升序
    pub fn find_by_slot(&self, slot_id: &str) -> RepositoryResult<Vec<AuditLogEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT audit_id, actor, action_ts, payload_json
            FROM audit_log
            WHERE json_extract(payload_json, '$.slot_id') = ?1
            ORDER BY action_ts ASC, audit_id ASC
            "#,
        )?;
        let entries = stmt
            .query_map(params![slot_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        entries.into_iter().collect()
    }

    /// 按操作类型统计条数
    pub fn count_by_action_type(&self, action_type: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM audit_log WHERE action_type = ?1",
            params![action_type],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RepositoryResult<AuditLogEntry>> {
        let ts: String = row.get(2)?;
        let payload_json: String = row.get(3)?;
        let payload: Result<AuditPayload, _> = serde_json::from_str(&payload_json);

        Ok(match payload {
            Ok(payload) => Ok(AuditLogEntry {
                audit_id: row.get(0)?,
                actor: row.get(1)?,
                action_ts: NaiveDateTime::parse_from_str(&ts, TS_FORMAT).unwrap_or_default(),
                payload,
            }),
            Err(e) => Err(RepositoryError::ValidationError(format!(
                "审计载荷解析失败: {}",
                e
            ))),
        })
    }
}
