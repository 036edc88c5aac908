// ==========================================
// UserRepository - 操作人仓储
// ==========================================
// 范围: app_user 表; 审计日志 actor 的引用对象
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    /// 创建新的操作人仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入操作人
    pub fn insert(&self, user_id: &str, name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO app_user (user_id, name) VALUES (?, ?)",
            params![user_id, name],
        )?;
        Ok(())
    }

    /// 操作人是否存在
    pub fn exists(&self, user_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found: Option<bool> = conn
            .query_row(
                "SELECT 1 FROM app_user WHERE user_id = ?1",
                params![user_id],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_exists() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = UserRepository::new(Arc::new(Mutex::new(conn)));

        repo.insert("A1", "管理员一").unwrap();
        assert!(repo.exists("A1").unwrap());
        assert!(!repo.exists("A2").unwrap());
    }
}
