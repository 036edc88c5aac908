// ==========================================
// SettingsRepository - 权重配置仓储
// ==========================================
// 存储: settings 表 (单行, settings_id 固定为 1)
// 约定: 行缺失时返回默认权重; update 为整行 upsert,
//       管理端并发修改以最后写入为准
// ==========================================

use crate::domain::Settings;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct SettingsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsRepository {
    /// 创建新的配置仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取权重配置 (行缺失时返回默认值)
    pub fn get(&self) -> RepositoryResult<Settings> {
        let conn = self.get_conn()?;

        let settings = conn
            .query_row(
                r#"
                SELECT load_weight, continuity_weight, grade_diff_weight,
                       pair_same_subject_required, pair_max_grade_gap
                FROM settings WHERE settings_id = 1
                "#,
                [],
                |row| {
                    Ok(Settings {
                        load_weight: row.get(0)?,
                        continuity_weight: row.get(1)?,
                        grade_diff_weight: row.get(2)?,
                        pair_same_subject_required: row.get(3)?,
                        pair_max_grade_gap: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(settings.unwrap_or_default())
    }

    /// 写入权重配置 (整行 upsert)
    pub fn update(&self, settings: &Settings) -> RepositoryResult<()> {
        if settings.load_weight < 0.0
            || settings.continuity_weight < 0.0
            || settings.grade_diff_weight < 0.0
        {
            return Err(RepositoryError::ValidationError(
                "权重必须为非负".to_string(),
            ));
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO settings (
                settings_id, load_weight, continuity_weight, grade_diff_weight,
                pair_same_subject_required, pair_max_grade_gap
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (settings_id) DO UPDATE SET
                load_weight = ?1, continuity_weight = ?2, grade_diff_weight = ?3,
                pair_same_subject_required = ?4, pair_max_grade_gap = ?5
            "#,
            params![
                settings.load_weight,
                settings.continuity_weight,
                settings.grade_diff_weight,
                settings.pair_same_subject_required,
                settings.pair_max_grade_gap,
            ],
        )?;
        Ok(())
    }
}
