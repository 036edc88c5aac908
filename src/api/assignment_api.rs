// ==========================================
// AssignmentApi - 指派事务管理器
// ==========================================
// 状态机: 每时段两态 Unassigned / Assigned(teacher_id)
// 红线: 指派写入、可用标记翻转、审计追加三者必须同事务,
//       任何一步失败整体回滚, 状态不允许半应用
// 并发: 同一连接串行执行写事务 → 同一时段的并发操作天然互斥;
//       busy/locked 以 ConcurrencyConflict 上抛, 不在核心内重试
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{Assignment, AuditLogEntry, AuditPayload};
use crate::repository::{
    AssignmentRepository, AuditLogRepository, RepositoryError, SlotRepository, TeacherRepository,
};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ==========================================
// AssignmentRecord - 操作结果视图
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub slot_id: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub assigned_by: String,
    pub assigned_at: NaiveDateTime,
}

// ==========================================
// AssignmentApi
// ==========================================
pub struct AssignmentApi {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentApi {
    /// 创建新的指派事务管理器
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> ApiResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))
    }

    // ==========================================
    // assign - 指派教师
    // ==========================================

    /// 指派教师到时段
    ///
    /// # 语义
    /// - upsert: 时段已有指派时覆盖 (last writer wins), 不报错;
    ///   被顶替教师的可用标记恢复为 true
    /// - 同事务: 指派写入 + 新教师可用标记置 false + 审计 ASSIGN
    ///
    /// # 错误
    /// - NotFound: 时段或教师不存在
    /// - ReferentialIntegrity: actor 未知 → 整体回滚
    pub fn assign_teacher(
        &self,
        slot_id: &str,
        teacher_id: &str,
        actor_id: &str,
    ) -> ApiResult<AssignmentRecord> {
        Self::validate_ids(&[("时段ID", slot_id), ("教师ID", teacher_id), ("操作人ID", actor_id)])?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(ApiError::from)?;

        if !SlotRepository::exists_tx(&tx, slot_id)? {
            return Err(ApiError::NotFound(format!("时段 {} 不存在", slot_id)));
        }
        let teacher_name =
            TeacherRepository::find_name_tx(&tx, teacher_id).map_err(ApiError::from)?;

        // 覆盖语义: 被顶替教师的可用标记先恢复
        if let Some(prior) = AssignmentRepository::find_by_slot_tx(&tx, slot_id)? {
            if prior.teacher_id != teacher_id {
                AssignmentRepository::set_availability_tx(&tx, &prior.teacher_id, slot_id, true)?;
            }
        }

        let assignment = Assignment {
            slot_id: slot_id.to_string(),
            teacher_id: teacher_id.to_string(),
            assigned_by: actor_id.to_string(),
            assigned_at: chrono::Local::now().naive_local(),
        };
        AssignmentRepository::upsert_tx(&tx, &assignment)?;
        AssignmentRepository::set_availability_tx(&tx, teacher_id, slot_id, false)?;

        Self::append_audit(
            &tx,
            actor_id,
            AuditPayload::Assign {
                slot_id: slot_id.to_string(),
                teacher_id: teacher_id.to_string(),
                teacher_name: teacher_name.clone(),
            },
        )?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        tracing::info!(slot_id, teacher_id, actor_id, "指派完成");
        Ok(AssignmentRecord {
            slot_id: assignment.slot_id,
            teacher_id: assignment.teacher_id,
            teacher_name,
            assigned_by: assignment.assigned_by,
            assigned_at: assignment.assigned_at,
        })
    }

    // ==========================================
    // change - 更换教师
    // ==========================================

    /// 更换时段教师
    ///
    /// # 语义
    /// - 仅在 Assigned 状态有效; Unassigned 时报 NoTeacherAssigned
    /// - 同事务: 指派改指向新教师 + 原教师标记恢复 true
    ///   + 新教师标记置 false + 审计 CHANGE
    pub fn change_teacher(
        &self,
        slot_id: &str,
        new_teacher_id: &str,
        actor_id: &str,
    ) -> ApiResult<AssignmentRecord> {
        Self::validate_ids(&[
            ("时段ID", slot_id),
            ("教师ID", new_teacher_id),
            ("操作人ID", actor_id),
        ])?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(ApiError::from)?;

        if !SlotRepository::exists_tx(&tx, slot_id)? {
            return Err(ApiError::NotFound(format!("时段 {} 不存在", slot_id)));
        }
        let prior = AssignmentRepository::find_by_slot_tx(&tx, slot_id)?.ok_or(
            ApiError::NoTeacherAssigned {
                slot_id: slot_id.to_string(),
            },
        )?;

        let old_teacher_name =
            TeacherRepository::find_name_tx(&tx, &prior.teacher_id).map_err(ApiError::from)?;
        let new_teacher_name =
            TeacherRepository::find_name_tx(&tx, new_teacher_id).map_err(ApiError::from)?;

        let assignment = Assignment {
            slot_id: slot_id.to_string(),
            teacher_id: new_teacher_id.to_string(),
            assigned_by: actor_id.to_string(),
            assigned_at: chrono::Local::now().naive_local(),
        };
        AssignmentRepository::upsert_tx(&tx, &assignment)?;
        AssignmentRepository::set_availability_tx(&tx, &prior.teacher_id, slot_id, true)?;
        AssignmentRepository::set_availability_tx(&tx, new_teacher_id, slot_id, false)?;

        Self::append_audit(
            &tx,
            actor_id,
            AuditPayload::Change {
                slot_id: slot_id.to_string(),
                old_teacher_id: prior.teacher_id.clone(),
                old_teacher_name,
                new_teacher_id: new_teacher_id.to_string(),
                new_teacher_name: new_teacher_name.clone(),
            },
        )?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        tracing::info!(
            slot_id,
            old_teacher_id = prior.teacher_id.as_str(),
            new_teacher_id,
            actor_id,
            "更换教师完成"
        );
        Ok(AssignmentRecord {
            slot_id: assignment.slot_id,
            teacher_id: assignment.teacher_id,
            teacher_name: new_teacher_name,
            assigned_by: assignment.assigned_by,
            assigned_at: assignment.assigned_at,
        })
    }

    // ==========================================
    // unassign - 解除指派
    // ==========================================

    /// 解除时段指派
    ///
    /// # 语义
    /// - 仅在 Assigned 状态有效; Unassigned 时报 NoTeacherAssigned
    /// - 同事务: 删除指派 + 教师标记恢复 true + 审计 UNASSIGN
    pub fn unassign_teacher(&self, slot_id: &str, actor_id: &str) -> ApiResult<bool> {
        Self::validate_ids(&[("时段ID", slot_id), ("操作人ID", actor_id)])?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(ApiError::from)?;

        if !SlotRepository::exists_tx(&tx, slot_id)? {
            return Err(ApiError::NotFound(format!("时段 {} 不存在", slot_id)));
        }
        let prior = AssignmentRepository::find_by_slot_tx(&tx, slot_id)?.ok_or(
            ApiError::NoTeacherAssigned {
                slot_id: slot_id.to_string(),
            },
        )?;
        let teacher_name =
            TeacherRepository::find_name_tx(&tx, &prior.teacher_id).map_err(ApiError::from)?;

        AssignmentRepository::delete_tx(&tx, slot_id)?;
        AssignmentRepository::set_availability_tx(&tx, &prior.teacher_id, slot_id, true)?;

        Self::append_audit(
            &tx,
            actor_id,
            AuditPayload::Unassign {
                slot_id: slot_id.to_string(),
                teacher_id: prior.teacher_id.clone(),
                teacher_name,
            },
        )?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        tracing::info!(
            slot_id,
            teacher_id = prior.teacher_id.as_str(),
            actor_id,
            "解除指派完成"
        );
        Ok(true)
    }

    // ==========================================
    // 内部帮助
    // ==========================================

    fn append_audit(conn: &Connection, actor_id: &str, payload: AuditPayload) -> ApiResult<()> {
        let entry = AuditLogEntry::new(actor_id, payload);
        AuditLogRepository::insert_tx(conn, &entry).map_err(|e| match e {
            // actor 外键失败 → 引用完整性错误 (事务随 drop 回滚)
            RepositoryError::ForeignKeyViolation(msg) => ApiError::ReferentialIntegrity(format!(
                "操作人 {} 未知: {}",
                actor_id, msg
            )),
            other => ApiError::from(other),
        })
    }

    fn validate_ids(fields: &[(&str, &str)]) -> ApiResult<()> {
        for (label, value) in fields {
            if value.trim().is_empty() {
                return Err(ApiError::InvalidInput(format!("{}不能为空", label)));
            }
        }
        Ok(())
    }
}
