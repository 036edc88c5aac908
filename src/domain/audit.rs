// ==========================================
// 辅导排课系统 - 审计日志领域模型
// ==========================================
// 红线: 所有指派写入必须记录; 审计写入失败则整个事务回滚
// 对齐: audit_log 表 (append-only, 引擎侧从不更新/删除)
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// AuditPayload - 按操作类型区分的载荷
// ==========================================
// 以 tagged union 固定每种操作的载荷形态,
// 避免自由 key/value 结构在读取侧反向猜字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum AuditPayload {
    #[serde(rename = "ASSIGN")]
    Assign {
        slot_id: String,
        teacher_id: String,
        teacher_name: String,
    },
    #[serde(rename = "CHANGE")]
    Change {
        slot_id: String,
        old_teacher_id: String,
        old_teacher_name: String,
        new_teacher_id: String,
        new_teacher_name: String,
    },
    #[serde(rename = "UNASSIGN")]
    Unassign {
        slot_id: String,
        teacher_id: String,
        teacher_name: String,
    },
}

impl AuditPayload {
    /// 操作类型字符串 (用于数据库 action_type 列)
    pub fn action_type(&self) -> &'static str {
        match self {
            AuditPayload::Assign { .. } => "ASSIGN",
            AuditPayload::Change { .. } => "CHANGE",
            AuditPayload::Unassign { .. } => "UNASSIGN",
        }
    }

    /// 载荷所属的时段ID
    pub fn slot_id(&self) -> &str {
        match self {
            AuditPayload::Assign { slot_id, .. } => slot_id,
            AuditPayload::Change { slot_id, .. } => slot_id,
            AuditPayload::Unassign { slot_id, .. } => slot_id,
        }
    }
}

// ==========================================
// AuditLogEntry - 审计日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub audit_id: String,           // 日志ID (UUID)
    pub actor: String,              // 操作人ID (外键引用 app_user)
    pub action_ts: NaiveDateTime,   // 操作时间戳
    pub payload: AuditPayload,      // 操作载荷
}

impl AuditLogEntry {
    /// 创建新的审计日志 (UUID + 当前时间)
    pub fn new(actor: &str, payload: AuditPayload) -> Self {
        Self {
            audit_id: uuid::Uuid::new_v4().to_string(),
            actor: actor.to_string(),
            action_ts: chrono::Local::now().naive_local(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_json_tagged_by_action() {
        let payload = AuditPayload::Assign {
            slot_id: "MON-0".to_string(),
            teacher_id: "T1".to_string(),
            teacher_name: "教师一".to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["action"], "ASSIGN");
        assert_eq!(json["slot_id"], "MON-0");

        let back: AuditPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_action_type_matches_variant() {
        let payload = AuditPayload::Change {
            slot_id: "MON-0".to_string(),
            old_teacher_id: "T1".to_string(),
            old_teacher_name: "教师一".to_string(),
            new_teacher_id: "T2".to_string(),
            new_teacher_name: "教师二".to_string(),
        };
        assert_eq!(payload.action_type(), "CHANGE");
        assert_eq!(payload.slot_id(), "MON-0");
    }
}
