// ==========================================
// 辅导排课系统 - SQLite 连接初始化与内嵌 Schema
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键必须开启，
//   否则审计日志 actor 引用完整性失效）
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 内嵌 schema
///
/// 说明:
/// - assignment 以 slot_id 为主键 → 每个时段最多一条指派（排他由 schema 保证）
/// - audit_log.actor 外键引用 app_user → 未知操作人会在审计写入时失败,
///   由事务整体回滚
/// - settings 用 CHECK(settings_id = 1) 固定为单行
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teacher (
    teacher_id      TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    cap_week_slots  INTEGER NOT NULL CHECK (cap_week_slots > 0),
    cap_students    INTEGER NOT NULL CHECK (cap_students > 0),
    allow_pair      INTEGER NOT NULL DEFAULT 0,
    active          INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS teacher_skill (
    teacher_id  TEXT NOT NULL REFERENCES teacher(teacher_id),
    subject     TEXT NOT NULL,
    grade_min   INTEGER NOT NULL,
    grade_max   INTEGER NOT NULL,
    UNIQUE (teacher_id, subject)
);

CREATE TABLE IF NOT EXISTS student (
    student_id     TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    grade          INTEGER NOT NULL CHECK (grade BETWEEN 1 AND 12),
    requires_solo  INTEGER NOT NULL DEFAULT 0,
    active         INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS student_subject (
    student_id  TEXT NOT NULL REFERENCES student(student_id),
    subject     TEXT NOT NULL,
    UNIQUE (student_id, subject)
);

CREATE TABLE IF NOT EXISTS student_ng_teacher (
    student_id  TEXT NOT NULL REFERENCES student(student_id),
    teacher_id  TEXT NOT NULL REFERENCES teacher(teacher_id),
    UNIQUE (student_id, teacher_id)
);

CREATE TABLE IF NOT EXISTS slot (
    slot_id  TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS slot_seat (
    slot_id     TEXT NOT NULL REFERENCES slot(slot_id),
    student_id  TEXT NOT NULL REFERENCES student(student_id),
    subject     TEXT NOT NULL,
    grade       INTEGER NOT NULL,
    UNIQUE (slot_id, student_id)
);

CREATE TABLE IF NOT EXISTS assignment (
    slot_id      TEXT PRIMARY KEY REFERENCES slot(slot_id),
    teacher_id   TEXT NOT NULL REFERENCES teacher(teacher_id),
    assigned_by  TEXT NOT NULL,
    assigned_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS availability (
    teacher_id  TEXT NOT NULL REFERENCES teacher(teacher_id),
    slot_id     TEXT NOT NULL REFERENCES slot(slot_id),
    available   INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (teacher_id, slot_id)
);

CREATE TABLE IF NOT EXISTS settings (
    settings_id                 INTEGER PRIMARY KEY CHECK (settings_id = 1),
    load_weight                 REAL NOT NULL CHECK (load_weight >= 0),
    continuity_weight           REAL NOT NULL CHECK (continuity_weight >= 0),
    grade_diff_weight           REAL NOT NULL CHECK (grade_diff_weight >= 0),
    pair_same_subject_required  INTEGER NOT NULL DEFAULT 1,
    pair_max_grade_gap          INTEGER NOT NULL DEFAULT 2
);

CREATE TABLE IF NOT EXISTS app_user (
    user_id  TEXT PRIMARY KEY,
    name     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS audit_log (
    audit_id      TEXT PRIMARY KEY,
    action_type   TEXT NOT NULL,
    actor         TEXT NOT NULL REFERENCES app_user(user_id),
    action_ts     TEXT NOT NULL,
    payload_json  TEXT NOT NULL
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 应用内嵌 schema（幂等, 全部 IF NOT EXISTS）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

/// 打开连接 + 建表, 一步到位（测试与种子工具用）
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}
