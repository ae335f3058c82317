//! SQLite 进度存储实现（rusqlite，单连接同步访问）

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::{ProgressRecord, ProgressStore, StoreError};

/// 基于 SQLite 的进度存储：users 表每用户一行
pub struct SqliteProgressStore {
    conn: Mutex<Connection>,
}

impl SqliteProgressStore {
    /// 打开（或创建）数据库文件并建表
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    /// 内存数据库（测试用）
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                 chat_id        INTEGER PRIMARY KEY,
                 progress       TEXT NOT NULL,
                 current_course INTEGER,
                 current_module INTEGER,
                 current_lesson INTEGER,
                 updated_at     TEXT NOT NULL
             )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl ProgressStore for SqliteProgressStore {
    fn get(&self, user_id: i64) -> Result<Option<ProgressRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT progress, current_course, current_module, current_lesson
                 FROM users WHERE chat_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<u32>>(1)?,
                        row.get::<_, Option<u32>>(2)?,
                        row.get::<_, Option<u32>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((blob, current_course, current_module, current_lesson)) = row else {
            return Ok(None);
        };

        Ok(Some(ProgressRecord {
            user_id,
            current_course,
            current_module,
            current_lesson,
            completion: serde_json::from_str(&blob)?,
        }))
    }

    fn put(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        // 空映射序列化为 "{}"，永不落 NULL
        let blob = serde_json::to_string(&record.completion)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO users
                 (chat_id, progress, current_course, current_module, current_lesson, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.user_id,
                blob,
                record.current_course,
                record.current_module,
                record.current_lesson,
                chrono::Local::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}
