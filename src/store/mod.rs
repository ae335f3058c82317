//! 用户进度存储：user_id → ProgressRecord 的持久键值映射
//!
//! 每用户一行，整条记录 upsert（last-write-wins）；completion 映射序列化为
//! JSON 文本，空映射固定写 "{}"，不落 NULL。同线程 put 后紧接 get 必须读到
//! 刚写入的值（read-your-writes）。

mod sqlite;

pub use sqlite::SqliteProgressStore;

use std::collections::BTreeMap;

use thiserror::Error;

/// 进度存储错误（SQLite / 序列化）
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Progress blob error: {0}")]
    Blob(#[from] serde_json::Error),
}

/// 每用户唯一的持久进度记录
///
/// `current_lesson` 只在「下一课」时递增，并不跟踪最近浏览的课时；
/// 导航解析以 `current_course` / `current_module` 指针为准。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub user_id: i64,
    pub current_course: Option<u32>,
    pub current_module: Option<u32>,
    pub current_lesson: Option<u32>,
    /// 模块 id（字符串键）→ 已完成课时 id 列表；写入时去重
    pub completion: BTreeMap<String, Vec<u32>>,
}

impl ProgressRecord {
    /// 首次接触时的空记录：空 completion、全部指针为 null
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            current_course: None,
            current_module: None,
            current_lesson: None,
            completion: BTreeMap::new(),
        }
    }

    /// 课时是否已标记完成
    pub fn is_completed(&self, module_id: u32, lesson_id: u32) -> bool {
        self.completion
            .get(&module_id.to_string())
            .map(|lessons| lessons.contains(&lesson_id))
            .unwrap_or(false)
    }

    /// 标记课时完成；返回是否实际新增（已存在时不变，调用方据此决定是否落库）
    pub fn mark_completed(&mut self, module_id: u32, lesson_id: u32) -> bool {
        let lessons = self.completion.entry(module_id.to_string()).or_default();
        if lessons.contains(&lesson_id) {
            return false;
        }
        lessons.push(lesson_id);
        true
    }

    /// 模块的已完成课时数
    pub fn completed_count(&self, module_id: u32) -> usize {
        self.completion
            .get(&module_id.to_string())
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// 进度存储契约：软失败 get + 幂等 upsert put
pub trait ProgressStore: Send + Sync {
    /// 无记录时返回 None，不报错
    fn get(&self, user_id: i64) -> Result<Option<ProgressRecord>, StoreError>;

    /// 整条记录插入或替换
    fn put(&self, record: &ProgressRecord) -> Result<(), StoreError>;
}
