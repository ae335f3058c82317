//! 进程内易失会话：导航状态与测验会话
//!
//! 与进度存储同样的 get/put 键值契约，但不落盘：进程重启即丢失
//! （已记录的可接受行为，不算缺陷）。以注入组件的形式持有，不做模块级单例。

use std::collections::HashMap;

use tokio::sync::RwLock;

/// 每用户一个的导航状态标签，决定当前视图的有效菜单项集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    MainMenu,
    CourseList,
    QuizList,
    ModuleList {
        course_id: u32,
    },
    LessonList {
        course_id: u32,
        module_id: u32,
    },
    LessonView {
        course_id: u32,
        module_id: u32,
        lesson_id: u32,
    },
}

/// 测验会话：题目指针（0 起）与累计得分（可为负）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    pub quiz_id: u32,
    pub question_index: usize,
    pub score: i32,
}

impl QuizSession {
    /// 新会话从第 0 题、0 分开始
    pub fn new(quiz_id: u32) -> Self {
        Self {
            quiz_id,
            question_index: 0,
            score: 0,
        }
    }
}

/// 进程内键值存储：user_id → T
#[derive(Debug)]
pub struct MemoryStore<T> {
    entries: RwLock<HashMap<i64, T>>,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, user_id: i64) -> Option<T> {
        self.entries.read().await.get(&user_id).cloned()
    }

    /// 插入或整体替换（开始新测验时静默丢弃未完成会话即走此路径）
    pub async fn put(&self, user_id: i64, value: T) {
        self.entries.write().await.insert(user_id, value);
    }

    pub async fn remove(&self, user_id: i64) -> Option<T> {
        self.entries.write().await.remove(&user_id)
    }
}

impl<T: Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
