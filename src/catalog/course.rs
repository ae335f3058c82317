//! 课程树类型：课程 → 模块 → 课时

use serde::Deserialize;

/// 课程：按声明顺序排列的模块序列
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: u32,
    pub title: String,
    pub modules: Vec<Module>,
}

/// 模块：标题、描述与课时序列
#[derive(Debug, Clone, Deserialize)]
pub struct Module {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub lessons: Vec<Lesson>,
}

/// 课时。id 是模块内从 1 起的连续位置，既是标识也是隐式顺序键
/// （「下一课」按算术递增推进，不查表）。
#[derive(Debug, Clone, Deserialize)]
pub struct Lesson {
    pub id: u32,
    pub title: String,
    pub content: String,
    pub task: String,
}

impl Course {
    /// 按 id 查模块
    pub fn module(&self, id: u32) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }
}

impl Module {
    /// 按 id 查课时
    pub fn lesson(&self, id: u32) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    /// 课时总数
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }
}
