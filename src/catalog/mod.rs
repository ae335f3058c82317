//! 内容目录：课程树与测验题库
//!
//! 进程启动时从两份静态 JSON 文档各加载一次（课程树 / 题库），
//! 之后全程只读，不支持热更新。

mod course;
mod quiz;

pub use course::{Course, Lesson, Module};
pub use quiz::{Question, Quiz, ResultBand};

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// 目录加载错误（IO / JSON 结构不符）
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// courses.json 顶层包装：{"courses": [...]}
#[derive(Debug, Deserialize)]
struct CoursesDoc {
    courses: Vec<Course>,
}

/// quizzes.json 顶层包装：{"tests": [...]}（沿用原始数据文件的键名）
#[derive(Debug, Deserialize)]
struct QuizzesDoc {
    tests: Vec<Quiz>,
}

/// 不可变内容目录
#[derive(Debug)]
pub struct Catalog {
    courses: Vec<Course>,
    quizzes: Vec<Quiz>,
}

impl Catalog {
    /// 从两个 JSON 文件加载目录
    pub fn load(
        courses_path: impl AsRef<Path>,
        quizzes_path: impl AsRef<Path>,
    ) -> Result<Self, CatalogError> {
        let courses: CoursesDoc =
            serde_json::from_str(&std::fs::read_to_string(courses_path)?)?;
        let quizzes: QuizzesDoc =
            serde_json::from_str(&std::fs::read_to_string(quizzes_path)?)?;
        Ok(Self {
            courses: courses.courses,
            quizzes: quizzes.tests,
        })
    }

    /// 直接由内存数据构建（测试用）
    pub fn new(courses: Vec<Course>, quizzes: Vec<Quiz>) -> Self {
        Self { courses, quizzes }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    /// 按 id 查课程
    pub fn course(&self, id: u32) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    /// 按 id 查测验
    pub fn quiz(&self, id: u32) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let courses_path = dir.path().join("courses.json");
        let quizzes_path = dir.path().join("quizzes.json");

        let mut f = std::fs::File::create(&courses_path).unwrap();
        write!(
            f,
            r#"{{"courses": [{{"id": 1, "title": "Intro", "modules": [
                {{"id": 1, "title": "M1", "description": "d", "lessons": [
                    {{"id": 1, "title": "L1", "content": "c", "task": "t"}}
                ]}}
            ]}}]}}"#
        )
        .unwrap();

        let mut f = std::fs::File::create(&quizzes_path).unwrap();
        write!(
            f,
            r#"{{"tests": [{{"id": 1, "title": "Q", "questions": [
                {{"text": "?", "options": ["A", "B"], "scores": [0, 10]}}
            ], "results": {{"0-5": "Low", "6-10": "High"}}}}]}}"#
        )
        .unwrap();

        let catalog = Catalog::load(&courses_path, &quizzes_path).unwrap();
        assert_eq!(catalog.courses().len(), 1);
        assert_eq!(catalog.course(1).unwrap().module(1).unwrap().lesson_count(), 1);
        assert_eq!(catalog.quiz(1).unwrap().question_count(), 1);
        assert!(catalog.course(99).is_none());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            Catalog::load(&missing, &missing),
            Err(CatalogError::Io(_))
        ));
    }
}
