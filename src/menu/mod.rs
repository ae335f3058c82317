//! 菜单视图与类型化动作
//!
//! 每个可选项都是「显示文本 + 类型化动作」的 MenuEntry；项集合按当前导航状态
//! 从目录与进度记录即时生成（无静态转移表）。处理器对入站文本做全等匹配取回
//! 动作，不从显示文本反解析 id。

use crate::catalog::{Catalog, Lesson, Module, Question};
use crate::session::NavState;
use crate::store::ProgressRecord;

pub const LABEL_COURSES: &str = "📚 Courses";
pub const LABEL_ASK_MENTOR: &str = "💬 Ask the mentor";
pub const LABEL_QUIZZES: &str = "📝 Quizzes";
pub const LABEL_PROGRESS: &str = "🏆 Progress";
pub const LABEL_NEXT_LESSON: &str = "➡️ Next lesson";
pub const LABEL_TO_MODULE: &str = "🔙 To module";
pub const LABEL_BACK: &str = "🔙 Back";
pub const LABEL_HOME: &str = "🏠 Home";

/// 类型化菜单动作：可选项携带的显式负载
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Courses,
    Quizzes,
    Progress,
    AskMentor,
    Home,
    Back,
    SelectCourse { id: u32 },
    SelectModule { id: u32 },
    SelectLesson { id: u32 },
    SelectQuiz { id: u32 },
    NextLesson,
}

/// 菜单项：显示文本与其携带的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub action: Action,
}

impl MenuEntry {
    fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// 发往聊天平台的回复：正文 + 可选键盘（None 表示沿用当前键盘）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Vec<Vec<String>>>,
}

/// 当前导航状态下的有效菜单项集合（每次即时生成）
pub fn entries_for(state: NavState, catalog: &Catalog, record: &ProgressRecord) -> Vec<MenuEntry> {
    match state {
        NavState::MainMenu => vec![
            MenuEntry::new(LABEL_COURSES, Action::Courses),
            MenuEntry::new(LABEL_ASK_MENTOR, Action::AskMentor),
            MenuEntry::new(LABEL_QUIZZES, Action::Quizzes),
            MenuEntry::new(LABEL_PROGRESS, Action::Progress),
        ],
        NavState::CourseList => {
            let mut entries: Vec<MenuEntry> = catalog
                .courses()
                .iter()
                .map(|c| MenuEntry::new(format!("🎓 {}", c.title), Action::SelectCourse { id: c.id }))
                .collect();
            entries.push(MenuEntry::new(LABEL_HOME, Action::Home));
            entries
        }
        NavState::QuizList => {
            let mut entries: Vec<MenuEntry> = catalog
                .quizzes()
                .iter()
                .map(|q| MenuEntry::new(format!("🧪 {}", q.title), Action::SelectQuiz { id: q.id }))
                .collect();
            entries.push(MenuEntry::new(LABEL_HOME, Action::Home));
            entries
        }
        NavState::ModuleList { course_id } => {
            let mut entries: Vec<MenuEntry> = catalog
                .course(course_id)
                .map(|course| {
                    course
                        .modules
                        .iter()
                        .map(|m| {
                            MenuEntry::new(
                                format!("📦 Module {}: {}", m.id, m.title),
                                Action::SelectModule { id: m.id },
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();
            entries.push(MenuEntry::new(LABEL_BACK, Action::Back));
            entries.push(MenuEntry::new(LABEL_HOME, Action::Home));
            entries
        }
        NavState::LessonList {
            course_id,
            module_id,
        } => {
            let mut entries: Vec<MenuEntry> = catalog
                .course(course_id)
                .and_then(|c| c.module(module_id))
                .map(|module| {
                    module
                        .lessons
                        .iter()
                        .map(|l| {
                            let marker = if record.is_completed(module_id, l.id) {
                                " ✅"
                            } else {
                                ""
                            };
                            MenuEntry::new(
                                format!("📖 Lesson {}{}", l.id, marker),
                                Action::SelectLesson { id: l.id },
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();
            entries.push(MenuEntry::new(LABEL_BACK, Action::Back));
            entries.push(MenuEntry::new(LABEL_HOME, Action::Home));
            entries
        }
        NavState::LessonView {
            course_id,
            module_id,
            lesson_id,
        } => {
            let mut entries = Vec::new();
            let lesson_count = catalog
                .course(course_id)
                .and_then(|c| c.module(module_id))
                .map(|m| m.lesson_count())
                .unwrap_or(0);
            if (lesson_id as usize) < lesson_count {
                entries.push(MenuEntry::new(LABEL_NEXT_LESSON, Action::NextLesson));
            }
            entries.push(MenuEntry::new(LABEL_TO_MODULE, Action::Back));
            entries.push(MenuEntry::new(LABEL_HOME, Action::Home));
            entries
        }
    }
}

/// 当前状态的键盘布局：主菜单 2×2，列表项每行一个，导航键并排一行
pub fn keyboard_for(
    state: NavState,
    catalog: &Catalog,
    record: &ProgressRecord,
) -> Vec<Vec<String>> {
    if state == NavState::MainMenu {
        return main_menu_keyboard();
    }

    let entries = entries_for(state, catalog, record);
    let (nav, items): (Vec<&MenuEntry>, Vec<&MenuEntry>) = entries
        .iter()
        .partition(|e| matches!(e.action, Action::Back | Action::Home));

    let mut rows: Vec<Vec<String>> = items.iter().map(|e| vec![e.label.clone()]).collect();
    if !nav.is_empty() {
        rows.push(nav.iter().map(|e| e.label.clone()).collect());
    }
    rows
}

/// 主菜单键盘（欢迎与测验结束时也复用）
pub fn main_menu_keyboard() -> Vec<Vec<String>> {
    vec![
        vec![LABEL_COURSES.to_string(), LABEL_ASK_MENTOR.to_string()],
        vec![LABEL_QUIZZES.to_string(), LABEL_PROGRESS.to_string()],
    ]
}

pub fn welcome_text() -> String {
    "👋 Hi! I'm your personal mentor. Pick an action:".to_string()
}

pub fn main_menu_text() -> String {
    "Main menu:".to_string()
}

pub fn course_list_text() -> String {
    "Available courses:".to_string()
}

pub fn quiz_list_text() -> String {
    "Available quizzes:".to_string()
}

pub fn ask_mentor_text() -> String {
    "💬 Type your question and I'll answer.".to_string()
}

pub fn module_list_text(course_title: &str) -> String {
    format!("📚 Course: {}\nPick a module:", course_title)
}

pub fn lesson_list_text(module: &Module) -> String {
    format!("📦 Module: {}\n{}", module.title, module.description)
}

pub fn lesson_text(lesson: &Lesson) -> String {
    format!(
        "📌 {}\n\n{}\n\n✏️ Task: {}",
        lesson.title, lesson.content, lesson.task
    )
}

/// 测验题视图：题面 + 选项键盘（选项即该状态的全部有效输入）
pub fn question_view(question: &Question) -> Reply {
    Reply {
        text: question.text.clone(),
        keyboard: Some(question.options.iter().map(|o| vec![o.clone()]).collect()),
    }
}

/// 进度视图：completion 中出现过的课程逐模块给出 完成数/总数
pub fn progress_text(catalog: &Catalog, record: &ProgressRecord) -> String {
    let mut out = String::from("Your progress:\n\n");
    for course in catalog.courses() {
        if !record.completion.contains_key(&course.id.to_string()) {
            continue;
        }
        out.push_str(&format!("📚 {}:\n", course.title));
        for module in &course.modules {
            out.push_str(&format!(
                "  📦 {}: {}/{} lessons\n",
                module.title,
                record.completed_count(module.id),
                module.lesson_count()
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Course, Lesson, Module};

    fn catalog() -> Catalog {
        Catalog::new(
            vec![Course {
                id: 1,
                title: "Intro".to_string(),
                modules: vec![Module {
                    id: 1,
                    title: "M1".to_string(),
                    description: "basics".to_string(),
                    lessons: vec![
                        Lesson {
                            id: 1,
                            title: "L1".to_string(),
                            content: "c1".to_string(),
                            task: "t1".to_string(),
                        },
                        Lesson {
                            id: 2,
                            title: "L2".to_string(),
                            content: "c2".to_string(),
                            task: "t2".to_string(),
                        },
                    ],
                }],
            }],
            Vec::new(),
        )
    }

    #[test]
    fn test_course_list_entries_carry_ids() {
        let record = ProgressRecord::new(1);
        let entries = entries_for(NavState::CourseList, &catalog(), &record);
        assert_eq!(entries[0].label, "🎓 Intro");
        assert_eq!(entries[0].action, Action::SelectCourse { id: 1 });
        assert_eq!(entries.last().unwrap().action, Action::Home);
    }

    #[test]
    fn test_lesson_entries_show_completion_marker() {
        let catalog = catalog();
        let mut record = ProgressRecord::new(1);
        record.mark_completed(1, 1);
        let state = NavState::LessonList {
            course_id: 1,
            module_id: 1,
        };
        let entries = entries_for(state, &catalog, &record);
        assert_eq!(entries[0].label, "📖 Lesson 1 ✅");
        assert_eq!(entries[1].label, "📖 Lesson 2");
    }

    #[test]
    fn test_next_lesson_offered_only_before_last() {
        let catalog = catalog();
        let record = ProgressRecord::new(1);

        let mid = NavState::LessonView {
            course_id: 1,
            module_id: 1,
            lesson_id: 1,
        };
        let labels: Vec<String> = entries_for(mid, &catalog, &record)
            .into_iter()
            .map(|e| e.label)
            .collect();
        assert!(labels.contains(&LABEL_NEXT_LESSON.to_string()));

        let last = NavState::LessonView {
            course_id: 1,
            module_id: 1,
            lesson_id: 2,
        };
        let labels: Vec<String> = entries_for(last, &catalog, &record)
            .into_iter()
            .map(|e| e.label)
            .collect();
        assert!(!labels.contains(&LABEL_NEXT_LESSON.to_string()));
    }

    #[test]
    fn test_main_menu_keyboard_is_two_by_two() {
        let rows = main_menu_keyboard();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![LABEL_COURSES, LABEL_ASK_MENTOR]);
        assert_eq!(rows[1], vec![LABEL_QUIZZES, LABEL_PROGRESS]);
    }

    #[test]
    fn test_list_keyboard_groups_nav_row_last() {
        let record = ProgressRecord::new(1);
        let rows = keyboard_for(
            NavState::LessonList {
                course_id: 1,
                module_id: 1,
            },
            &catalog(),
            &record,
        );
        assert_eq!(rows[0], vec!["📖 Lesson 1"]);
        assert_eq!(rows[1], vec!["📖 Lesson 2"]);
        assert_eq!(rows[2], vec![LABEL_BACK.to_string(), LABEL_HOME.to_string()]);
    }

    #[test]
    fn test_progress_text_counts_per_module() {
        let catalog = catalog();
        let mut record = ProgressRecord::new(1);
        record.mark_completed(1, 1);
        record.mark_completed(1, 2);
        let text = progress_text(&catalog, &record);
        assert!(text.contains("📚 Intro:"));
        assert!(text.contains("M1: 2/2 lessons"));
    }

    #[test]
    fn test_progress_text_skips_untouched_courses() {
        let text = progress_text(&catalog(), &ProgressRecord::new(1));
        assert_eq!(text, "Your progress:\n\n");
    }
}
