//! 消息分发器
//!
//! 单条入站文本的完整处理链：命令 → 当前导航状态的菜单匹配 → 测验会话捕获 →
//! 补全服务兜底。所有错误限定在当次动作内：目录解析失败静默丢弃（Ok(None)），
//! 外部服务失败以 ⚠️ 文本回给用户，进程不退出。

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::llm::LlmClient;
use crate::menu::{self, Action, Reply};
use crate::session::{MemoryStore, NavState, QuizSession};
use crate::store::{ProgressRecord, ProgressStore, StoreError};

/// 导师机器人：目录、进度存储、易失会话与补全客户端全部注入
pub struct Mentor {
    catalog: Catalog,
    store: Arc<dyn ProgressStore>,
    nav: MemoryStore<NavState>,
    quizzes: MemoryStore<QuizSession>,
    llm: Arc<dyn LlmClient>,
}

impl Mentor {
    pub fn new(catalog: Catalog, store: Arc<dyn ProgressStore>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            catalog,
            store,
            nav: MemoryStore::new(),
            quizzes: MemoryStore::new(),
            llm,
        }
    }

    /// 处理一条入站文本，返回要发送的回复；Ok(None) 表示静默丢弃
    pub async fn handle_message(&self, user_id: i64, text: &str) -> anyhow::Result<Option<Reply>> {
        let text = text.trim();

        if text == "/start" || text == "/help" {
            return self.handle_start(user_id).await.map(Some);
        }

        // 首次接触（任意消息）即建空记录：空 completion、指针全 null
        let mut record = self.load_or_init(user_id)?;

        // 菜单：对当前状态即时生成的项集合做文本全等匹配
        let state = self.nav.get(user_id).await.unwrap_or_default();
        let entries = menu::entries_for(state, &self.catalog, &record);
        if let Some(entry) = entries.into_iter().find(|e| e.label == text) {
            return self.apply_action(user_id, state, entry.action, &mut record).await;
        }

        // 测验会话捕获：兜底之前拦截，选项是该状态的全部有效输入
        if let Some(session) = self.quizzes.get(user_id).await {
            return self.handle_quiz_answer(user_id, session, text).await;
        }

        // 自由文本 → 补全服务
        Ok(Some(self.fallback(text).await))
    }

    /// /start 与 /help：确保记录存在并回到主菜单
    async fn handle_start(&self, user_id: i64) -> anyhow::Result<Reply> {
        self.load_or_init(user_id)?;
        self.nav.put(user_id, NavState::MainMenu).await;
        Ok(Reply {
            text: menu::welcome_text(),
            keyboard: Some(menu::main_menu_keyboard()),
        })
    }

    fn load_or_init(&self, user_id: i64) -> Result<ProgressRecord, StoreError> {
        if let Some(record) = self.store.get(user_id)? {
            return Ok(record);
        }
        let record = ProgressRecord::new(user_id);
        self.store.put(&record)?;
        Ok(record)
    }

    /// 应用类型化动作：状态转移、进度落库与视图渲染
    async fn apply_action(
        &self,
        user_id: i64,
        state: NavState,
        action: Action,
        record: &mut ProgressRecord,
    ) -> anyhow::Result<Option<Reply>> {
        match action {
            Action::Courses => {
                self.nav.put(user_id, NavState::CourseList).await;
                Ok(self.view_for(NavState::CourseList, record))
            }
            Action::Quizzes => {
                self.nav.put(user_id, NavState::QuizList).await;
                Ok(self.view_for(NavState::QuizList, record))
            }
            Action::Progress => Ok(Some(Reply {
                text: menu::progress_text(&self.catalog, record),
                keyboard: None,
            })),
            Action::AskMentor => Ok(Some(Reply {
                text: menu::ask_mentor_text(),
                keyboard: None,
            })),
            Action::Home => {
                self.nav.put(user_id, NavState::MainMenu).await;
                Ok(self.view_for(NavState::MainMenu, record))
            }
            Action::Back => {
                let parent = match state {
                    NavState::ModuleList { .. } => NavState::CourseList,
                    NavState::LessonList { course_id, .. } => NavState::ModuleList { course_id },
                    NavState::LessonView {
                        course_id,
                        module_id,
                        ..
                    } => NavState::LessonList {
                        course_id,
                        module_id,
                    },
                    _ => NavState::MainMenu,
                };
                self.nav.put(user_id, parent).await;
                Ok(self.view_for(parent, record))
            }
            Action::SelectCourse { id } => {
                let Some(course) = self.catalog.course(id) else {
                    tracing::debug!(user_id, course_id = id, "Stale course selection dropped");
                    return Ok(None);
                };
                record.current_course = Some(course.id);
                record.current_module = None;
                self.store.put(record)?;
                let next = NavState::ModuleList { course_id: course.id };
                self.nav.put(user_id, next).await;
                Ok(self.view_for(next, record))
            }
            Action::SelectModule { id } => {
                // 原语义：模块按记录里的当前课程指针解析
                let Some(course_id) = record.current_course else {
                    return Ok(None);
                };
                let Some(module) = self.catalog.course(course_id).and_then(|c| c.module(id))
                else {
                    tracing::debug!(user_id, module_id = id, "Stale module selection dropped");
                    return Ok(None);
                };
                record.current_module = Some(module.id);
                self.store.put(record)?;
                let next = NavState::LessonList {
                    course_id,
                    module_id: module.id,
                };
                self.nav.put(user_id, next).await;
                Ok(self.view_for(next, record))
            }
            Action::SelectLesson { id } => self.show_lesson(user_id, record, id).await,
            Action::NextLesson => {
                // 「下一课」：递增计数器并按指针重新渲染。计数器并不跟踪最近浏览的
                // 课时，渲染出的课时可能与刚看过的那节不同（保留的既有行为）。
                let next_id = record.current_lesson.unwrap_or(0) + 1;
                record.current_lesson = Some(next_id);
                self.store.put(record)?;
                self.show_lesson(user_id, record, next_id).await
            }
            Action::SelectQuiz { id } => self.start_quiz(user_id, id).await,
        }
    }

    /// 课时视图：渲染 + 完成标记副作用（仅当 id 原先不存在时落库）
    async fn show_lesson(
        &self,
        user_id: i64,
        record: &mut ProgressRecord,
        lesson_id: u32,
    ) -> anyhow::Result<Option<Reply>> {
        let (Some(course_id), Some(module_id)) = (record.current_course, record.current_module)
        else {
            return Ok(None);
        };
        if self
            .catalog
            .course(course_id)
            .and_then(|c| c.module(module_id))
            .and_then(|m| m.lesson(lesson_id))
            .is_none()
        {
            tracing::debug!(user_id, lesson_id, "Unresolved lesson dropped");
            return Ok(None);
        }

        let state = NavState::LessonView {
            course_id,
            module_id,
            lesson_id,
        };
        self.nav.put(user_id, state).await;
        let reply = self.view_for(state, record);

        if record.mark_completed(module_id, lesson_id) {
            self.store.put(record)?;
        }

        Ok(reply)
    }

    /// 开始测验：静默丢弃旧会话，渲染第 0 题
    async fn start_quiz(&self, user_id: i64, quiz_id: u32) -> anyhow::Result<Option<Reply>> {
        let Some(quiz) = self.catalog.quiz(quiz_id) else {
            tracing::debug!(user_id, quiz_id, "Stale quiz selection dropped");
            return Ok(None);
        };
        let Some(question) = quiz.question(0) else {
            // 空题库测验：不开会话
            return Ok(None);
        };
        self.quizzes.put(user_id, QuizSession::new(quiz_id)).await;
        Ok(Some(menu::question_view(question)))
    }

    /// 测验作答：选项文本全等匹配；未命中是可恢复的协议违规，不是兜底输入
    async fn handle_quiz_answer(
        &self,
        user_id: i64,
        mut session: QuizSession,
        text: &str,
    ) -> anyhow::Result<Option<Reply>> {
        let Some(quiz) = self.catalog.quiz(session.quiz_id) else {
            self.quizzes.remove(user_id).await;
            return Ok(None);
        };
        let Some(question) = quiz.question(session.question_index) else {
            // 会话指向不存在的题：丢会话，静默丢弃
            self.quizzes.remove(user_id).await;
            return Ok(None);
        };

        let Some(score) = question.score_for(text) else {
            let options = menu::question_view(question).keyboard;
            return Ok(Some(Reply {
                text: "⚠️ Please answer with one of the options below.".to_string(),
                keyboard: options,
            }));
        };

        session.score += score;
        session.question_index += 1;

        if session.question_index >= quiz.question_count() {
            self.quizzes.remove(user_id).await;
            self.nav.put(user_id, NavState::MainMenu).await;
            let mut text = String::from("Quiz results:\n");
            if let Some(recommendation) = quiz.result_for(session.score) {
                text.push_str(recommendation);
            }
            return Ok(Some(Reply {
                text,
                keyboard: Some(menu::main_menu_keyboard()),
            }));
        }

        let reply = quiz.question(session.question_index).map(menu::question_view);
        self.quizzes.put(user_id, session).await;
        Ok(reply)
    }

    /// 兜底：原样转发给补全服务；失败以 ⚠️ 文本呈现，不重试不持久化
    async fn fallback(&self, text: &str) -> Reply {
        match self.llm.complete(text).await {
            Ok(reply) => Reply {
                text: reply,
                keyboard: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "Completion service failure");
                Reply {
                    text: format!("⚠️ Error: {}", e),
                    keyboard: None,
                }
            }
        }
    }

    /// 渲染指定导航状态的视图（正文 + 键盘）；目录解析失败返回 None
    fn view_for(&self, state: NavState, record: &ProgressRecord) -> Option<Reply> {
        let text = match state {
            NavState::MainMenu => menu::main_menu_text(),
            NavState::CourseList => menu::course_list_text(),
            NavState::QuizList => menu::quiz_list_text(),
            NavState::ModuleList { course_id } => {
                menu::module_list_text(&self.catalog.course(course_id)?.title)
            }
            NavState::LessonList {
                course_id,
                module_id,
            } => menu::lesson_list_text(self.catalog.course(course_id)?.module(module_id)?),
            NavState::LessonView {
                course_id,
                module_id,
                lesson_id,
            } => menu::lesson_text(
                self.catalog
                    .course(course_id)?
                    .module(module_id)?
                    .lesson(lesson_id)?,
            ),
        };
        Some(Reply {
            text,
            keyboard: Some(menu::keyboard_for(state, &self.catalog, record)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Course, Lesson, Module, Question, Quiz, ResultBand};
    use crate::llm::MockLlmClient;
    use crate::store::SqliteProgressStore;

    fn fixture() -> Mentor {
        let catalog = Catalog::new(
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
                        Lesson {
                            id: 3,
                            title: "L3".to_string(),
                            content: "c3".to_string(),
                            task: "t3".to_string(),
                        },
                    ],
                }],
            }],
            vec![Quiz {
                id: 1,
                title: "Path".to_string(),
                questions: vec![Question {
                    text: "Pick".to_string(),
                    options: vec!["A".to_string(), "B".to_string()],
                    scores: vec![0, 10],
                }],
                results: vec![
                    ResultBand {
                        range: "0-5".to_string(),
                        recommendation: "Low".to_string(),
                    },
                    ResultBand {
                        range: "6-10".to_string(),
                        recommendation: "High".to_string(),
                    },
                ],
            }],
        );
        let store = Arc::new(SqliteProgressStore::open_in_memory().unwrap());
        Mentor::new(catalog, store, Arc::new(MockLlmClient))
    }

    #[tokio::test]
    async fn test_unmatched_quiz_answer_is_recoverable() {
        let mentor = fixture();
        mentor.handle_message(1, "📝 Quizzes").await.unwrap();
        mentor.handle_message(1, "🧪 Path").await.unwrap();

        let reply = mentor
            .handle_message(1, "something else")
            .await
            .unwrap()
            .unwrap();
        assert!(reply.text.starts_with("⚠️"));
        // 会话仍在：正确作答继续走完
        let reply = mentor.handle_message(1, "B").await.unwrap().unwrap();
        assert!(reply.text.contains("High"));
    }

    #[tokio::test]
    async fn test_new_quiz_discards_unfinished_session() {
        let mentor = fixture();
        mentor.handle_message(1, "📝 Quizzes").await.unwrap();
        mentor.handle_message(1, "🧪 Path").await.unwrap();
        assert_eq!(mentor.quizzes.get(1).await.map(|s| s.question_index), Some(0));

        // 不作答直接重开：旧会话被静默替换
        mentor.handle_message(1, "🧪 Path").await.unwrap();
        let session = mentor.quizzes.get(1).await.unwrap();
        assert_eq!(session.question_index, 0);
        assert_eq!(session.score, 0);
    }

    #[tokio::test]
    async fn test_quiz_completion_clears_session() {
        let mentor = fixture();
        mentor.handle_message(1, "📝 Quizzes").await.unwrap();
        mentor.handle_message(1, "🧪 Path").await.unwrap();
        let reply = mentor.handle_message(1, "A").await.unwrap().unwrap();
        assert!(reply.text.contains("Low"));
        assert_eq!(mentor.quizzes.get(1).await, None);

        // 会话已销毁：同样的文本现在走兜底
        let reply = mentor.handle_message(1, "A").await.unwrap().unwrap();
        assert!(reply.text.contains("Echo from Mock"));
    }

    #[tokio::test]
    async fn test_next_lesson_increments_counter_not_viewed_lesson() {
        let mentor = fixture();
        mentor.handle_message(1, "📚 Courses").await.unwrap();
        mentor.handle_message(1, "🎓 Intro").await.unwrap();
        mentor.handle_message(1, "📦 Module 1: M1").await.unwrap();
        // 直接看第 2 课；current_lesson 计数器保持 null
        mentor.handle_message(1, "📖 Lesson 2").await.unwrap();

        // 「下一课」从计数器（null → 1）推进，渲染的是第 1 课而非第 3 课
        let reply = mentor
            .handle_message(1, "➡️ Next lesson")
            .await
            .unwrap()
            .unwrap();
        assert!(reply.text.contains("L1"));
        let record = mentor.store.get(1).unwrap().unwrap();
        assert_eq!(record.current_lesson, Some(1));
    }
}
