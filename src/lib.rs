//! Mentor - Rust 课程导师机器人
//!
//! 模块划分：
//! - **bot**: 消息分发器（命令 / 菜单 / 测验 / 兜底）
//! - **catalog**: 内容目录（课程树 + 测验题库，启动时一次性加载）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **integrations**: 聊天平台接入（Telegram 长轮询）
//! - **llm**: 补全服务客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **menu**: 菜单视图与类型化动作
//! - **session**: 进程内易失会话（导航状态、测验会话）
//! - **store**: 用户进度持久化（SQLite）

pub mod bot;
pub mod catalog;
pub mod config;
pub mod integrations;
pub mod llm;
pub mod menu;
pub mod session;
pub mod store;
