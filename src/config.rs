//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `MENTOR__*` 覆盖（双下划线表示嵌套，
//! 如 `MENTOR__LLM__MODEL=gpt-4o-mini`）。密钥只从环境读取：
//! TG_BOT_TOKEN（Telegram）、OPENAI_API_KEY（补全服务）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub content: ContentSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub telegram: TelegramSection,
    #[serde(default)]
    pub llm: LlmSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content: ContentSection::default(),
            database: DatabaseSection::default(),
            telegram: TelegramSection::default(),
            llm: LlmSection::default(),
        }
    }
}

/// [content] 段：课程树与测验题库文档路径
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentSection {
    pub courses_path: PathBuf,
    pub quizzes_path: PathBuf,
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            courses_path: PathBuf::from("content/courses.json"),
            quizzes_path: PathBuf::from("content/quizzes.json"),
        }
    }
}

/// [database] 段：SQLite 文件路径
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: PathBuf,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("users.db"),
        }
    }
}

/// [telegram] 段：长轮询超时；Bot Token 走 TG_BOT_TOKEN 环境变量
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    pub poll_timeout_secs: u64,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            poll_timeout_secs: 30,
        }
    }
}

/// [llm] 段：兜底补全的端点与请求参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// OpenAI 兼容端点；None 用官方默认
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// 从 config 目录加载配置，环境变量 MENTOR__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 MENTOR__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("MENTOR")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.model, "gpt-3.5-turbo");
        assert_eq!(cfg.llm.max_tokens, 500);
        assert_eq!(cfg.telegram.poll_timeout_secs, 30);
        assert_eq!(cfg.content.courses_path, PathBuf::from("content/courses.json"));
    }
}
