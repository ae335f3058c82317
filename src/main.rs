//! Mentor - Rust 课程导师机器人
//!
//! 入口：初始化日志、加载配置与内容目录、打开进度库，启动 Telegram 轮询。

use std::sync::Arc;

use anyhow::Context;
use mentor::bot::Mentor;
use mentor::catalog::Catalog;
use mentor::config::load_config;
use mentor::integrations::TelegramBot;
use mentor::llm::OpenAiClient;
use mentor::store::SqliteProgressStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let cfg = load_config(None).context("Failed to load config")?;

    let catalog = Catalog::load(&cfg.content.courses_path, &cfg.content.quizzes_path)
        .context("Failed to load content catalog")?;
    let store = SqliteProgressStore::open(&cfg.database.path)
        .context("Failed to open progress database")?;

    let llm = OpenAiClient::new(
        cfg.llm.base_url.as_deref(),
        &cfg.llm.model,
        None,
        cfg.llm.temperature,
        cfg.llm.max_tokens,
    );

    let token = std::env::var("TG_BOT_TOKEN").context("TG_BOT_TOKEN is not set")?;

    let mentor = Arc::new(Mentor::new(catalog, Arc::new(store), Arc::new(llm)));
    TelegramBot::new(&token, mentor, cfg.telegram.poll_timeout_secs)
        .run()
        .await
        .context("Bot run failed")?;

    Ok(())
}
