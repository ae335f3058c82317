//! 聊天平台接入：Telegram Bot API（长轮询）

pub mod telegram;

pub use telegram::TelegramBot;
