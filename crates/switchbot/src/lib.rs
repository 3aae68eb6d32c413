//! Client for the SwitchBot v1.1 cloud API.
//!
//! <https://github.com/OpenWonderLabs/SwitchBotAPI>

pub mod api;
pub mod error;

mod client;
pub use client::SwitchBot;

/// Base origin every request path is resolved against.
pub const API_ORIGIN: &str = "https://api.switch-bot.com";
