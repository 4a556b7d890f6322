use clap::Parser;
use std::time::Duration;

use crate::game::LoopSettings;
use crate::stream::broadcaster::DEFAULT_CAPACITY;

/// Startup parameters, read from flags or the environment (and `.env`).
#[derive(Parser, Debug, Clone)]
#[command(name = "chess_arena")]
#[command(about = "Two LLM move providers play chess against each other; observers watch over SSE")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind the server to
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind: String,

    /// Comma-separated origins allowed to open the event stream cross-origin
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "")]
    pub allowed_origins: String,

    /// SQLite database file
    #[arg(long, env = "DATABASE_URL", default_value = "./chess.db")]
    pub database_url: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4")]
    pub openai_model: String,

    #[arg(long, env = "ANTHROPIC_MODEL", default_value = "claude-3-opus-20240229")]
    pub anthropic_model: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com")]
    pub openai_base_url: String,

    #[arg(long, env = "ANTHROPIC_BASE_URL", default_value = "https://api.anthropic.com")]
    pub anthropic_base_url: String,

    /// Seconds to pause after each move and after a finished game
    #[arg(long, env = "TURN_DELAY_SECS", default_value_t = 3)]
    pub turn_delay_secs: u64,

    /// Seconds to wait before asking a player again after it failed a turn
    #[arg(long, env = "RETRY_COOLDOWN_SECS", default_value_t = 5)]
    pub retry_cooldown_secs: u64,

    /// Attempts a provider gets per turn
    #[arg(long, env = "MAX_MOVE_ATTEMPTS", default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Snapshots buffered per observer before the oldest are dropped
    #[arg(long, env = "BROADCAST_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub broadcast_capacity: usize,

    /// Per-request timeout for provider calls
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value_t = 30)]
    pub provider_timeout_secs: u64,

    /// Idle seconds before an observer is sent a keep-alive comment
    #[arg(long, env = "KEEP_ALIVE_SECS", default_value_t = 15)]
    pub keep_alive_secs: u64,
}

impl Config {
    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            turn_delay: Duration::from_secs(self.turn_delay_secs),
            retry_cooldown: Duration::from_secs(self.retry_cooldown_secs),
            max_attempts: self.max_attempts,
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs.max(1))
    }

    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}
