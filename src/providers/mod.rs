use async_trait::async_trait;

use crate::error::ProviderError;

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

pub const SYSTEM_PROMPT: &str =
    "You are an expert chess player. Provide only valid chess moves in standard algebraic notation.";

/// Everything a provider is told about the position it has to move in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub fen: String,
    pub history: Vec<String>,
    /// Set on every attempt after the first.
    pub is_retry: bool,
    /// Text the oracle rejected on an earlier attempt this turn.
    pub rejected_move: Option<String>,
}

impl MoveRequest {
    pub fn first(fen: &str, history: &[String]) -> Self {
        MoveRequest {
            fen: fen.to_string(),
            history: history.to_vec(),
            is_retry: false,
            rejected_move: None,
        }
    }

    /// User message shared by every provider integration.
    pub fn prompt(&self) -> String {
        let retry = match (&self.rejected_move, self.is_retry) {
            (Some(mv), _) => format!(
                "Your previous move '{}' was invalid. Please try again with a valid move. ",
                mv
            ),
            (None, true) => "Your previous attempt failed. Please try again with a valid move. ".to_string(),
            (None, false) => String::new(),
        };

        format!(
            "{}You are playing a game of chess. The current board state in FEN notation is:\n\
             {}\n\n\
             The move history (in algebraic notation) is:\n\
             {}\n\n\
             Please provide your next move in standard algebraic notation (e.g., \"e4\", \"Nf3\", \"O-O\").\n\
             Your move must be legal according to the current board state and chess rules.\n\
             Respond with only the move, nothing else.",
            retry,
            self.fen,
            self.history.join(", ")
        )
    }
}

/// An external service that proposes moves for one player slot.
#[async_trait]
pub trait MoveProvider: Send + Sync {
    /// Name recorded as `lastPlayer` on snapshots.
    fn name(&self) -> &str;

    async fn request_move(&self, request: &MoveRequest) -> Result<String, ProviderError>;
}

/// Strips the decoration chat models tend to put around a bare move:
/// quotes, a leading move number, trailing full stops and annotation glyphs.
pub fn normalize_move(raw: &str) -> String {
    let mut text = raw.trim().trim_matches(['"', '\'', '`']).trim();

    // "1. e4", "12... Nf6"
    if let Some((prefix, rest)) = text.split_once('.') {
        if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) {
            text = rest.trim_start_matches('.').trim();
        }
    }

    text.split_whitespace()
        .next()
        .unwrap_or("")
        .trim_end_matches(['.', '!', '?', ','])
        .to_string()
}
