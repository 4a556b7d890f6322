use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the two fixed roles that alternate turns
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlayerSlot {
    White,
    Black,
}

impl PlayerSlot {
    /// The slot that opens every game.
    pub const FIRST: PlayerSlot = PlayerSlot::White;

    pub fn other(self) -> PlayerSlot {
        match self {
            PlayerSlot::White => PlayerSlot::Black,
            PlayerSlot::Black => PlayerSlot::White,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerSlot::White => 0,
            PlayerSlot::Black => 1,
        }
    }
}

impl std::fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerSlot::White => write!(f, "white"),
            PlayerSlot::Black => write!(f, "black"),
        }
    }
}

/// Game result, serialized with PGN result tokens
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    #[serde(rename = "*")]
    InProgress,
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2")]
    Draw,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::InProgress => "*",
            Outcome::WhiteWins => "1-0",
            Outcome::BlackWins => "0-1",
            Outcome::Draw => "1/2-1/2",
        }
    }
}

/// Immutable snapshot of the game after an applied move, or at the start of a game.
///
/// Built only by the game loop; everything downstream (store, broadcaster, SSE
/// observers) receives it read-only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Row id assigned by the store, 0 when never persisted.
    pub id: i64,
    pub fen: String,
    pub last_move: String,
    pub last_player: String,
    pub created_at: DateTime<Utc>,
    pub move_history: Vec<String>,
    #[serde(rename = "gameOutcome")]
    pub outcome: Outcome,
}

impl GameState {
    /// Snapshot taken right after `last_move` was applied by `last_player`.
    pub fn after_move(
        fen: String,
        last_move: &str,
        last_player: &str,
        move_history: &[String],
        outcome: Outcome,
    ) -> Self {
        GameState {
            id: 0,
            fen,
            last_move: last_move.to_string(),
            last_player: last_player.to_string(),
            created_at: Utc::now(),
            move_history: move_history.to_vec(),
            outcome,
        }
    }

    /// Snapshot of a freshly initialised game: no moves, nobody has played.
    pub fn fresh(fen: String) -> Self {
        GameState {
            id: 0,
            fen,
            last_move: String::new(),
            last_player: String::new(),
            created_at: Utc::now(),
            move_history: Vec::new(),
            outcome: Outcome::InProgress,
        }
    }

    /// Same snapshot, stamped with the id the store assigned to it.
    pub fn with_id(self, id: i64) -> Self {
        GameState { id, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_flat_camel_case_record() {
        let history = vec!["e4".to_string(), "e5".to_string()];
        let state = GameState::after_move(
            "fen".to_string(),
            "e5",
            "anthropic",
            &history,
            Outcome::InProgress,
        )
        .with_id(7);

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["lastMove"], "e5");
        assert_eq!(json["lastPlayer"], "anthropic");
        assert_eq!(json["moveHistory"], serde_json::json!(["e4", "e5"]));
        assert_eq!(json["gameOutcome"], "*");
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn terminal_outcomes_use_result_tokens() {
        assert_eq!(serde_json::to_value(Outcome::WhiteWins).unwrap(), "1-0");
        assert_eq!(serde_json::to_value(Outcome::Draw).unwrap(), "1/2-1/2");
        assert!(Outcome::BlackWins.is_terminal());
        assert!(!Outcome::InProgress.is_terminal());
    }

    #[test]
    fn fresh_snapshot_has_no_moves() {
        let state = GameState::fresh("start".to_string());
        assert!(state.move_history.is_empty());
        assert_eq!(state.last_move, "");
        assert_eq!(state.last_player, "");
        assert_eq!(state.outcome, Outcome::InProgress);
    }

    #[test]
    fn slots_alternate() {
        assert_eq!(PlayerSlot::FIRST, PlayerSlot::White);
        assert_eq!(PlayerSlot::White.other(), PlayerSlot::Black);
        assert_eq!(PlayerSlot::Black.other(), PlayerSlot::White);
    }
}
