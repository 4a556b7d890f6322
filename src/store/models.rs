use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::schema::game_states;
use crate::models::GameState;

/// Separator for `move_history`; SAN never contains a comma.
pub const HISTORY_SEPARATOR: &str = ",";

/// One row of `game_states`, as written.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = game_states)]
pub struct NewGameStateRow {
    pub fen: String,
    pub last_move: String,
    pub last_player: String,
    pub move_history: String,
    pub game_outcome: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<&GameState> for NewGameStateRow {
    fn from(state: &GameState) -> Self {
        NewGameStateRow {
            fen: state.fen.clone(),
            last_move: state.last_move.clone(),
            last_player: state.last_player.clone(),
            move_history: state.move_history.join(HISTORY_SEPARATOR),
            // NULL until the game has a result
            game_outcome: state
                .outcome
                .is_terminal()
                .then(|| state.outcome.as_str().to_string()),
            created_at: state.created_at.naive_utc(),
        }
    }
}
