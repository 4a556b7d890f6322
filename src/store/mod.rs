use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use diesel::prelude::*;
use log::{debug, info};

use crate::error::PersistenceError;
use crate::models::GameState;

pub mod models;
pub mod schema;

pub use models::NewGameStateRow;

const CREATE_GAME_STATES: &str = "CREATE TABLE IF NOT EXISTS game_states (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    fen TEXT NOT NULL,
    last_move TEXT NOT NULL,
    last_player TEXT NOT NULL,
    move_history TEXT NOT NULL,
    game_outcome TEXT,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

/// Append-only destination for snapshots.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Stores one snapshot and returns the id the store assigned to it.
    async fn record(&self, state: &GameState) -> Result<i64, PersistenceError>;
}

/// [`PersistenceSink`] writing to a SQLite `game_states` table.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<SqliteConnection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `database_url` and makes sure the
    /// table exists.
    pub fn open(database_url: &str) -> Result<Self, PersistenceError> {
        info!("Opening game store at {}", database_url);
        let mut conn = SqliteConnection::establish(database_url)?;
        diesel::sql_query(CREATE_GAME_STATES).execute(&mut conn)?;
        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn insert(conn: &Mutex<SqliteConnection>, row: &NewGameStateRow) -> Result<i64, PersistenceError> {
        let mut conn = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let id: i32 = diesel::insert_into(schema::game_states::table)
            .values(row)
            .returning(schema::game_states::id)
            .get_result(&mut *conn)?;
        Ok(i64::from(id))
    }
}

#[async_trait]
impl PersistenceSink for SqliteStore {
    async fn record(&self, state: &GameState) -> Result<i64, PersistenceError> {
        let row = NewGameStateRow::from(state);
        let conn = Arc::clone(&self.conn);

        let id = tokio::task::spawn_blocking(move || Self::insert(&conn, &row)).await??;
        debug!("Stored game state {} ({} moves)", id, state.move_history.len());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;
    use chrono::NaiveDateTime;

    #[derive(Queryable, Debug)]
    struct StoredRow {
        id: i32,
        fen: String,
        last_move: String,
        last_player: String,
        move_history: String,
        game_outcome: Option<String>,
        _created_at: NaiveDateTime,
    }

    fn stored_rows(store: &SqliteStore) -> Vec<StoredRow> {
        let mut conn = store.conn.lock().unwrap();
        schema::game_states::table
            .order(schema::game_states::id.asc())
            .load::<StoredRow>(&mut *conn)
            .unwrap()
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let db = tempfile::NamedTempFile::new().unwrap();
        let store = SqliteStore::open(db.path().to_str().unwrap()).unwrap();

        let first = vec!["e4".to_string()];
        let second = vec!["e4".to_string(), "e5".to_string()];
        let a = GameState::after_move("fen1".into(), "e4", "openai", &first, Outcome::InProgress);
        let b = GameState::after_move("fen2".into(), "e5", "anthropic", &second, Outcome::InProgress);

        let id_a = store.record(&a).await.unwrap();
        let id_b = store.record(&b).await.unwrap();
        assert!(id_b > id_a);

        let rows = stored_rows(&store);
        assert_eq!(rows.len(), 2);
        assert_eq!(i64::from(rows[1].id), id_b);
        assert_eq!(rows[1].fen, "fen2");
        assert_eq!(rows[1].last_move, "e5");
        assert_eq!(rows[1].last_player, "anthropic");
        assert_eq!(rows[1].move_history, "e4,e5");
        assert_eq!(rows[1].game_outcome, None);
    }

    #[tokio::test]
    async fn terminal_snapshot_stores_outcome() {
        let store = SqliteStore::open(":memory:").unwrap();
        let history = vec!["f3".into(), "e5".into(), "g4".into(), "Qh4#".into()];
        let state = GameState::after_move("fen".into(), "Qh4#", "anthropic", &history, Outcome::BlackWins);

        store.record(&state).await.unwrap();

        let rows = stored_rows(&store);
        assert_eq!(rows[0].game_outcome.as_deref(), Some("0-1"));
    }

    #[test]
    fn reopening_keeps_existing_rows() {
        let db = tempfile::NamedTempFile::new().unwrap();
        let path = db.path().to_str().unwrap().to_string();

        let store = SqliteStore::open(&path).unwrap();
        let row = NewGameStateRow::from(&GameState::fresh("fen".into()));
        SqliteStore::insert(&store.conn, &row).unwrap();
        drop(store);

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(stored_rows(&reopened).len(), 1);
    }
}
