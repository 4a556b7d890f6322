//! Test doubles for the game loop's collaborators.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{PersistenceError, ProviderError};
use crate::models::GameState;
use crate::providers::{MoveProvider, MoveRequest};
use crate::store::PersistenceSink;

pub enum Reply {
    Move(&'static str),
    Fail,
}

/// Answers from a fixed script, then fails forever.
pub struct ScriptedProvider {
    name: &'static str,
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<MoveRequest>>,
}

impl ScriptedProvider {
    pub fn new(name: &'static str, replies: Vec<Reply>) -> Self {
        ScriptedProvider {
            name,
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<MoveRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MoveProvider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn request_move(&self, request: &MoveRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Move(mv)) => Ok(mv.to_string()),
            Some(Reply::Fail) | None => Err(ProviderError::Empty {
                provider: "scripted",
            }),
        }
    }
}

/// Keeps every snapshot it is handed; optionally refuses to store them.
pub struct RecordingSink {
    fail: bool,
    records: Mutex<Vec<GameState>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink {
            fail: false,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        RecordingSink {
            fail: true,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<GameState> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersistenceSink for RecordingSink {
    async fn record(&self, state: &GameState) -> Result<i64, PersistenceError> {
        let mut records = self.records.lock().unwrap();
        records.push(state.clone());
        if self.fail {
            return Err(PersistenceError::Query(diesel::result::Error::NotFound));
        }
        Ok(records.len() as i64)
    }
}
