use crate::models::PlayerSlot;

/// A move provider failed to produce any text.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("malformed response from {provider}: {reason}")]
    Malformed {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} returned an empty completion")]
    Empty { provider: &'static str },
}

/// The rules oracle rejected a move for the current position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal move '{notation}' in position {fen}")]
pub struct IllegalMoveError {
    pub notation: String,
    pub fen: String,
}

/// Every attempt to obtain a legal move from a provider failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no valid move from {slot} after {attempts} attempts")]
pub struct MoveAcquisitionExhausted {
    pub slot: PlayerSlot,
    pub attempts: u32,
}

/// Writing a snapshot to the store failed.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("database connection failed: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("blocking write task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
