use std::time::Duration;

use crate::stream::StateBroadcaster;

/// Application state shared between connections
pub struct AppState {
    pub broadcaster: StateBroadcaster,
    /// Idle interval after which an observer gets a keep-alive comment
    pub keep_alive: Duration,
}

impl AppState {
    pub fn new(broadcaster: StateBroadcaster, keep_alive: Duration) -> Self {
        AppState {
            broadcaster,
            keep_alive,
        }
    }
}
