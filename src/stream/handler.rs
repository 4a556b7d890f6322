use actix_web::http::header;
use actix_web::web::{self, Bytes};
use actix_web::HttpResponse;
use futures::Stream;
use log::{info, warn};
use std::convert::Infallible;
use std::time::Duration;
use uuid::Uuid;

use super::broadcaster::Subscription;
use crate::models::{AppState, GameState};

const KEEP_ALIVE_FRAME: &[u8] = b": keep-alive\n\n";

/// Logs the end of an observer connection, however the stream was dropped.
struct ConnectionGuard {
    id: String,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        info!("SSE connection closed: {}", self.id);
    }
}

enum Next {
    State(Option<GameState>),
    KeepAlive,
}

/// Serializes one snapshot as a single SSE `data` frame.
pub fn encode_event(state: &GameState) -> serde_json::Result<Bytes> {
    let json = serde_json::to_string(state)?;
    Ok(Bytes::from(format!("data: {}\n\n", json)))
}

/// Frames for one observer: every snapshot it receives, plus a comment line
/// whenever `keep_alive` passes without traffic so dead peers get noticed.
pub fn event_stream(
    connection_id: String,
    mut subscription: Subscription,
    keep_alive: Duration,
) -> impl Stream<Item = Result<Bytes, Infallible>> {
    let guard = ConnectionGuard { id: connection_id };

    async_stream::stream! {
        let _guard = guard;
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + keep_alive, keep_alive);

        loop {
            let next = tokio::select! {
                state = subscription.next() => Next::State(state),
                _ = ticker.tick() => Next::KeepAlive,
            };

            match next {
                Next::State(Some(state)) => match encode_event(&state) {
                    Ok(frame) => {
                        ticker.reset();
                        yield Ok::<_, Infallible>(frame);
                    }
                    Err(e) => warn!("Error marshaling game state: {}", e),
                },
                Next::State(None) => {
                    info!("Game state channel closed");
                    break;
                }
                Next::KeepAlive => yield Ok::<_, Infallible>(Bytes::from_static(KEEP_ALIVE_FRAME)),
            }
        }
    }
}

/// GET /api/chess-game-state
pub async fn game_state_events(app_state: web::Data<AppState>) -> HttpResponse {
    let id = Uuid::new_v4().to_string();
    let subscription = app_state.broadcaster.subscribe();
    info!(
        "New SSE connection established: {} ({} observers)",
        id,
        app_state.broadcaster.observer_count()
    );

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(event_stream(id, subscription, app_state.keep_alive))
}
