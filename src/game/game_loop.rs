use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use super::acquisition::{acquire_move, DEFAULT_MAX_ATTEMPTS};
use super::rules::RulesOracle;
use crate::models::{GameState, PlayerSlot};
use crate::providers::MoveProvider;
use crate::store::PersistenceSink;
use crate::stream::StateBroadcaster;

/// Pacing and retry limits for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    /// Pause after every applied move and after a finished game.
    pub turn_delay: Duration,
    /// Pause before asking the same player again after a failed turn.
    pub retry_cooldown: Duration,
    /// Provider calls allowed per turn before the cooldown kicks in.
    pub max_attempts: u32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        LoopSettings {
            turn_delay: Duration::from_secs(3),
            retry_cooldown: Duration::from_secs(5),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Where the loop is within a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnState {
    AwaitingMove(PlayerSlot),
    Applying { slot: PlayerSlot, notation: String },
    Broadcasting { snapshot: GameState, next: PlayerSlot },
    /// Holds the final snapshot; the only way out is a fresh game.
    GameOver(GameState),
}

/// Drives games between two move providers, one after another, forever.
///
/// The loop is the only owner of the live position, the move history and the
/// turn rotation. Everyone else sees immutable [`GameState`] snapshots.
pub struct GameLoop<R: RulesOracle> {
    oracle: R,
    providers: [Arc<dyn MoveProvider>; 2],
    sink: Arc<dyn PersistenceSink>,
    broadcaster: StateBroadcaster,
    settings: LoopSettings,
    history: Vec<String>,
    state: TurnState,
}

impl<R: RulesOracle> GameLoop<R> {
    pub fn new(
        oracle: R,
        white: Arc<dyn MoveProvider>,
        black: Arc<dyn MoveProvider>,
        sink: Arc<dyn PersistenceSink>,
        broadcaster: StateBroadcaster,
        settings: LoopSettings,
    ) -> Self {
        GameLoop {
            oracle,
            providers: [white, black],
            sink,
            broadcaster,
            settings,
            history: Vec::new(),
            state: TurnState::AwaitingMove(PlayerSlot::FIRST),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &TurnState {
        &self.state
    }

    #[cfg(test)]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn provider(&self, slot: PlayerSlot) -> &Arc<dyn MoveProvider> {
        &self.providers[slot.index()]
    }

    /// Plays games until the process stops.
    pub async fn run(mut self) {
        self.new_game();
        loop {
            self.step().await;
        }
    }

    /// Performs one state transition.
    pub async fn step(&mut self) {
        let state = std::mem::replace(&mut self.state, TurnState::AwaitingMove(PlayerSlot::FIRST));

        self.state = match state {
            TurnState::AwaitingMove(slot) => self.await_move(slot).await,
            TurnState::Applying { slot, notation } => self.apply(slot, notation).await,
            TurnState::Broadcasting { snapshot, next } => {
                self.broadcaster.publish(snapshot);
                tokio::time::sleep(self.settings.turn_delay).await;
                TurnState::AwaitingMove(next)
            }
            TurnState::GameOver(snapshot) => {
                info!("Game over. Outcome: {}", snapshot.outcome.as_str());
                self.broadcaster.publish(snapshot);
                tokio::time::sleep(self.settings.turn_delay).await;
                info!("Starting a new game...");
                self.new_game();
                TurnState::AwaitingMove(PlayerSlot::FIRST)
            }
        };
    }

    async fn await_move(&mut self, slot: PlayerSlot) -> TurnState {
        let provider = Arc::clone(self.provider(slot));
        info!(
            "Starting move {} for player {}",
            self.history.len() + 1,
            provider.name()
        );

        match acquire_move(
            slot,
            provider.as_ref(),
            &self.oracle,
            &self.history,
            self.settings.max_attempts,
        )
        .await
        {
            Ok(notation) => TurnState::Applying { slot, notation },
            Err(e) => {
                warn!(
                    "Error making move for {}: {}; retrying in {:?}",
                    provider.name(),
                    e,
                    self.settings.retry_cooldown
                );
                tokio::time::sleep(self.settings.retry_cooldown).await;
                TurnState::AwaitingMove(slot)
            }
        }
    }

    async fn apply(&mut self, slot: PlayerSlot, notation: String) -> TurnState {
        let outcome = match self.oracle.apply(&notation) {
            Ok(outcome) => outcome,
            Err(e) => {
                // Acquisition checked this move against the same position
                error!("Validated move rejected on apply: {}", e);
                return TurnState::AwaitingMove(slot);
            }
        };

        let player = self.provider(slot).name().to_string();
        info!("Applied move {} for {}", notation, player);
        self.history.push(notation.clone());

        let snapshot = GameState::after_move(
            self.oracle.position(),
            &notation,
            &player,
            &self.history,
            outcome,
        );
        let snapshot = self.persist(snapshot).await;

        if outcome.is_terminal() {
            TurnState::GameOver(snapshot)
        } else {
            TurnState::Broadcasting {
                snapshot,
                next: slot.other(),
            }
        }
    }

    /// Writes the snapshot and stamps it with its row id. A failed write is
    /// reported and the unstamped snapshot goes on to the observers anyway.
    async fn persist(&self, snapshot: GameState) -> GameState {
        match self.sink.record(&snapshot).await {
            Ok(id) => {
                info!("{} played: {}", snapshot.last_player, snapshot.last_move);
                snapshot.with_id(id)
            }
            Err(e) => {
                error!("Error saving game state: {}", e);
                snapshot
            }
        }
    }

    fn new_game(&mut self) {
        self.oracle.reset();
        self.history.clear();
        self.broadcaster.publish(GameState::fresh(self.oracle.position()));
    }
}
