use log::{debug, warn};
use tokio::sync::broadcast;

use crate::models::GameState;

/// Snapshots kept for a slow observer before it starts losing the oldest ones.
pub const DEFAULT_CAPACITY: usize = 100;

/// Process-wide fan-out point from the game loop to live observers.
///
/// Publishing never waits on observers. Each subscription drains its own view
/// of the feed and only sees what was published after it subscribed.
#[derive(Clone)]
pub struct StateBroadcaster {
    tx: broadcast::Sender<GameState>,
}

impl StateBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        StateBroadcaster { tx }
    }

    /// Queues `state` for every current observer and returns how many there were.
    pub fn publish(&self, state: GameState) -> usize {
        match self.tx.send(state) {
            Ok(observers) => {
                debug!("Sent game state update to {} observer(s)", observers);
                observers
            }
            Err(_) => {
                debug!("No observers connected, skipped sending update");
                0
            }
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One observer's position in the feed. Dropping it unregisters the observer.
pub struct Subscription {
    rx: broadcast::Receiver<GameState>,
}

impl Subscription {
    /// Next snapshot in publish order, or `None` once the broadcaster is gone.
    ///
    /// Snapshots this observer fell too far behind on are skipped.
    pub async fn next(&mut self) -> Option<GameState> {
        loop {
            match self.rx.recv().await {
                Ok(state) => return Some(state),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Observer lagged behind, {} game state update(s) dropped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;

    fn snapshot(n: usize) -> GameState {
        let history: Vec<String> = (0..n).map(|i| format!("m{}", i)).collect();
        GameState::after_move(
            format!("fen{}", n),
            history.last().map(String::as_str).unwrap_or(""),
            "openai",
            &history,
            Outcome::InProgress,
        )
    }

    #[test]
    fn publishing_without_observers_is_a_no_op() {
        let broadcaster = StateBroadcaster::new(4);
        assert_eq!(broadcaster.publish(snapshot(1)), 0);
        assert_eq!(broadcaster.publish(snapshot(2)), 0);
        assert_eq!(broadcaster.observer_count(), 0);
    }

    #[tokio::test]
    async fn late_observer_sees_only_later_snapshots() {
        let broadcaster = StateBroadcaster::new(8);
        broadcaster.publish(snapshot(1));

        let mut sub = broadcaster.subscribe();
        broadcaster.publish(snapshot(2));

        assert_eq!(sub.next().await.unwrap().fen, "fen2");
    }

    #[tokio::test]
    async fn concurrent_observers_see_identical_order() {
        let broadcaster = StateBroadcaster::new(16);
        let mut a = broadcaster.subscribe();
        let mut b = broadcaster.subscribe();

        for n in 1..=5 {
            assert_eq!(broadcaster.publish(snapshot(n)), 2);
        }

        for n in 1..=5 {
            let expected = format!("fen{}", n);
            assert_eq!(a.next().await.unwrap().fen, expected);
            assert_eq!(b.next().await.unwrap().fen, expected);
        }
    }

    #[tokio::test]
    async fn slow_observer_skips_overflow_without_blocking_others() {
        let broadcaster = StateBroadcaster::new(2);
        let mut slow = broadcaster.subscribe();
        let mut fast = broadcaster.subscribe();

        for n in 1..=5 {
            broadcaster.publish(snapshot(n));
            assert_eq!(fast.next().await.unwrap().fen, format!("fen{}", n));
        }

        // Only the newest two survive, still in order
        assert_eq!(slow.next().await.unwrap().fen, "fen4");
        assert_eq!(slow.next().await.unwrap().fen, "fen5");
    }

    #[tokio::test]
    async fn dropped_subscription_unregisters() {
        let broadcaster = StateBroadcaster::new(4);
        let sub = broadcaster.subscribe();
        assert_eq!(broadcaster.observer_count(), 1);
        drop(sub);
        assert_eq!(broadcaster.publish(snapshot(1)), 0);
    }

    #[tokio::test]
    async fn subscription_ends_when_broadcaster_is_dropped() {
        let broadcaster = StateBroadcaster::new(4);
        let mut sub = broadcaster.subscribe();
        drop(broadcaster);
        assert!(sub.next().await.is_none());
    }
}
