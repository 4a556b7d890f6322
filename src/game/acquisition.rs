use log::{info, warn};

use super::rules::RulesOracle;
use crate::error::MoveAcquisitionExhausted;
use crate::models::PlayerSlot;
use crate::providers::{MoveProvider, MoveRequest};

/// Attempts per turn before the loop backs off.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Asks `provider` for a move until the oracle accepts one, at most
/// `max_attempts` times.
///
/// The returned notation has been checked against the current position but not
/// played; applying it is the caller's job.
pub async fn acquire_move<R>(
    slot: PlayerSlot,
    provider: &dyn MoveProvider,
    oracle: &R,
    history: &[String],
    max_attempts: u32,
) -> Result<String, MoveAcquisitionExhausted>
where
    R: RulesOracle + ?Sized,
{
    let mut request = MoveRequest::first(&oracle.position(), history);

    for attempt in 1..=max_attempts {
        request.is_retry = attempt > 1;

        let notation = match provider.request_move(&request).await {
            Ok(notation) => notation,
            Err(e) => {
                warn!(
                    "Error getting move from {} (attempt {}): {}",
                    provider.name(),
                    attempt,
                    e
                );
                continue;
            }
        };
        info!("Received move from {}: {}", provider.name(), notation);

        match oracle.check(&notation) {
            Ok(()) => return Ok(notation),
            Err(e) => {
                warn!("Invalid move by {}: {}", provider.name(), e);
                request.rejected_move = Some(notation);
            }
        }
    }

    Err(MoveAcquisitionExhausted {
        slot,
        attempts: max_attempts,
    })
}
