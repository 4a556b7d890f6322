pub mod broadcaster;
pub mod handler;

pub use broadcaster::StateBroadcaster;
pub use handler::game_state_events;
