pub mod app_state;
pub mod game_state;

// Re-export model types
pub use app_state::*;
pub use game_state::*;
