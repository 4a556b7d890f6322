pub mod acquisition;
pub mod game_loop;
pub mod rules;

pub use game_loop::{GameLoop, LoopSettings};
pub use rules::ChessRules;
