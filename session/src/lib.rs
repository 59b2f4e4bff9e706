//! Everything between the board engine and the chat platform: who is playing
//! what, what they achieved, and what gets stored.

pub use error::*;
pub use leaderboard::*;
pub use play::*;
pub use registry::*;
pub use service::*;
pub use settings::*;
pub use stats::*;
pub use store::*;

mod error;
mod leaderboard;
mod play;
mod registry;
mod service;
mod settings;
mod stats;
mod store;

/// Platform user id.
pub type UserId = String;
