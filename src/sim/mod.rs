//! Gameplay simulation
//!
//! All gameplay logic lives here. This module must stay platform-free:
//! - Time only advances through `Session::advance`
//! - Seeded RNG only
//! - No rendering or DOM dependencies

pub mod scheduler;
pub mod session;
pub mod state;
pub mod target;

pub use scheduler::{TaskId, TaskQueue};
pub use session::{Session, SessionEvent, SessionTask};
pub use state::{
    GamePhase, GameState, PlayArea, TARGET_PALETTES, Target, TargetShape, round_budget_ms,
};
pub use target::generate_target;
