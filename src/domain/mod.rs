// Domain layer: core simulation types and rules.

pub mod abilities;
pub mod cues;
pub mod geometry;
pub mod input;
pub mod memory;
pub mod pathfinding;
pub mod state;
pub mod status;
pub mod systems;
pub mod tuning;

/// Wall-clock milliseconds. Every timer in the simulation compares against one `now` per tick.
pub type Millis = u64;

/// Match-stable actor identity.
pub type ActorId = u64;

pub use cues::{Cue, SideEffect};
pub use input::PlayerInput;
pub use memory::EngineMemory;
pub use state::GameState;
pub use systems::{Rules, TickOutcome, advance};
