// Use cases layer: the match session and the loop that drives it.

pub mod game;
pub mod input;
pub mod types;

pub use game::{Engine, TickReport, world_task};
pub use input::ControlScheme;
pub use types::{
    Clock, EffectError, EffectSink, FrameUpdate, FrameView, ManualClock, SessionCommand,
    SessionOutput, SystemClock,
};
