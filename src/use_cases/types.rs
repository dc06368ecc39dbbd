// Use-case level inputs/outputs for one match session, and the ports it talks through.

use crate::domain::{GameState, Millis, SideEffect};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;

/// Edge events from the host's input devices.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    KeyDown { key: String },
    KeyUp { key: String },
    /// Pointer already in arena coordinates.
    PointerMove { x: f32, y: f32 },
    /// Pointer on the displayed surface, rescaled to the logical arena.
    ScreenPointer {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    PointerDown,
    Visibility { visible: bool },
}

/// Read-only values derived for the renderer's camera and cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameView {
    pub cursor_shooting: bool,
    pub last_stand_tint: f32,
    pub time_stop_progress: f32,
    pub mastery_visible: bool,
}

#[derive(Debug, Clone)]
pub struct FrameUpdate {
    pub tick: u64,
    pub state: GameState,
    pub view: FrameView,
}

/// Everything a session publishes, in delivery order.
#[derive(Debug, Clone)]
pub enum SessionOutput {
    Effect(SideEffect),
    Frame(Box<FrameUpdate>),
}

/// Wall-clock source. The session reads it once per tick.
pub trait Clock: Send + Sync {
    fn now(&self) -> Millis;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as Millis)
            .unwrap_or_default()
    }
}

/// Clock driven by hand, for scripted timelines.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self(AtomicU64::new(start))
    }

    pub fn set(&self, now: Millis) {
        self.0.store(now, Ordering::Relaxed);
    }

    pub fn advance(&self, by: Millis) {
        self.0.fetch_add(by, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectError {
    Full,
    Closed,
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectError::Full => write!(f, "effect sink is full"),
            EffectError::Closed => write!(f, "effect sink is closed"),
        }
    }
}

impl std::error::Error for EffectError {}

/// Where a session's frames and side effects go. Failures never reach the simulation.
pub trait EffectSink: Send {
    fn deliver(&mut self, output: SessionOutput) -> Result<(), EffectError>;
}

impl EffectSink for mpsc::Sender<SessionOutput> {
    fn deliver(&mut self, output: SessionOutput) -> Result<(), EffectError> {
        self.try_send(output).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => EffectError::Full,
            mpsc::error::TrySendError::Closed(_) => EffectError::Closed,
        })
    }
}
