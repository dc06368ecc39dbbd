// Wire protocol DTOs and conversions for the session WebSocket.

use crate::domain::tuning::Difficulty;
use crate::domain::{GameState, SideEffect};
use crate::use_cases::{ControlScheme, FrameUpdate, FrameView, SessionCommand};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Sent once after the upgrade so the client can correlate logs and settings.
    Welcome(WelcomeDto),
    // Snapshot of the world for a given tick.
    Frame(Box<FrameDto>),
    // Audio cue or screen shake request.
    Cue(SideEffect),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    KeyDown { key: String },
    KeyUp { key: String },
    PointerMove { x: f32, y: f32 },
    ScreenPointer {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    PointerDown,
    Visibility { visible: bool },
}

impl From<ClientMessage> for SessionCommand {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::KeyDown { key } => SessionCommand::KeyDown { key },
            ClientMessage::KeyUp { key } => SessionCommand::KeyUp { key },
            ClientMessage::PointerMove { x, y } => SessionCommand::PointerMove { x, y },
            ClientMessage::ScreenPointer {
                x,
                y,
                width,
                height,
            } => SessionCommand::ScreenPointer {
                x,
                y,
                width,
                height,
            },
            ClientMessage::PointerDown => SessionCommand::PointerDown,
            ClientMessage::Visibility { visible } => SessionCommand::Visibility { visible },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WelcomeDto {
    pub session_id: String,
    pub difficulty: Difficulty,
    pub controls: ControlScheme,
}

/// Full snapshot plus the derived view fields the renderer needs.
#[derive(Debug, Clone, Serialize)]
pub struct FrameDto {
    pub tick: u64,
    pub state: GameState,
    pub view: FrameView,
}

impl From<FrameUpdate> for FrameDto {
    fn from(update: FrameUpdate) -> Self {
        Self {
            tick: update.tick,
            state: update.state,
            view: update.view,
        }
    }
}
