// Key bindings: maps raw key names from the host onto game actions.

use crate::domain::abilities::AbilityId;
use serde::Serialize;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ControlScheme {
    #[default]
    Wasd,
    Arrows,
}

impl fmt::Display for ControlScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlScheme::Wasd => "WASD",
            ControlScheme::Arrows => "Arrows",
        };
        f.write_str(name)
    }
}

impl FromStr for ControlScheme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wasd" => Ok(ControlScheme::Wasd),
            "arrows" => Ok(ControlScheme::Arrows),
            other => Err(format!("unknown control scheme '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Move(Direction),
    Fire,
    Ability(AbilityId),
}

impl ControlScheme {
    /// Resolves a key name (as the browser reports it) to its action. Case-insensitive.
    pub fn binding(self, key: &str) -> Option<Binding> {
        let key = key.to_lowercase();
        let movement = match (self, key.as_str()) {
            (ControlScheme::Wasd, "w") | (ControlScheme::Arrows, "arrowup") => Some(Direction::Up),
            (ControlScheme::Wasd, "s") | (ControlScheme::Arrows, "arrowdown") => {
                Some(Direction::Down)
            }
            (ControlScheme::Wasd, "a") | (ControlScheme::Arrows, "arrowleft") => {
                Some(Direction::Left)
            }
            (ControlScheme::Wasd, "d") | (ControlScheme::Arrows, "arrowright") => {
                Some(Direction::Right)
            }
            _ => None,
        };
        if let Some(direction) = movement {
            return Some(Binding::Move(direction));
        }

        let binding = match key.as_str() {
            " " | "space" => Binding::Fire,
            "q" => Binding::Ability(AbilityId::Overdrive),
            "e" => Binding::Ability(AbilityId::CyberBeam),
            "f" => Binding::Ability(AbilityId::ChronoBubble),
            "g" => Binding::Ability(AbilityId::Barrage),
            "r" => Binding::Ability(AbilityId::ToxicRounds),
            "y" => Binding::Ability(AbilityId::TimeStop),
            _ => return None,
        };
        Some(binding)
    }
}
