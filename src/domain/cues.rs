// Fire-and-forget requests the tick hands to the host: audio cues and screen shake.

use crate::domain::Millis;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Cue {
    /// Pooled cannon shot, also used for barrage impacts.
    Shot,
    BeamCharge,
    BeamActive,
    BossMortar,
    BossLaserSweep,
    BossMultiLane,
    BossXPattern,
    LastStandCharge,
    LastStandExplosion,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SideEffect {
    PlayCue { cue: Cue },
    StopCue { cue: Cue },
    Shake { intensity: f32, duration: Millis },
}
