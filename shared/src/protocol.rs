use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::scoring::ScoreState;

/// Read-only score view for the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSnapshot {
    pub player_id: u32,
    pub score: u32,
    /// Zero-based; displays show `frame_number + 1` of 10
    pub frame_number: u32,
    pub game_over: bool,
    /// Pins knocked down by the most recent settled throw
    pub beaten_pins: u8,
    /// Pins standing on the lane right now
    #[serde(default)]
    pub pins_standing: u8,
}

impl ScoreSnapshot {
    pub fn from_scores(
        player_id: u32,
        scores: &ScoreState,
        beaten_pins: u8,
        pins_standing: u8,
    ) -> Self {
        Self {
            player_id,
            score: scores.score(),
            frame_number: scores.frame_number() as u32,
            game_over: scores.game_over(),
            beaten_pins,
            pins_standing,
        }
    }
}

/// Notifications the session raises for the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum SessionEvent {
    #[serde(rename = "player_joined")]
    PlayerJoined {
        #[serde(rename = "playerId")]
        player_id: u32,
        local: bool,
        slot: i32,
    },
    #[serde(rename = "player_left")]
    PlayerLeft {
        #[serde(rename = "playerId")]
        player_id: u32,
    },
    #[serde(rename = "throw_settled")]
    ThrowSettled {
        #[serde(rename = "playerId")]
        player_id: u32,
        pins: u8,
        #[serde(rename = "frameNumber")]
        frame_number: u32,
    },
    /// The local player finished a game; their score state has been reset.
    #[serde(rename = "game_over")]
    GameOver {
        #[serde(rename = "playerId")]
        player_id: u32,
        #[serde(rename = "finalScore")]
        final_score: u32,
    },
}
