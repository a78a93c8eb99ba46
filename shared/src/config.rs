use std::f64::consts::PI;

/// Lane geometry and ball limits, resolved once when a session is built.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LaneConfig {
    /// Lane width between the gutters (m)
    pub track_width: f64,
    /// Gap between neighbouring lanes (m)
    pub track_gap: f64,
    /// Height of the lane surface
    pub base_height: f64,
    /// z of the foul line, where the ball waits before release
    pub ball_line: f64,
    /// z of the head pin
    pub pin_deck: f64,
    pub ball_radius: f64,
    pub pin_radius: f64,
    /// Distance between neighbouring pin spots (m)
    pub pin_spacing: f64,
    pub ball_velocity_min: f64,
    pub ball_velocity_max: f64,
    /// Largest absolute release angle (radians)
    pub ball_angle_max: f64,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            track_width: 1.05,
            track_gap: 0.1,
            base_height: 0.0,
            ball_line: 0.0,
            pin_deck: -18.29,
            ball_radius: 0.109,
            pin_radius: 0.06,
            pin_spacing: 0.3048,
            ball_velocity_min: 7.0,
            ball_velocity_max: 11.0,
            ball_angle_max: PI / 12.0,
        }
    }
}

impl LaneConfig {
    /// Resting height of the ball's centre.
    pub fn ball_height(&self) -> f64 {
        self.base_height + self.ball_radius
    }

    /// Lateral distance between neighbouring lane slots.
    pub fn track_distance(&self) -> f64 {
        self.track_width + self.track_gap
    }

    /// Largest lateral offset that keeps the ball on the lane.
    pub fn max_ball_offset(&self) -> f64 {
        (self.track_width * 0.5 - self.ball_radius).max(0.0)
    }
}

/// Pointer gesture tuning
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GestureConfig {
    /// Physical drag distance (inches) before a grab becomes a roll or a reposition
    pub grab_threshold_inch: f64,
    /// Display density used to convert the threshold to pixels
    pub pixels_per_inch: f64,
    /// Radius around the ball centre that accepts a grab (m)
    pub pick_radius: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            grab_threshold_inch: 0.05,
            pixels_per_inch: 96.0,
            pick_radius: 0.109,
        }
    }
}

impl GestureConfig {
    /// Grab threshold in screen pixels, squared.
    pub fn threshold_px_squared(&self) -> f64 {
        let px = self.grab_threshold_inch * self.pixels_per_inch;
        px * px
    }
}

/// Imitation opponent timing and throw ranges
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ImitationConfig {
    /// Delay before a fresh imitation takes its first throw (seconds)
    pub emerging_time_min: f64,
    pub emerging_time_max: f64,
    /// Delay between throws (seconds)
    pub throw_time_min: f64,
    pub throw_time_max: f64,
    /// Largest absolute lateral starting position (m)
    pub throw_position_max: f64,
    /// Largest absolute release angle (radians)
    pub throw_angle_max: f64,
}

impl Default for ImitationConfig {
    fn default() -> Self {
        Self {
            emerging_time_min: 2.0,
            emerging_time_max: 10.0,
            throw_time_min: 3.5,
            throw_time_max: 7.0,
            throw_position_max: 0.3,
            throw_angle_max: PI / 18.0,
        }
    }
}

/// Gameplay configuration shared by the session and its displays.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub lane: LaneConfig,
    pub gesture: GestureConfig,
    pub imitation: ImitationConfig,
    /// Simulation time after release before the pin state is read (seconds)
    #[serde(default = "default_settle_time")]
    pub settle_time: f64,
}

fn default_settle_time() -> f64 {
    3.0
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lane: LaneConfig::default(),
            gesture: GestureConfig::default(),
            imitation: ImitationConfig::default(),
            settle_time: default_settle_time(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), String> {
        let lane = &self.lane;
        if !lane.track_width.is_finite() || lane.track_width <= 2.0 * lane.ball_radius {
            return Err("track_width must be finite and wider than the ball".to_string());
        }
        if !lane.ball_radius.is_finite() || lane.ball_radius <= 0.0 {
            return Err("ball_radius must be finite and > 0".to_string());
        }
        if !lane.pin_deck.is_finite() || lane.pin_deck >= lane.ball_line {
            return Err("pin_deck must lie down-lane (-z) of ball_line".to_string());
        }
        if !lane.ball_velocity_min.is_finite() || lane.ball_velocity_min <= 0.0 {
            return Err("ball_velocity_min must be finite and > 0".to_string());
        }
        if !lane.ball_velocity_max.is_finite() || lane.ball_velocity_max < lane.ball_velocity_min {
            return Err("ball_velocity_max must be finite and >= ball_velocity_min".to_string());
        }
        if !lane.ball_angle_max.is_finite()
            || lane.ball_angle_max <= 0.0
            || lane.ball_angle_max >= PI / 2.0
        {
            return Err("ball_angle_max must be in (0, PI/2)".to_string());
        }
        if !self.gesture.pixels_per_inch.is_finite() || self.gesture.pixels_per_inch <= 0.0 {
            return Err("pixels_per_inch must be finite and > 0".to_string());
        }
        if !self.gesture.pick_radius.is_finite() || self.gesture.pick_radius <= 0.0 {
            return Err("pick_radius must be finite and > 0".to_string());
        }
        let imitation = &self.imitation;
        if imitation.emerging_time_min < 0.0
            || imitation.emerging_time_max < imitation.emerging_time_min
        {
            return Err("emerging_time range must be non-negative and ordered".to_string());
        }
        if imitation.throw_time_min <= 0.0 || imitation.throw_time_max < imitation.throw_time_min {
            return Err("throw_time range must be positive and ordered".to_string());
        }
        if imitation.throw_position_max < 0.0 || imitation.throw_angle_max < 0.0 {
            return Err("imitation throw limits must be >= 0".to_string());
        }
        if !self.settle_time.is_finite() || self.settle_time <= 0.0 {
            return Err("settle_time must be finite and > 0".to_string());
        }
        Ok(())
    }
}
