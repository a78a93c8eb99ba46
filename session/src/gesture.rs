//! Pointer gesture classification.
//!
//! A press on the ball starts a grab. Once the pointer has moved far enough on
//! screen the grab becomes either a reposition along the foul line (mostly
//! sideways motion) or a roll (mostly forward motion). Lifting the pointer
//! during a roll releases the ball with the drag's speed and direction.
//!
//! Time samples are pointer timestamps in milliseconds.

use bowling_shared::config::{GestureConfig, LaneConfig};
use bowling_shared::vec3::{length, sub, vec3, Ray, Vec3};

/// Renderer-side primitive: the pointer ray through a screen pixel.
pub trait PointerRay: Send {
    fn ray_at(&self, x: f64, y: f64) -> Ray;
}

/// One pointer or controller. Each source owns its own gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputSource(pub u32);

impl InputSource {
    pub const PRIMARY: InputSource = InputSource(0);
}

/// What the classifier needs to know about the ball under control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallProbe {
    pub simulation_active: bool,
    pub release_position: f64,
}

/// Where and when the ball was grabbed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    /// Lane-plane point under the pointer at grab time
    pub pick_point: Vec3,
    /// Lateral offset between the grab point and the ball
    pub pick_offset: f64,
    pub screen_x: f64,
    pub screen_y: f64,
    pub time_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Picking(Grab),
    Positioning(Grab),
    Rolling(Grab),
}

/// Ball command produced by a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrowCommand {
    /// Move the ball to this lateral offset on the foul line
    Position(f64),
    Release { velocity: f64, angle: f64 },
}

#[derive(Debug, Clone)]
pub struct ThrowGesture {
    lane: LaneConfig,
    config: GestureConfig,
    state: GestureState,
    drag_point: Vec3,
    /// Forward-to-lateral ratio separating a roll from a reposition
    roll_ratio: f64,
}

impl ThrowGesture {
    pub fn new(lane: LaneConfig, config: GestureConfig) -> Self {
        Self {
            lane,
            config,
            state: GestureState::Idle,
            drag_point: Vec3::ZERO,
            roll_ratio: lane.ball_angle_max.tan(),
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn drag_point(&self) -> Vec3 {
        self.drag_point
    }

    pub fn on_action_down(&mut self, ray: Ray, x: f64, y: f64, time_ms: f64, ball: BallProbe) {
        if ball.simulation_active {
            return;
        }
        self.state = GestureState::Idle;

        let Some(hit) = ray.intersect_plane_y(self.lane.base_height) else {
            return;
        };
        self.drag_point = hit;

        let ball_center = vec3(
            ball.release_position,
            self.lane.ball_height(),
            self.lane.ball_line,
        );
        if ray.intersects_sphere(ball_center, self.config.pick_radius) {
            self.state = GestureState::Picking(Grab {
                pick_point: hit,
                pick_offset: hit.x - ball.release_position,
                screen_x: x,
                screen_y: y,
                time_ms,
            });
        }
    }

    pub fn on_action_move(
        &mut self,
        ray: Ray,
        x: f64,
        y: f64,
        ball: BallProbe,
    ) -> Option<ThrowCommand> {
        if ball.simulation_active {
            return None;
        }
        let hit = ray.intersect_plane_y(self.lane.base_height)?;
        self.drag_point = hit;

        if let GestureState::Picking(grab) = self.state {
            let dx = x - grab.screen_x;
            let dy = y - grab.screen_y;
            if dx * dx + dy * dy > self.config.threshold_px_squared() {
                let forward = grab.pick_point.z - hit.z;
                let lateral = (grab.pick_point.x - hit.x).abs();
                self.state = if forward * self.roll_ratio > lateral {
                    GestureState::Rolling(grab)
                } else {
                    GestureState::Positioning(grab)
                };
            }
        }

        match self.state {
            GestureState::Positioning(grab) => Some(ThrowCommand::Position(hit.x - grab.pick_offset)),
            _ => None,
        }
    }

    pub fn on_action_up(&mut self, ray: Ray, time_ms: f64, ball: BallProbe) -> Option<ThrowCommand> {
        if ball.simulation_active {
            return None;
        }
        let GestureState::Rolling(grab) = std::mem::take(&mut self.state) else {
            return None;
        };

        if let Some(hit) = ray.intersect_plane_y(self.lane.base_height) {
            self.drag_point = hit;
        }
        let release = sub(self.drag_point, grab.pick_point);
        let elapsed = (time_ms - grab.time_ms) * 1e-3;
        let velocity = if elapsed > 0.0 {
            length(release) / elapsed
        } else {
            self.lane.ball_velocity_max
        };
        let angle = (-release.x).atan2(-release.z);
        Some(ThrowCommand::Release { velocity, angle })
    }

    /// Drop any grab in progress.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}
