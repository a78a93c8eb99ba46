//! Boundary to the rigid-body physics collaborator.
//!
//! The session never steps bodies itself. Each player owns one lane
//! simulation behind `LanePhysics` and talks to it through these calls.

use bowling_shared::config::LaneConfig;
use bowling_shared::pins::PinMask;
use bowling_shared::vec3::BodyTransform;

/// How `LanePhysics::reset` rebuilds the lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    /// New game: full rack and the ball back at the centre of the foul line.
    Full,
    /// Fresh rack of all ten pins, ball returned.
    Rerack,
    /// Only the given pins stand, ball returned. Used for the second ball.
    Keep(PinMask),
}

/// Who is moving the ball along the foul line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionMode {
    /// Live drag from a pointer; follows the hand every move event.
    Drag,
    /// One-shot placement before an automated throw.
    Place,
}

pub trait LanePhysics: Send {
    /// Step the simulation by `dt` seconds.
    fn update(&mut self, dt: f64);

    /// Pins currently upright.
    fn detect_standing_pins(&self) -> PinMask;

    /// Pins that were standing when the current ball was released.
    fn current_pins_mask(&self) -> PinMask;

    fn position_ball(&mut self, offset: f64, mode: PositionMode);

    fn release_ball(&mut self, velocity: f64, angle: f64);

    fn reset(&mut self, kind: ResetKind);

    /// True from release until the next reset.
    fn simulation_active(&self) -> bool;

    /// Seconds simulated since release.
    fn simulation_time(&self) -> f64;

    /// Lateral offset of the ball on the foul line.
    fn release_position(&self) -> f64;

    fn ball_transform(&self) -> BodyTransform;

    /// Transform of pin `index`, or None once the pin has been cleared off the lane.
    fn pin_transform(&self, index: usize) -> Option<BodyTransform>;
}

/// Builds one lane simulation per player.
pub type LaneFactory = Box<dyn FnMut(&LaneConfig) -> Box<dyn LanePhysics> + Send>;
