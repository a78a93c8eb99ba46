//! Headless kinematic lane.
//!
//! A deterministic stand-in for the rigid-body engine: the ball travels in a
//! straight line at its release velocity, drops into the gutter when it leaves
//! the lane, and topples any pin it passes within reach of. A toppled pin
//! knocks over neighbours lying ahead of it in its fall direction.

use crate::physics::{LaneFactory, LanePhysics, PositionMode, ResetKind};
use bowling_shared::config::LaneConfig;
use bowling_shared::pins::{PinMask, PIN_COUNT};
use bowling_shared::vec3::{
    add, dot, length, normalize, planar_distance, scale, sub, vec3, BodyTransform, Quat, Vec3,
};

const PIN_HEIGHT: f64 = 0.38;
/// Cosine of the widest angle at which a falling pin still takes a neighbour down
const CHAIN_CONE_COS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum PinState {
    Cleared,
    Standing,
    /// Fallen, lying along the given planar direction
    Toppled(Vec3),
}

pub struct KinematicLane {
    config: LaneConfig,
    spots: [Vec3; PIN_COUNT],
    pins: [PinState; PIN_COUNT],
    pins_at_release: PinMask,
    ball_pos: Vec3,
    ball_velocity: Vec3,
    spin_axis: Vec3,
    spin_angle: f64,
    in_gutter: bool,
    release_position: f64,
    simulation_active: bool,
    simulation_time: f64,
}

/// Standard triangle: head pin at `pin_deck`, rows spreading down-lane.
pub fn pin_spots(config: &LaneConfig) -> [Vec3; PIN_COUNT] {
    let row_depth = config.pin_spacing * 3f64.sqrt() * 0.5;
    let mut spots = [Vec3::ZERO; PIN_COUNT];
    let mut index = 0;
    for row in 0..4 {
        for k in 0..=row {
            spots[index] = vec3(
                (k as f64 - row as f64 * 0.5) * config.pin_spacing,
                config.base_height,
                config.pin_deck - row as f64 * row_depth,
            );
            index += 1;
        }
    }
    spots
}

impl KinematicLane {
    pub fn new(config: &LaneConfig) -> Self {
        let mut lane = Self {
            config: *config,
            spots: pin_spots(config),
            pins: [PinState::Standing; PIN_COUNT],
            pins_at_release: PinMask::ALL,
            ball_pos: Vec3::ZERO,
            ball_velocity: Vec3::ZERO,
            spin_axis: vec3(1.0, 0.0, 0.0),
            spin_angle: 0.0,
            in_gutter: false,
            release_position: 0.0,
            simulation_active: false,
            simulation_time: 0.0,
        };
        lane.reset(ResetKind::Full);
        lane
    }

    /// Factory handing every new player its own kinematic lane.
    pub fn factory() -> LaneFactory {
        Box::new(|config: &LaneConfig| Box::new(KinematicLane::new(config)) as Box<dyn LanePhysics>)
    }

    pub fn in_gutter(&self) -> bool {
        self.in_gutter
    }

    fn rest_position(&self) -> Vec3 {
        vec3(
            self.release_position,
            self.config.ball_height(),
            self.config.ball_line,
        )
    }

    /// z beyond which the ball has dropped into the pit
    fn pit_line(&self) -> f64 {
        self.config.pin_deck - 4.0 * self.config.pin_spacing - 0.5
    }

    fn topple(&mut self, index: usize, direction: Vec3) {
        if self.pins[index] != PinState::Standing {
            return;
        }
        self.pins[index] = PinState::Toppled(direction);

        let reach = self.config.pin_spacing * 1.05;
        for other in 0..PIN_COUNT {
            if self.pins[other] != PinState::Standing {
                continue;
            }
            let offset = sub(self.spots[other], self.spots[index]);
            if length(offset) > reach {
                continue;
            }
            let towards = normalize(offset);
            if dot(towards, direction) > CHAIN_CONE_COS {
                self.topple(other, towards);
            }
        }
    }

    /// Topple every standing pin the ball touched while moving from `from` to `to`.
    fn sweep_pins(&mut self, from: Vec3, to: Vec3) {
        let reach = self.config.ball_radius + self.config.pin_radius;
        let path = vec3(to.x - from.x, 0.0, to.z - from.z);
        let path_len_sq = dot(path, path);

        for index in 0..PIN_COUNT {
            if self.pins[index] != PinState::Standing {
                continue;
            }
            let spot = self.spots[index];
            let t = if path_len_sq > 0.0 {
                (dot(vec3(spot.x - from.x, 0.0, spot.z - from.z), path) / path_len_sq)
                    .clamp(0.0, 1.0)
            } else {
                0.0
            };
            let contact = add(from, scale(path, t));
            if planar_distance(contact, spot) < reach {
                let push = vec3(spot.x - contact.x, 0.0, spot.z - contact.z);
                let direction = normalize(add(normalize(push), normalize(path)));
                self.topple(index, direction);
            }
        }
    }
}

impl LanePhysics for KinematicLane {
    fn update(&mut self, dt: f64) {
        if !self.simulation_active {
            return;
        }
        self.simulation_time += dt;

        if self.ball_pos.z < self.pit_line() {
            self.ball_velocity = Vec3::ZERO;
            return;
        }

        let from = self.ball_pos;
        self.ball_pos = add(self.ball_pos, scale(self.ball_velocity, dt));
        self.spin_angle += length(self.ball_velocity) * dt / self.config.ball_radius;

        let edge = self.config.track_width * 0.5;
        if !self.in_gutter && self.ball_pos.x.abs() > edge {
            self.in_gutter = true;
            self.ball_pos.x = self.ball_pos.x.signum() * (edge + self.config.ball_radius);
            self.ball_pos.y = self.config.base_height;
            self.ball_velocity.x = 0.0;
        }
        if !self.in_gutter {
            self.sweep_pins(from, self.ball_pos);
        }
    }

    fn detect_standing_pins(&self) -> PinMask {
        let mut mask = PinMask::EMPTY;
        for (index, pin) in self.pins.iter().enumerate() {
            if *pin == PinState::Standing {
                mask.insert(index);
            }
        }
        mask
    }

    fn current_pins_mask(&self) -> PinMask {
        self.pins_at_release
    }

    fn position_ball(&mut self, offset: f64, mode: PositionMode) {
        if self.simulation_active {
            return;
        }
        let limit = self.config.max_ball_offset();
        let target = if offset.is_finite() {
            offset.clamp(-limit, limit)
        } else {
            0.0
        };
        match mode {
            // Dragging rolls the ball sideways under the hand.
            PositionMode::Drag => {
                self.spin_axis = vec3(0.0, 0.0, 1.0);
                self.spin_angle -= (target - self.release_position) / self.config.ball_radius;
            }
            PositionMode::Place => {
                self.spin_angle = 0.0;
            }
        }
        self.release_position = target;
        self.ball_pos = self.rest_position();
    }

    fn release_ball(&mut self, velocity: f64, angle: f64) {
        if self.simulation_active {
            return;
        }
        let speed = if velocity.is_finite() {
            velocity.clamp(self.config.ball_velocity_min, self.config.ball_velocity_max)
        } else {
            self.config.ball_velocity_max
        };
        let angle = if angle.is_finite() {
            angle.clamp(-self.config.ball_angle_max, self.config.ball_angle_max)
        } else {
            0.0
        };
        let direction = vec3(-angle.sin(), 0.0, -angle.cos());
        self.ball_velocity = scale(direction, speed);
        self.spin_axis = vec3(-direction.z, 0.0, direction.x);
        self.spin_angle = 0.0;
        self.pins_at_release = self.detect_standing_pins();
        self.simulation_active = true;
        self.simulation_time = 0.0;
    }

    fn reset(&mut self, kind: ResetKind) {
        let rack = match kind {
            ResetKind::Full => {
                self.release_position = 0.0;
                PinMask::ALL
            }
            ResetKind::Rerack => PinMask::ALL,
            ResetKind::Keep(mask) => mask,
        };
        for (index, pin) in self.pins.iter_mut().enumerate() {
            *pin = if rack.contains(index) {
                PinState::Standing
            } else {
                PinState::Cleared
            };
        }
        self.pins_at_release = rack;
        self.ball_pos = self.rest_position();
        self.ball_velocity = Vec3::ZERO;
        self.spin_angle = 0.0;
        self.in_gutter = false;
        self.simulation_active = false;
        self.simulation_time = 0.0;
    }

    fn simulation_active(&self) -> bool {
        self.simulation_active
    }

    fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    fn release_position(&self) -> f64 {
        self.release_position
    }

    fn ball_transform(&self) -> BodyTransform {
        BodyTransform {
            position: self.ball_pos,
            rotation: Quat::from_axis_angle(self.spin_axis, self.spin_angle),
        }
    }

    fn pin_transform(&self, index: usize) -> Option<BodyTransform> {
        let spot = *self.spots.get(index)?;
        match self.pins[index] {
            PinState::Cleared => None,
            PinState::Standing => Some(BodyTransform::at(vec3(
                spot.x,
                spot.y + PIN_HEIGHT * 0.5,
                spot.z,
            ))),
            PinState::Toppled(direction) => {
                let axis = normalize(vec3(-direction.z, 0.0, direction.x));
                Some(BodyTransform {
                    position: add(
                        add(spot, scale(direction, PIN_HEIGHT * 0.5)),
                        vec3(0.0, self.config.pin_radius, 0.0),
                    ),
                    rotation: Quat::from_axis_angle(axis, -std::f64::consts::FRAC_PI_2),
                })
            }
        }
    }
}
