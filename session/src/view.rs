//! Render-facing lane state.
//!
//! Each player gets a group of mesh instances cloned from the prototypes and
//! shifted sideways by its slot. After every tick the instances are copied
//! from the physics bodies; the renderer only reads them.

use crate::assets::{PrototypeId, PrototypeSet};
use crate::physics::LanePhysics;
use bowling_shared::config::LaneConfig;
use bowling_shared::pins::PIN_COUNT;
use bowling_shared::vec3::BodyTransform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshInstance {
    pub prototype: PrototypeId,
    pub visible: bool,
    pub transform: BodyTransform,
}

impl MeshInstance {
    fn clone_of(prototype: PrototypeId) -> Self {
        Self {
            prototype,
            visible: true,
            transform: BodyTransform::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaneView {
    /// Lateral position of the lane group in the scene
    pub offset_x: f64,
    pub track: MeshInstance,
    pub ball: MeshInstance,
    pub pins: [MeshInstance; PIN_COUNT],
}

impl LaneView {
    pub fn new(prototypes: &PrototypeSet, slot: i32, lane: &LaneConfig) -> Self {
        Self {
            offset_x: slot as f64 * lane.track_distance(),
            track: MeshInstance::clone_of(prototypes.track),
            ball: MeshInstance::clone_of(prototypes.ball),
            pins: [MeshInstance::clone_of(prototypes.pin); PIN_COUNT],
        }
    }

    /// Copy body transforms into the meshes. The ball is hidden on remote
    /// lanes while it waits at the foul line.
    pub fn sync(&mut self, physics: &dyn LanePhysics, is_local: bool) {
        if is_local || physics.simulation_active() {
            self.ball.visible = true;
            self.ball.transform = physics.ball_transform();
        } else {
            self.ball.visible = false;
        }

        for (index, pin) in self.pins.iter_mut().enumerate() {
            match physics.pin_transform(index) {
                Some(transform) => {
                    pin.visible = true;
                    pin.transform = transform;
                }
                None => pin.visible = false,
            }
        }
    }
}
