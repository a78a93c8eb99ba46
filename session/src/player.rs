use crate::assets::PrototypeSet;
use crate::gesture::BallProbe;
use crate::physics::{LanePhysics, ResetKind};
use crate::view::LaneView;
use bowling_shared::config::LaneConfig;
use bowling_shared::pins::PinMask;
use bowling_shared::protocol::ScoreSnapshot;
use bowling_shared::scoring::ScoreState;
use std::fmt;

/// A bowler on one lane: human or imitation.
pub struct Player {
    pub id: u32,
    pub is_local: bool,
    pub slot: i32,
    pub physics: Box<dyn LanePhysics>,
    pub scores: ScoreState,
    pub view: LaneView,
    /// Pins knocked down by the most recent settled throw
    pub beaten_pins: u8,
}

/// Result of reading the pins once a thrown ball has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowOutcome {
    /// Lane rebuilt for the next ball
    Continue { pins: u8, reset: ResetKind },
    /// Last frame complete; the lane is left as it fell
    GameOver { pins: u8, final_score: u32 },
}

impl Player {
    pub fn new(
        id: u32,
        is_local: bool,
        slot: i32,
        physics: Box<dyn LanePhysics>,
        prototypes: &PrototypeSet,
        lane: &LaneConfig,
    ) -> Self {
        let mut view = LaneView::new(prototypes, slot, lane);
        view.sync(physics.as_ref(), is_local);
        Self {
            id,
            is_local,
            slot,
            physics,
            scores: ScoreState::new(),
            view,
            beaten_pins: 0,
        }
    }

    pub fn probe(&self) -> BallProbe {
        BallProbe {
            simulation_active: self.physics.simulation_active(),
            release_position: self.physics.release_position(),
        }
    }

    /// True once the thrown ball has rolled for longer than `settle_time`.
    pub fn throw_settled(&self, settle_time: f64) -> bool {
        self.physics.simulation_active() && self.physics.simulation_time() > settle_time
    }

    /// Score the settled throw and rebuild the lane for the next ball.
    ///
    /// The lane is re-racked when the frame changed or nothing is left
    /// standing; otherwise the standing pins stay for the second ball.
    pub fn settle_throw(&mut self) -> ThrowOutcome {
        let standing = self.physics.detect_standing_pins();
        let beaten = self.physics.current_pins_mask().and_not(standing);
        let pins = beaten.count();

        let prev_frame = self.scores.frame_number();
        self.scores.add_throw_result(pins);
        self.beaten_pins = pins;

        if self.scores.game_over() {
            return ThrowOutcome::GameOver {
                pins,
                final_score: self.scores.score(),
            };
        }

        let reset = if prev_frame != self.scores.frame_number() || standing.is_empty() {
            ResetKind::Rerack
        } else {
            ResetKind::Keep(standing)
        };
        self.physics.reset(reset);
        ThrowOutcome::Continue { pins, reset }
    }

    /// Fresh game on a fresh lane.
    pub fn restart_game(&mut self) {
        self.scores = ScoreState::new();
        self.beaten_pins = 0;
        self.physics.reset(ResetKind::Full);
    }

    pub fn standing_pins(&self) -> PinMask {
        self.physics.detect_standing_pins()
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot::from_scores(
            self.id,
            &self.scores,
            self.beaten_pins,
            self.standing_pins().count(),
        )
    }

    pub fn sync_view(&mut self) {
        self.view.sync(self.physics.as_ref(), self.is_local);
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("is_local", &self.is_local)
            .field("slot", &self.slot)
            .field("scores", &self.scores)
            .field("beaten_pins", &self.beaten_pins)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::PrototypeId;
    use crate::lane::KinematicLane;
    use bowling_shared::vec3::BodyTransform;

    /// Lane whose ball knocks down the first `knock` standing pins on every throw.
    struct FixedLane {
        standing: PinMask,
        at_release: PinMask,
        knock: usize,
        active: bool,
        time: f64,
    }

    impl FixedLane {
        fn knocking(knock: usize) -> Self {
            Self {
                standing: PinMask::ALL,
                at_release: PinMask::ALL,
                knock,
                active: false,
                time: 0.0,
            }
        }
    }

    impl LanePhysics for FixedLane {
        fn update(&mut self, dt: f64) {
            if self.active {
                self.time += dt;
            }
        }
        fn detect_standing_pins(&self) -> PinMask {
            self.standing
        }
        fn current_pins_mask(&self) -> PinMask {
            self.at_release
        }
        fn position_ball(&mut self, _offset: f64, _mode: crate::physics::PositionMode) {}
        fn release_ball(&mut self, _velocity: f64, _angle: f64) {
            self.at_release = self.standing;
            for index in self.at_release.iter().take(self.knock) {
                self.standing.remove(index);
            }
            self.active = true;
        }
        fn reset(&mut self, kind: ResetKind) {
            self.standing = match kind {
                ResetKind::Keep(mask) => mask,
                _ => PinMask::ALL,
            };
            self.at_release = self.standing;
            self.active = false;
            self.time = 0.0;
        }
        fn simulation_active(&self) -> bool {
            self.active
        }
        fn simulation_time(&self) -> f64 {
            self.time
        }
        fn release_position(&self) -> f64 {
            0.0
        }
        fn ball_transform(&self) -> BodyTransform {
            BodyTransform::default()
        }
        fn pin_transform(&self, index: usize) -> Option<BodyTransform> {
            self.standing
                .contains(index)
                .then(BodyTransform::default)
        }
    }

    fn player_with(physics: Box<dyn LanePhysics>) -> Player {
        let prototypes = PrototypeSet {
            track: PrototypeId(0),
            ball: PrototypeId(1),
            pin: PrototypeId(2),
        };
        Player::new(7, true, 0, physics, &prototypes, &LaneConfig::default())
    }

    #[test]
    fn settle_waits_for_threshold() {
        let mut player = player_with(Box::new(FixedLane::knocking(0)));
        assert!(!player.throw_settled(3.0));
        player.physics.release_ball(8.0, 0.0);
        player.physics.update(3.0);
        assert!(!player.throw_settled(3.0));
        player.physics.update(0.01);
        assert!(player.throw_settled(3.0));
    }

    #[test]
    fn first_ball_keeps_standing_pins() {
        let knock = PinMask::from_bits(0b0000001111);
        let mut player = player_with(Box::new(FixedLane::knocking(4)));
        player.physics.release_ball(8.0, 0.0);
        let outcome = player.settle_throw();
        assert_eq!(
            outcome,
            ThrowOutcome::Continue {
                pins: 4,
                reset: ResetKind::Keep(PinMask::ALL.and_not(knock)),
            }
        );
        assert_eq!(player.beaten_pins, 4);
        assert_eq!(player.snapshot().pins_standing, 6);
    }

    #[test]
    fn second_ball_reracks() {
        let mut player = player_with(Box::new(FixedLane::knocking(2)));
        player.physics.release_ball(8.0, 0.0);
        player.settle_throw();
        player.physics.release_ball(8.0, 0.0);
        let outcome = player.settle_throw();
        assert_eq!(
            outcome,
            ThrowOutcome::Continue {
                pins: 2,
                reset: ResetKind::Rerack,
            }
        );
        assert_eq!(player.scores.frame_number(), 1);
    }

    #[test]
    fn strike_reracks() {
        let mut player = player_with(Box::new(FixedLane::knocking(10)));
        player.physics.release_ball(8.0, 0.0);
        assert_eq!(
            player.settle_throw(),
            ThrowOutcome::Continue {
                pins: 10,
                reset: ResetKind::Rerack,
            }
        );
    }

    #[test]
    fn perfect_game_ends_with_game_over() {
        let mut player = player_with(Box::new(FixedLane::knocking(10)));
        let mut last = None;
        for _ in 0..12 {
            player.physics.release_ball(8.0, 0.0);
            last = Some(player.settle_throw());
        }
        assert_eq!(
            last,
            Some(ThrowOutcome::GameOver {
                pins: 10,
                final_score: 300,
            })
        );

        player.restart_game();
        assert_eq!(player.scores, ScoreState::new());
        assert!(!player.physics.simulation_active());
    }

    #[test]
    fn probe_reflects_lane() {
        let lane = LaneConfig::default();
        let mut player = player_with(Box::new(KinematicLane::new(&lane)));
        player
            .physics
            .position_ball(0.2, crate::physics::PositionMode::Place);
        let probe = player.probe();
        assert_eq!(probe.release_position, 0.2);
        assert!(!probe.simulation_active);
    }
}
