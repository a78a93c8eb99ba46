//! Imitation opponents: simulated bowlers on the lanes next to the human.
//!
//! An imitation is a timer plus a randomly chosen game length. Every time the
//! timer runs out it throws one ball with random placement, speed and angle
//! through the same calls a human gesture ends in. Once its bowler's game is
//! over (or has reached the chosen length) the imitation is thrown away and a
//! fresh one takes the slot.

use bowling_shared::config::{ImitationConfig, LaneConfig};
use bowling_shared::scoring::{ScoreState, FRAME_COUNT};
use rand::Rng;

fn uniform(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    min + rng.gen::<f64>() * (max - min)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Imitation {
    /// Lane offset from the local player's lane
    pub slot: i32,
    /// Frames to play before giving up the lane (1..=10)
    pub target_frames: usize,
    /// Seconds until the next throw
    pub waiting_time: f64,
    /// Created lazily on the first throw
    pub player_id: Option<u32>,
}

impl Imitation {
    pub fn new(slot: i32, config: &ImitationConfig, rng: &mut impl Rng) -> Self {
        Self {
            slot,
            target_frames: rng.gen_range(1..=FRAME_COUNT),
            waiting_time: uniform(rng, config.emerging_time_min, config.emerging_time_max),
            player_id: None,
        }
    }

    /// Count down. Returns true when a throw is due; the timer is re-armed.
    pub fn tick(&mut self, dt: f64, config: &ImitationConfig, rng: &mut impl Rng) -> bool {
        self.waiting_time -= dt;
        if self.waiting_time > 0.0 {
            return false;
        }
        self.waiting_time = uniform(rng, config.throw_time_min, config.throw_time_max);
        true
    }

    /// True when this imitation has played out its game.
    pub fn finished(&self, scores: &ScoreState) -> bool {
        scores.game_over() || scores.frame_number() >= self.target_frames
    }
}

/// Random throw parameters for one imitation ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImitationThrow {
    pub position: f64,
    pub velocity: f64,
    pub angle: f64,
}

impl ImitationThrow {
    pub fn random(config: &ImitationConfig, lane: &LaneConfig, rng: &mut impl Rng) -> Self {
        Self {
            position: config.throw_position_max * 2.0 * (rng.gen::<f64>() - 0.5),
            velocity: uniform(rng, lane.ball_velocity_min, lane.ball_velocity_max),
            angle: config.throw_angle_max * 2.0 * (rng.gen::<f64>() - 0.5),
        }
    }
}

/// Owns one imitation per non-human slot.
#[derive(Debug)]
pub struct ImitationScheduler {
    /// Public for testing
    pub imitations: Vec<Imitation>,
    next_player_id: u32,
}

impl ImitationScheduler {
    /// Imitation players get ids counting up from `first_player_id`.
    pub fn new(first_player_id: u32) -> Self {
        Self {
            imitations: Vec::new(),
            next_player_id: first_player_id,
        }
    }

    pub fn add(&mut self, slot: i32, config: &ImitationConfig, rng: &mut impl Rng) {
        let imitation = Imitation::new(slot, config, rng);
        tracing::info!(
            "Imitation on slot {} will play {} frames, first throw in {:.1}s",
            slot,
            imitation.target_frames,
            imitation.waiting_time
        );
        self.imitations.push(imitation);
    }

    /// Replace the imitation at `index` with a fresh one for the same slot.
    /// Returns the retired imitation's player id, if it had one.
    pub fn restart(
        &mut self,
        index: usize,
        config: &ImitationConfig,
        rng: &mut impl Rng,
    ) -> Option<u32> {
        let slot = self.imitations.get(index)?.slot;
        let fresh = Imitation::new(slot, config, rng);
        tracing::info!(
            "Imitation on slot {} restarted, next game {} frames",
            slot,
            fresh.target_frames
        );
        std::mem::replace(&mut self.imitations[index], fresh).player_id
    }

    /// Advance all timers. Returns the indices of imitations due to throw.
    pub fn tick(&mut self, dt: f64, config: &ImitationConfig, rng: &mut impl Rng) -> Vec<usize> {
        let mut due = Vec::new();
        for (index, imitation) in self.imitations.iter_mut().enumerate() {
            if imitation.tick(dt, config, rng) {
                due.push(index);
            }
        }
        due
    }

    /// Next free player id, skipping any for which `taken` holds.
    pub fn allocate_player_id(&mut self, taken: impl Fn(u32) -> bool) -> u32 {
        while taken(self.next_player_id) {
            self.next_player_id = self.next_player_id.wrapping_add(1);
        }
        let id = self.next_player_id;
        self.next_player_id = self.next_player_id.wrapping_add(1);
        id
    }

    pub fn find_by_player(&self, player_id: u32) -> Option<usize> {
        self.imitations
            .iter()
            .position(|i| i.player_id == Some(player_id))
    }

    /// Number of imitation slots
    pub fn count(&self) -> usize {
        self.imitations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn new_imitation_parameters_in_range() {
        let config = ImitationConfig::default();
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let imitation = Imitation::new(1, &config, &mut rng);
            assert!((1..=FRAME_COUNT).contains(&imitation.target_frames));
            assert!(imitation.waiting_time >= config.emerging_time_min);
            assert!(imitation.waiting_time <= config.emerging_time_max);
            assert!(imitation.player_id.is_none());
        }
    }

    #[test]
    fn imitation_waits_for_emerging_time() {
        let config = ImitationConfig::default();
        let mut rng = test_rng();
        let mut imitation = Imitation::new(-1, &config, &mut rng);
        imitation.waiting_time = 1.0;

        for _ in 0..9 {
            assert!(!imitation.tick(0.1, &config, &mut rng));
        }
        // Float accumulation may need one extra tick
        let fired = imitation.tick(0.1, &config, &mut rng) || imitation.tick(0.1, &config, &mut rng);
        assert!(fired);
        assert!(imitation.waiting_time >= config.throw_time_min);
        assert!(imitation.waiting_time <= config.throw_time_max);
    }

    #[test]
    fn finished_on_game_over_or_target() {
        let config = ImitationConfig::default();
        let mut rng = test_rng();
        let mut imitation = Imitation::new(1, &config, &mut rng);
        imitation.target_frames = 2;

        let mut scores = ScoreState::new();
        assert!(!imitation.finished(&scores));
        scores.add_throw_result(10);
        assert!(!imitation.finished(&scores));
        scores.add_throw_result(10);
        assert!(imitation.finished(&scores));

        imitation.target_frames = FRAME_COUNT;
        for _ in 0..10 {
            scores.add_throw_result(10);
        }
        assert!(scores.game_over());
        assert!(imitation.finished(&scores));
    }

    #[test]
    fn throws_stay_in_bounds() {
        let config = ImitationConfig::default();
        let lane = LaneConfig::default();
        let mut rng = test_rng();
        for _ in 0..200 {
            let throw = ImitationThrow::random(&config, &lane, &mut rng);
            assert!(throw.position.abs() <= config.throw_position_max);
            assert!(throw.angle.abs() <= config.throw_angle_max);
            assert!(throw.velocity >= lane.ball_velocity_min);
            assert!(throw.velocity <= lane.ball_velocity_max);
            assert!(!throw.velocity.is_nan());
        }
    }

    #[test]
    fn restart_keeps_slot_and_returns_player() {
        let config = ImitationConfig::default();
        let mut rng = test_rng();
        let mut scheduler = ImitationScheduler::new(1);
        scheduler.add(-1, &config, &mut rng);
        scheduler.add(1, &config, &mut rng);
        scheduler.imitations[1].player_id = Some(9);

        assert_eq!(scheduler.find_by_player(9), Some(1));
        assert_eq!(scheduler.restart(1, &config, &mut rng), Some(9));
        assert_eq!(scheduler.imitations[1].slot, 1);
        assert!(scheduler.imitations[1].player_id.is_none());
        assert_eq!(scheduler.find_by_player(9), None);
        assert_eq!(scheduler.count(), 2);
    }

    #[test]
    fn restart_out_of_range_is_safe() {
        let mut scheduler = ImitationScheduler::new(1);
        assert_eq!(
            scheduler.restart(3, &ImitationConfig::default(), &mut test_rng()),
            None
        );
    }

    #[test]
    fn tick_reports_due_imitations() {
        let config = ImitationConfig::default();
        let mut rng = test_rng();
        let mut scheduler = ImitationScheduler::new(1);
        scheduler.add(-1, &config, &mut rng);
        scheduler.add(1, &config, &mut rng);
        scheduler.imitations[0].waiting_time = 0.05;
        scheduler.imitations[1].waiting_time = 5.0;

        assert_eq!(scheduler.tick(0.1, &config, &mut rng), vec![0]);
        assert!(scheduler.tick(0.1, &config, &mut rng).is_empty());
    }

    #[test]
    fn allocated_ids_skip_taken() {
        let mut scheduler = ImitationScheduler::new(1);
        let taken = [1u32, 2, 4];
        assert_eq!(scheduler.allocate_player_id(|id| taken.contains(&id)), 3);
        assert_eq!(scheduler.allocate_player_id(|id| taken.contains(&id)), 5);
    }

    #[test]
    fn imitations_vary_with_seed() {
        let config = ImitationConfig::default();
        let targets: Vec<usize> = (0..8)
            .map(|seed| Imitation::new(0, &config, &mut ChaCha8Rng::seed_from_u64(seed)).target_frames)
            .collect();
        assert!(
            !targets.iter().all(|&t| t == targets[0]),
            "target frames should vary, got {:?}",
            targets
        );
    }
}
