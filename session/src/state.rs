use crate::assets::PrototypeSet;
use crate::error::{InitError, SessionError};
use crate::gesture::{BallProbe, InputSource, PointerRay, ThrowCommand, ThrowGesture};
use crate::imitation::{ImitationScheduler, ImitationThrow};
use crate::physics::{LaneFactory, PositionMode, ResetKind};
use crate::player::{Player, ThrowOutcome};
use bowling_shared::config::GameConfig;
use bowling_shared::protocol::{ScoreSnapshot, SessionEvent};
use bowling_shared::vec3::Ray;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// First id handed to imitation players. Human ids live below it.
pub const FIRST_IMITATION_ID: u32 = 1 << 16;

/// Everything one running game owns. Driven from a single tick loop.
pub struct Session {
    pub config: GameConfig,
    prototypes: Option<PrototypeSet>,
    lane_factory: LaneFactory,
    players: Vec<Player>,
    imitations: ImitationScheduler,
    gestures: HashMap<InputSource, ThrowGesture>,
    camera: Option<Box<dyn PointerRay>>,
    rng: ChaCha8Rng,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(
        config: GameConfig,
        rng_seed: u64,
        lane_factory: LaneFactory,
    ) -> Result<Self, InitError> {
        use rand::SeedableRng;
        config.validate().map_err(InitError::InvalidConfig)?;

        Ok(Self {
            config,
            prototypes: None,
            lane_factory,
            players: Vec::new(),
            imitations: ImitationScheduler::new(FIRST_IMITATION_ID),
            gestures: HashMap::new(),
            camera: None,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            events: Vec::new(),
        })
    }

    /// Make the lane prototypes available. Players can join from now on.
    pub fn install_prototypes(&mut self, prototypes: PrototypeSet) {
        self.prototypes = Some(prototypes);
    }

    pub fn is_ready(&self) -> bool {
        self.prototypes.is_some()
    }

    pub fn set_camera(&mut self, camera: Box<dyn PointerRay>) {
        self.camera = Some(camera);
    }

    // === Players ===

    /// Join a bowler. Human hosts should pick ids below
    /// [`FIRST_IMITATION_ID`]; imitation players are numbered from there and
    /// skip any id already taken, so the two never collide.
    pub fn add_player(
        &mut self,
        id: u32,
        is_local: bool,
        slot: i32,
    ) -> Result<&Player, SessionError> {
        let prototypes = self.prototypes.ok_or(SessionError::PrototypesNotLoaded)?;
        if self.players.iter().any(|p| p.id == id) {
            return Err(SessionError::DuplicatePlayer(id));
        }

        let physics = (self.lane_factory)(&self.config.lane);
        let player = Player::new(id, is_local, slot, physics, &prototypes, &self.config.lane);
        tracing::info!("Player {} joined on slot {} (local: {})", id, slot, is_local);
        self.events.push(SessionEvent::PlayerJoined {
            player_id: id,
            local: is_local,
            slot,
        });
        self.players.push(player);
        Ok(&self.players[self.players.len() - 1])
    }

    /// Remove a player. Unknown ids are ignored.
    pub fn remove_player(&mut self, id: u32) {
        let Some(index) = self.players.iter().position(|p| p.id == id) else {
            return;
        };
        let player = self.players.remove(index);
        if player.is_local {
            for gesture in self.gestures.values_mut() {
                gesture.cancel();
            }
        }
        tracing::info!("Player {} left", id);
        self.events.push(SessionEvent::PlayerLeft { player_id: id });
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: u32) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn local_player(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_local)
    }

    /// Score view of the local player for the HUD.
    pub fn local_score(&self) -> Option<ScoreSnapshot> {
        self.local_player().map(Player::snapshot)
    }

    pub fn snapshots(&self) -> Vec<ScoreSnapshot> {
        self.players.iter().map(Player::snapshot).collect()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // === Ball actions (shared by gestures and imitations) ===

    /// Move a player's ball along the foul line. Ignored while the ball rolls.
    pub fn position_ball(&mut self, id: u32, offset: f64, mode: PositionMode) {
        if let Some(player) = self.player_mut(id) {
            if !player.physics.simulation_active() {
                player.physics.position_ball(offset, mode);
            }
        }
    }

    /// Throw a player's ball. Ignored while the ball rolls.
    pub fn release_ball(&mut self, id: u32, velocity: f64, angle: f64) {
        if let Some(player) = self.player_mut(id) {
            if !player.physics.simulation_active() {
                tracing::debug!(
                    "Player {} released ball at {:.2} m/s, {:.3} rad",
                    id,
                    velocity,
                    angle
                );
                player.physics.release_ball(velocity, angle);
            }
        }
    }

    // === Imitations ===

    pub fn add_imitation(&mut self, slot: i32) {
        self.imitations
            .add(slot, &self.config.imitation, &mut self.rng);
    }

    pub fn imitations(&self) -> &ImitationScheduler {
        &self.imitations
    }

    pub fn imitations_mut(&mut self) -> &mut ImitationScheduler {
        &mut self.imitations
    }

    fn restart_imitation(&mut self, index: usize) {
        if let Some(player_id) = self
            .imitations
            .restart(index, &self.config.imitation, &mut self.rng)
        {
            self.remove_player(player_id);
        }
    }

    fn imitation_throw(&mut self, index: usize) {
        let Some((slot, existing)) = self
            .imitations
            .imitations
            .get(index)
            .map(|i| (i.slot, i.player_id))
        else {
            return;
        };

        let player_id = match existing {
            Some(id) => id,
            None => {
                let players = &self.players;
                let id = self
                    .imitations
                    .allocate_player_id(|id| players.iter().any(|p| p.id == id));
                if let Err(e) = self.add_player(id, false, slot) {
                    tracing::warn!("Imitation on slot {} could not join: {}", slot, e);
                    return;
                }
                self.imitations.imitations[index].player_id = Some(id);
                id
            }
        };

        let finished = match self.player(player_id) {
            Some(player) => self.imitations.imitations[index].finished(&player.scores),
            // Removed from outside; start over.
            None => true,
        };
        if finished {
            self.restart_imitation(index);
            return;
        }

        let throw = ImitationThrow::random(&self.config.imitation, &self.config.lane, &mut self.rng);
        self.position_ball(player_id, throw.position, PositionMode::Place);
        self.release_ball(player_id, throw.velocity, throw.angle);
    }

    // === Tick ===

    /// Advance the whole session by `dt` seconds. Does nothing until the
    /// prototypes are installed.
    pub fn update(&mut self, dt: f64) {
        if !self.is_ready() {
            return;
        }

        let due = self
            .imitations
            .tick(dt, &self.config.imitation, &mut self.rng);
        for index in due {
            self.imitation_throw(index);
        }

        let finished = self.update_players(dt);
        for player_id in finished {
            match self.imitations.find_by_player(player_id) {
                Some(index) => self.restart_imitation(index),
                None => {
                    // Remote bowler with nobody to restart it: park the lane.
                    if let Some(player) = self.player_mut(player_id) {
                        player.physics.reset(ResetKind::Full);
                    }
                }
            }
        }
    }

    /// Step every lane and score settled throws. Returns the non-local
    /// players whose game just ended.
    fn update_players(&mut self, dt: f64) -> Vec<u32> {
        let settle_time = self.config.settle_time;
        let mut finished = Vec::new();

        for player in &mut self.players {
            player.physics.update(dt);

            if player.throw_settled(settle_time) {
                // Frame the ball was scored in, before any restart.
                let outcome = player.settle_throw();
                let frame_number = player.scores.frame_number() as u32;
                match outcome {
                    ThrowOutcome::Continue { pins, reset } => {
                        tracing::debug!("Player {} knocked {} pins, {:?}", player.id, pins, reset);
                        self.events.push(SessionEvent::ThrowSettled {
                            player_id: player.id,
                            pins,
                            frame_number,
                        });
                    }
                    ThrowOutcome::GameOver { pins, final_score } => {
                        tracing::info!("Player {} finished with {}", player.id, final_score);
                        self.events.push(SessionEvent::ThrowSettled {
                            player_id: player.id,
                            pins,
                            frame_number,
                        });
                        if player.is_local {
                            self.events.push(SessionEvent::GameOver {
                                player_id: player.id,
                                final_score,
                            });
                            player.restart_game();
                        } else {
                            finished.push(player.id);
                        }
                    }
                }
            }

            player.sync_view();
        }

        finished
    }

    // === Pointer input ===

    pub fn on_action_down(&mut self, x: f64, y: f64, time_ms: f64) {
        self.on_source_action_down(InputSource::PRIMARY, x, y, time_ms);
    }

    pub fn on_action_move(&mut self, x: f64, y: f64, time_ms: f64) {
        self.on_source_action_move(InputSource::PRIMARY, x, y, time_ms);
    }

    pub fn on_action_up(&mut self, x: f64, y: f64, time_ms: f64) {
        self.on_source_action_up(InputSource::PRIMARY, x, y, time_ms);
    }

    pub fn on_source_action_down(&mut self, source: InputSource, x: f64, y: f64, time_ms: f64) {
        let Some((ray, ball)) = self.pointer_context(x, y) else {
            return;
        };
        self.gesture_mut(source)
            .on_action_down(ray, x, y, time_ms, ball);
    }

    pub fn on_source_action_move(&mut self, source: InputSource, x: f64, y: f64, _time_ms: f64) {
        let Some((ray, ball)) = self.pointer_context(x, y) else {
            return;
        };
        if let Some(command) = self.gesture_mut(source).on_action_move(ray, x, y, ball) {
            self.apply_command(command);
        }
    }

    pub fn on_source_action_up(&mut self, source: InputSource, x: f64, y: f64, time_ms: f64) {
        let Some((ray, ball)) = self.pointer_context(x, y) else {
            return;
        };
        if let Some(command) = self.gesture_mut(source).on_action_up(ray, time_ms, ball) {
            self.apply_command(command);
        }
    }

    pub fn gesture(&self, source: InputSource) -> Option<&ThrowGesture> {
        self.gestures.get(&source)
    }

    fn gesture_mut(&mut self, source: InputSource) -> &mut ThrowGesture {
        let (lane, gesture) = (self.config.lane, self.config.gesture);
        self.gestures
            .entry(source)
            .or_insert_with(|| ThrowGesture::new(lane, gesture))
    }

    fn pointer_context(&self, x: f64, y: f64) -> Option<(Ray, BallProbe)> {
        let player = self.local_player()?;
        let Some(camera) = self.camera.as_ref() else {
            tracing::warn!("Pointer input dropped: no camera attached");
            return None;
        };
        Some((camera.ray_at(x, y), player.probe()))
    }

    fn apply_command(&mut self, command: ThrowCommand) {
        let Some(id) = self.local_player().map(|p| p.id) else {
            return;
        };
        match command {
            ThrowCommand::Position(offset) => self.position_ball(id, offset, PositionMode::Drag),
            ThrowCommand::Release { velocity, angle } => self.release_ball(id, velocity, angle),
        }
    }
}
