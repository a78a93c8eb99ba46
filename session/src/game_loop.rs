use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::state::Session;
use bowling_shared::protocol::{ScoreSnapshot, SessionEvent};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Commands from the host (input thread, lobby) to the session loop
#[derive(Debug)]
pub enum SessionCommand {
    ActionDown {
        x: f64,
        y: f64,
        time_ms: f64,
    },
    ActionMove {
        x: f64,
        y: f64,
        time_ms: f64,
    },
    ActionUp {
        x: f64,
        y: f64,
        time_ms: f64,
    },
    AddPlayer {
        id: u32,
        local: bool,
        slot: i32,
        response: oneshot::Sender<Result<(), SessionError>>,
    },
    RemovePlayer {
        id: u32,
    },
    Shutdown,
}

/// Broadcasts from the session loop to HUDs and loggers
#[derive(Debug, Clone)]
pub enum SessionBroadcast {
    Scores(Vec<ScoreSnapshot>),
    Event(SessionEvent),
}

/// Run the session tick loop until shutdown. Hands the session back so the
/// host can read the final scores.
pub async fn run_session_loop(
    mut session: Session,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    broadcast_tx: broadcast::Sender<SessionBroadcast>,
    config: &SessionConfig,
) -> Session {
    let tick_rate_hz = config.tick_rate_hz.max(1);
    let dt = 1.0 / tick_rate_hz as f64;
    let broadcast_every_n = tick_rate_hz
        .checked_div(config.broadcast_rate_hz)
        .unwrap_or(1)
        .max(1) as u64;
    let mut tick_count: u64 = 0;

    let mut tick_interval = tokio::time::interval(Duration::from_secs_f64(dt));
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                session.update(dt);

                for event in session.drain_events() {
                    let _ = broadcast_tx.send(SessionBroadcast::Event(event));
                }

                // Scores at lower rate
                tick_count += 1;
                if tick_count % broadcast_every_n == 0 {
                    let _ = broadcast_tx.send(SessionBroadcast::Scores(session.snapshots()));
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::ActionDown { x, y, time_ms }) => {
                        session.on_action_down(x, y, time_ms);
                    }
                    Some(SessionCommand::ActionMove { x, y, time_ms }) => {
                        session.on_action_move(x, y, time_ms);
                    }
                    Some(SessionCommand::ActionUp { x, y, time_ms }) => {
                        session.on_action_up(x, y, time_ms);
                    }
                    Some(SessionCommand::AddPlayer { id, local, slot, response }) => {
                        let result = session.add_player(id, local, slot).map(|_| ());
                        if let Err(e) = &result {
                            tracing::warn!("Player {} could not join: {}", id, e);
                        }
                        let _ = response.send(result);
                    }
                    Some(SessionCommand::RemovePlayer { id }) => {
                        session.remove_player(id);
                    }
                    Some(SessionCommand::Shutdown) | None => break,
                }
            }
        }
    }

    // Events raised by the last commands
    for event in session.drain_events() {
        let _ = broadcast_tx.send(SessionBroadcast::Event(event));
    }

    tracing::info!("Session loop ended after {} ticks", tick_count);
    session
}
