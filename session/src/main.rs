use bowling_session::assets::{load_prototypes, BuiltinScene, GltfScene};
use bowling_session::config::SessionConfig;
use bowling_session::game_loop::{run_session_loop, SessionBroadcast, SessionCommand};
use bowling_session::gesture::PointerRay;
use bowling_session::lane::KinematicLane;
use bowling_session::state::Session;
use bowling_shared::config::GameConfig;
use bowling_shared::vec3::{vec3, Ray};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Camera hovering over the foul line, one metre per 500 pixels.
struct OverheadCamera;

impl PointerRay for OverheadCamera {
    fn ray_at(&self, x: f64, y: f64) -> Ray {
        Ray::new(vec3(x / 500.0, 3.0, y / 500.0), vec3(0.0, -1.0, 0.0))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match SessionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid session configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid session configuration: {}", e);
        std::process::exit(1);
    }

    let prototypes = match &config.scene_path {
        Some(path) => load_prototypes(&GltfScene::new(path)).await,
        None => load_prototypes(&BuiltinScene).await,
    };
    let prototypes = match prototypes {
        Ok(prototypes) => prototypes,
        Err(e) => {
            eprintln!("Session could not start: {}", e);
            std::process::exit(1);
        }
    };

    let mut session = match Session::new(
        GameConfig::default(),
        config.rng_seed,
        KinematicLane::factory(),
    ) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Session could not start: {}", e);
            std::process::exit(1);
        }
    };
    session.install_prototypes(prototypes);
    session.set_camera(Box::new(OverheadCamera));
    if let Err(e) = session.add_player(0, true, 0) {
        eprintln!("Local player could not join: {}", e);
        std::process::exit(1);
    }
    for &slot in &config.imitation_slots {
        session.add_imitation(slot);
    }

    let (cmd_tx, cmd_rx) = mpsc::channel::<SessionCommand>(256);
    let (broadcast_tx, mut broadcast_rx) = broadcast::channel::<SessionBroadcast>(64);

    // Log what the HUD would show
    tokio::spawn(async move {
        loop {
            match broadcast_rx.recv().await {
                Ok(SessionBroadcast::Event(event)) => {
                    if let Ok(json) = serde_json::to_string(&event) {
                        tracing::info!("{}", json);
                    }
                }
                Ok(SessionBroadcast::Scores(scores)) => {
                    tracing::debug!("{} lanes in play", scores.len());
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("HUD logger lagged by {} messages", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let run_seconds = config.run_seconds;
    let session_loop = tokio::spawn(async move {
        run_session_loop(session, cmd_rx, broadcast_tx, &config).await
    });

    tracing::info!("Bowling session started");
    match run_seconds {
        Some(seconds) => tokio::time::sleep(Duration::from_secs_f64(seconds)).await,
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Could not listen for Ctrl-C: {}", e);
            }
        }
    }

    let _ = cmd_tx.send(SessionCommand::Shutdown).await;
    match session_loop.await {
        Ok(session) => {
            for snapshot in session.snapshots() {
                println!(
                    "player {}: {} after frame {}{}",
                    snapshot.player_id,
                    snapshot.score,
                    snapshot.frame_number + 1,
                    if snapshot.game_over { " (game over)" } else { "" }
                );
            }
        }
        Err(e) => {
            eprintln!("Session loop failed: {}", e);
            std::process::exit(1);
        }
    }
}
