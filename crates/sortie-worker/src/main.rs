use std::io::{self, BufRead};
use std::sync::Arc;

use env_logger::Env;
use log::{error, info};

use sortie_core::config::CampaignConfig;
use sortie_core::events::WorkerEvent;
use sortie_sim::engine::SimConfig;
use sortie_worker::game_loop;
use sortie_worker::ipc;
use sortie_worker::state::WorkerHandle;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let seed = std::env::var("SORTIE_SEED").ok().and_then(|s| s.parse().ok());
    let campaign = match std::env::var("SORTIE_CONFIG") {
        Ok(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("failed to load config {path}: {e}");
                std::process::exit(1);
            }
        },
        Err(_) => CampaignConfig::default(),
    };
    let config = SimConfig { seed, campaign };

    let handle = WorkerHandle::new();
    let spawned = game_loop::spawn_game_loop(config, Arc::clone(&handle.latest_state), |event| {
        ipc::emit(&mut io::stdout().lock(), &event);
    });
    let (cmd_tx, thread) = match spawned {
        Ok(spawned) => spawned,
        Err(e) => {
            error!("failed to spawn game loop: {e}");
            std::process::exit(1);
        }
    };
    if let Ok(mut tx) = handle.command_tx.lock() {
        *tx = Some(cmd_tx);
    }
    if let Ok(mut running) = handle.running.lock() {
        *running = true;
    }
    info!("sortie worker ready");

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("failed to read stdin: {e}");
                break;
            }
        };
        let result = ipc::parse_message(&line).and_then(|message| match message {
            Some(message) => handle.send(message),
            None => Ok(()),
        });
        if let Err(message) = result {
            error!("{message}");
            ipc::emit(&mut io::stdout().lock(), &WorkerEvent::Error { message });
        }
    }

    if let Err(e) = handle.shutdown() {
        error!("shutdown failed: {e}");
    }
    if thread.join().is_err() {
        error!("game loop panicked");
    }
}

/// Tuning overrides from a JSON file; missing fields keep their defaults.
fn load_config(path: &str) -> Result<CampaignConfig, String> {
    let json = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    CampaignConfig::from_json(&json).map_err(|e| e.to_string())
}
