use std::sync::Arc;
use futures::{StreamExt, SinkExt};
use log::{error, info, warn};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;
use tungstenite::Message;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use racing_physics::PhysicsEngine;
use racing_physics::config::ServerConfig;
use racing_physics::spawn::SpawnSlot;
use racing_physics::vehicle::{CATALOG, VehicleId};

use crate::state::{DriverInput, SharedGameState};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClientMessage {
    Input(DriverInput),
    Reset,
    Ping,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ServerMessage {
    Welcome {
        player_id: Uuid,
        vehicle_id: VehicleId,
        car: &'static str,
        spawn: SpawnSlot,
    },
    Full,
    Pong,
}

impl ServerMessage {
    fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

pub async fn start_websocket_server(
    cfg: ServerConfig,
    state: Arc<Mutex<SharedGameState>>,
    physics: Arc<Mutex<PhysicsEngine>>,
) {
    let listener = match TcpListener::bind(&cfg.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("❌ Failed to bind WebSocket port {}: {e}", cfg.bind_addr);
            return;
        }
    };

    info!("🌐 WebSocket listening on ws://{}", cfg.bind_addr);

    loop {
        let raw = match listener.accept().await {
            Ok((raw, _)) => raw,
            Err(e) => {
                warn!("⚠️ Accept failed: {e}");
                continue;
            }
        };
        tokio::spawn(handle_client(raw, Arc::clone(&state), Arc::clone(&physics)));
    }
}

async fn handle_client(
    raw: TcpStream,
    state: Arc<Mutex<SharedGameState>>,
    physics: Arc<Mutex<PhysicsEngine>>,
) {
    let ws = match accept_async(raw).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("⚠️ WebSocket handshake failed: {e}");
            return;
        }
    };
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) Outgoing message channel + send loop
    // -------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // -------------------------------
    // 2) Player id + random car on the next free grid slot
    // -------------------------------
    let player_id = Uuid::new_v4();
    let car = CATALOG
        .choose(&mut rand::thread_rng())
        .map(|(name, _)| *name)
        .unwrap_or("sport_coupe");

    let welcome = {
        // Lock order everywhere: physics, then state.
        let mut phys = physics.lock().await;
        let mut game = state.lock().await;
        game.register_client(player_id, tx.clone());
        let welcome = game.add_player(&mut phys, player_id, car).map(|p| ServerMessage::Welcome {
            player_id,
            vehicle_id: p.vehicle,
            car,
            spawn: p.slot,
        });
        welcome
    };

    let Some(welcome) = welcome else {
        info!("🚫 Grid full, turning away {player_id}");
        if let Some(json) = ServerMessage::Full.to_json() {
            let _ = tx.send(json);
        }
        state.lock().await.clients.remove(&player_id);
        return;
    };
    if let Some(json) = welcome.to_json() {
        let _ = tx.send(json);
    }

    // -------------------------------
    // 3) Main receive loop
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(_) => break,
        };
        if msg.is_close() {
            break;
        }
        let Ok(text) = msg.to_text() else { continue };

        let parsed = match serde_json::from_str::<ClientMessage>(text) {
            Ok(m) => m,
            Err(_) => continue,
        };

        match parsed {
            ClientMessage::Input(input) => {
                state.lock().await.update_input(player_id, input);
            }
            ClientMessage::Reset => {
                let mut phys = physics.lock().await;
                let game = state.lock().await;
                if let Some(p) = game.players.get(&player_id) {
                    if let Err(e) = phys.reset_vehicle(p.vehicle) {
                        warn!("⚠️ Reset for {player_id} failed: {e}");
                    }
                }
            }
            ClientMessage::Ping => {
                if let Some(json) = ServerMessage::Pong.to_json() {
                    let _ = tx.send(json);
                }
            }
        }
    }

    info!("🔴 Player disconnected: {player_id}");
    let mut phys = physics.lock().await;
    let mut game = state.lock().await;
    game.remove_player(&mut phys, player_id);
}
