use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use racing_physics::effects::SurfaceEffect;
use racing_physics::engine::{Eviction, PhysicsEngine};
use racing_physics::spawn::{SpawnGrid, SpawnSlot};
use racing_physics::telemetry::VehicleTelemetry;
use racing_physics::vehicle::{VehicleId, catalog_spec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverInput {
    #[serde(default)]
    pub throttle: f32,
    #[serde(default)]
    pub brake: f32,
    #[serde(default)]
    pub steer: f32,
}

pub struct Player {
    pub id: Uuid,
    pub car: &'static str, // catalog name
    pub vehicle: VehicleId,
    pub slot: SpawnSlot,
    pub last_input: DriverInput,
}

#[derive(Serialize)]
pub struct PlayerSnapshot<'a> {
    pub player_id: Uuid,
    pub car: &'a str,
    #[serde(flatten)]
    pub telemetry: VehicleTelemetry,
}

#[derive(Serialize)]
#[serde(tag = "type", rename = "snapshot")]
pub struct Snapshot<'a> {
    pub tick: u64,
    pub players: Vec<PlayerSnapshot<'a>>,
    pub effects: &'a [(VehicleId, SurfaceEffect)],
}

pub struct SharedGameState {
    pub tick: u64,
    pub clients: HashMap<Uuid, UnboundedSender<String>>,
    pub players: HashMap<Uuid, Player>,
    pub spawns: SpawnGrid,
}

impl SharedGameState {
    pub fn new(spawns: SpawnGrid) -> Self {
        Self {
            tick: 0,
            clients: HashMap::new(),
            players: HashMap::new(),
            spawns,
        }
    }

    pub fn register_client(&mut self, id: Uuid, tx: UnboundedSender<String>) {
        self.clients.insert(id, tx);
    }

    /// Spawns the player's car on a free grid slot. `None` when the grid is full.
    pub fn add_player(
        &mut self,
        engine: &mut PhysicsEngine,
        id: Uuid,
        car: &'static str,
    ) -> Option<&Player> {
        let spec = catalog_spec(car)?;
        let slot = self.spawns.allocate(id)?;
        let vehicle = match engine.create_vehicle(spec, slot.position, slot.heading) {
            Ok(v) => v,
            Err(e) => {
                warn!("⚠️ Could not spawn {car} for {id}: {e}");
                self.spawns.release(id);
                return None;
            }
        };
        info!("🟢 Player {id} drives {car} ({vehicle}) from slot {}", slot.index);

        self.players.insert(
            id,
            Player {
                id,
                car,
                vehicle,
                slot,
                last_input: DriverInput::default(),
            },
        );
        self.players.get(&id)
    }

    pub fn update_input(&mut self, id: Uuid, input: DriverInput) {
        if let Some(p) = self.players.get_mut(&id) {
            p.last_input = input;
        }
    }

    pub fn remove_player(&mut self, engine: &mut PhysicsEngine, id: Uuid) {
        self.clients.remove(&id);
        self.spawns.release(id);
        if let Some(p) = self.players.remove(&id) {
            engine.remove_vehicle(p.vehicle);
        }
    }

    /// Pushes every player's latest input into the engine.
    pub fn apply_inputs(&self, engine: &mut PhysicsEngine) {
        for p in self.players.values() {
            let i = p.last_input;
            if let Err(e) = engine.apply_input(p.vehicle, i.throttle, i.brake, i.steer) {
                warn!("⚠️ Input for {} dropped: {e}", p.id);
            }
        }
    }

    /// Players whose car was evicted get a fresh one on their own slot.
    pub fn respawn_evicted(&mut self, engine: &mut PhysicsEngine, evicted: &[Eviction]) {
        for eviction in evicted {
            let Some(p) = self.players.values_mut().find(|p| p.vehicle == eviction.vehicle) else {
                continue;
            };
            let Some(spec) = catalog_spec(p.car) else { continue };
            match engine.create_vehicle(spec, p.slot.position, p.slot.heading) {
                Ok(v) => {
                    info!("🔁 Respawned {} for player {}", v, p.id);
                    p.vehicle = v;
                    p.last_input = DriverInput::default();
                }
                Err(e) => warn!("⚠️ Respawn failed for {}: {e}", p.id),
            }
        }
    }

    /// Build and send a snapshot of all players to all clients.
    pub fn broadcast_snapshot(&mut self, engine: &PhysicsEngine, effects: &[(VehicleId, SurfaceEffect)]) {
        let mut players = Vec::with_capacity(self.players.len());
        for p in self.players.values() {
            if let Ok(telemetry) = engine.telemetry(p.vehicle) {
                players.push(PlayerSnapshot {
                    player_id: p.id,
                    car: p.car,
                    telemetry,
                });
            }
        }

        let json = match serde_json::to_string(&Snapshot { tick: self.tick, players, effects }) {
            Ok(json) => json,
            Err(e) => {
                warn!("⚠️ Snapshot serialization failed: {e}");
                return;
            }
        };

        // Drop clients whose send loop has gone away.
        self.clients.retain(|_, tx| tx.send(json.clone()).is_ok());
    }
}
