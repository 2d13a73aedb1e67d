// src/engine.rs
//
// Owns the rigid-body world, the surface table and every vehicle. One
// `update(dt)` = world step, then each vehicle's force pipeline.

use std::collections::BTreeMap;

use log::{info, warn};
use rapier3d::prelude::*;
use serde::Serialize;

use crate::config::{SimConfig, VehicleTuning};
use crate::controller::VehicleController;
use crate::effects::SurfaceEffect;
use crate::error::{EngineError, VehicleError};
use crate::materials::{StandardSurfaces, SurfaceMaterialTable};
use crate::telemetry::VehicleTelemetry;
use crate::track::{StaticBox, TrackLayout};
use crate::vehicle::{ChassisLayout, VehicleId, VehicleSpec};
use crate::world::RigidBodyWorld;

#[inline] fn vec3(a: [f32; 3]) -> Vector<Real> { vector![a[0], a[1], a[2]] }

/// A vehicle dropped from the registry during a tick, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Eviction {
    pub vehicle: VehicleId,
    pub reason: VehicleError,
}

#[derive(Debug, Default)]
pub struct TickReport {
    pub substeps: usize,
    pub contacts: usize,
    pub evicted: Vec<Eviction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub vehicles: Vec<VehicleTelemetry>,
}

pub struct PhysicsEngine {
    world: RigidBodyWorld,
    materials: SurfaceMaterialTable,
    surfaces: StandardSurfaces,
    vehicles: BTreeMap<VehicleId, VehicleController>,
    static_colliders: Vec<ColliderHandle>,
    chassis: ChassisLayout,
    tuning: VehicleTuning,
}

impl PhysicsEngine {
    /// Empty world with the racing materials and a ground plane at y = 0.
    pub fn new(cfg: &SimConfig) -> Self {
        let (materials, surfaces) = SurfaceMaterialTable::racing();
        let mut world = RigidBodyWorld::new(&cfg.world);
        let ground = world.add_ground_plane(surfaces.ground);

        info!(
            "🌎 Physics world ready: dt = {:.4}s, max {} substeps",
            cfg.world.timestep, cfg.world.max_substeps
        );

        Self {
            world,
            materials,
            surfaces,
            vehicles: BTreeMap::new(),
            static_colliders: vec![ground],
            chassis: cfg.chassis,
            tuning: cfg.tuning.clone(),
        }
    }

    // ============================================
    // Static geometry
    // ============================================

    pub fn create_track_surface(&mut self, slab: StaticBox) -> ColliderHandle {
        self.add_static(slab, self.surfaces.track)
    }

    pub fn create_barrier(&mut self, barrier: StaticBox) -> ColliderHandle {
        self.add_static(barrier, self.surfaces.barrier)
    }

    pub fn create_grass_patch(&mut self, patch: StaticBox) -> ColliderHandle {
        self.add_static(patch, self.surfaces.grass)
    }

    fn add_static(&mut self, b: StaticBox, surface: crate::materials::SurfaceId) -> ColliderHandle {
        let handle = self.world.add_static_box(vec3(b.center), vec3(b.half_extents), surface);
        self.static_colliders.push(handle);
        handle
    }

    /// Instantiates every box of the layout; returns how many were added.
    pub fn build_track(&mut self, layout: &TrackLayout) -> usize {
        for slab in &layout.track_surfaces {
            self.create_track_surface(*slab);
        }
        for barrier in &layout.barriers {
            self.create_barrier(*barrier);
        }
        for patch in &layout.grass_patches {
            self.create_grass_patch(*patch);
        }
        info!(
            "🏁 Track `{}` built: {} surfaces, {} barriers, {} grass patches",
            layout.name,
            layout.track_surfaces.len(),
            layout.barriers.len(),
            layout.grass_patches.len()
        );
        layout.static_box_count()
    }

    pub fn static_collider_count(&self) -> usize {
        self.static_colliders.len()
    }

    // ============================================
    // Vehicle registry
    // ============================================

    pub fn create_vehicle(
        &mut self,
        spec: VehicleSpec,
        position: [f32; 3],
        heading: f32,
    ) -> Result<VehicleId, EngineError> {
        let id = VehicleId::generate();
        let controller = VehicleController::spawn(
            &mut self.world,
            id,
            spec,
            self.chassis,
            self.tuning.clone(),
            self.surfaces,
            vec3(position),
            heading,
        )?;
        self.vehicles.insert(id, controller);
        Ok(id)
    }

    /// Destroys and unregisters; unknown ids are ignored.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> bool {
        let Some(mut car) = self.vehicles.remove(&id) else {
            return false;
        };
        if let Err(e) = car.destroy(&mut self.world) {
            warn!("⚠️ Removing {id}: {e}");
        }
        true
    }

    pub fn apply_input(
        &mut self,
        id: VehicleId,
        throttle: f32,
        brake: f32,
        steering: f32,
    ) -> Result<(), EngineError> {
        let car = self.vehicles.get_mut(&id).ok_or(EngineError::UnknownVehicle(id))?;
        car.apply_input(throttle, brake, steering)?;
        Ok(())
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&VehicleController> {
        self.vehicles.get(&id)
    }

    pub fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut VehicleController> {
        self.vehicles.get_mut(&id)
    }

    pub fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.keys().copied().collect()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    // ============================================
    // Tick
    // ============================================

    /// Never fails: a vehicle that errors out is destroyed, unregistered and
    /// listed in the report while the others keep running.
    pub fn update(&mut self, dt: f32) -> TickReport {
        let outcome = self.world.step(dt, &self.materials);
        let mut report = TickReport {
            substeps: outcome.substeps,
            contacts: outcome.contacts.len(),
            evicted: Vec::new(),
        };

        for body in &outcome.runaway {
            if let Some(car) = self.vehicles.values().find(|c| c.owns_body(*body)) {
                let id = car.id();
                if !report.evicted.iter().any(|e| e.vehicle == id) {
                    report.evicted.push(Eviction {
                        vehicle: id,
                        reason: VehicleError::WorldDesync { vehicle: id, missing: "finite body state" },
                    });
                }
            }
        }

        if dt.is_finite() && dt >= 0.0 {
            for (id, car) in self.vehicles.iter_mut() {
                if report.evicted.iter().any(|e| e.vehicle == *id) {
                    continue;
                }
                if let Err(reason) = car.update(&mut self.world, &outcome.contacts, dt) {
                    report.evicted.push(Eviction { vehicle: *id, reason });
                }
            }
        }

        for eviction in &report.evicted {
            warn!("⚠️ Evicting {}: {}", eviction.vehicle, eviction.reason);
            self.remove_vehicle(eviction.vehicle);
        }
        report
    }

    /// Resets every vehicle in place; vehicles that can no longer reset are evicted.
    pub fn reset(&mut self) -> Vec<Eviction> {
        let mut evicted = Vec::new();
        for (id, car) in self.vehicles.iter_mut() {
            if let Err(reason) = car.reset(&mut self.world) {
                evicted.push(Eviction { vehicle: *id, reason });
            }
        }
        for eviction in &evicted {
            warn!("⚠️ Evicting {} on reset: {}", eviction.vehicle, eviction.reason);
            self.remove_vehicle(eviction.vehicle);
        }
        evicted
    }

    pub fn reset_vehicle(&mut self, id: VehicleId) -> Result<(), EngineError> {
        let car = self.vehicles.get_mut(&id).ok_or(EngineError::UnknownVehicle(id))?;
        car.reset(&mut self.world)?;
        Ok(())
    }

    // ============================================
    // Read side
    // ============================================

    pub fn telemetry(&self, id: VehicleId) -> Result<VehicleTelemetry, EngineError> {
        let car = self.vehicles.get(&id).ok_or(EngineError::UnknownVehicle(id))?;
        Ok(car.telemetry(&self.world)?)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let vehicles = self
            .vehicles
            .values()
            .filter_map(|car| car.telemetry(&self.world).ok())
            .collect();
        WorldSnapshot { vehicles }
    }

    /// Every queued surface effect, tagged with its vehicle.
    pub fn drain_effects(&mut self) -> Vec<(VehicleId, SurfaceEffect)> {
        let mut out = Vec::new();
        for (id, car) in self.vehicles.iter_mut() {
            if let Ok(effects) = car.drain_effects() {
                out.extend(effects.into_iter().map(|e| (*id, e)));
            }
        }
        out
    }

    pub fn world(&self) -> &RigidBodyWorld {
        &self.world
    }

    /// Direct world access; changing a vehicle's bodies through it shows up
    /// as a desync on the next tick.
    pub fn world_mut(&mut self) -> &mut RigidBodyWorld {
        &mut self.world
    }

    pub fn materials(&self) -> &SurfaceMaterialTable {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut SurfaceMaterialTable {
        &mut self.materials
    }

    pub fn surfaces(&self) -> StandardSurfaces {
        self.surfaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::SPORT_COUPE;

    #[test]
    fn oval_track_adds_every_box() {
        let mut engine = PhysicsEngine::new(&SimConfig::default());
        let added = engine.build_track(&TrackLayout::oval_circuit());
        assert_eq!(added, 145);
        // + ground plane
        assert_eq!(engine.static_collider_count(), 146);
    }

    #[test]
    fn unknown_ids_are_harmless_to_remove_but_rejected_for_input() {
        let mut engine = PhysicsEngine::new(&SimConfig::default());
        let ghost = VehicleId::generate();
        assert!(!engine.remove_vehicle(ghost));
        assert!(matches!(
            engine.apply_input(ghost, 1.0, 0.0, 0.0),
            Err(EngineError::UnknownVehicle(_))
        ));
    }

    #[test]
    fn remove_vehicle_clears_its_bodies() {
        let mut engine = PhysicsEngine::new(&SimConfig::default());
        let before = engine.world().body_count();
        let id = engine.create_vehicle(SPORT_COUPE, [0.0, 1.0, 0.0], 0.0).unwrap();
        assert_eq!(engine.world().body_count(), before + 5);

        assert!(engine.remove_vehicle(id));
        assert_eq!(engine.world().body_count(), before);
        assert_eq!(engine.world().joint_count(), 0);
        assert_eq!(engine.vehicle_count(), 0);
    }

    #[test]
    fn drain_effects_tags_and_empties_every_queue() {
        use crate::dynamics::WheelId;
        use crate::effects::EffectKind;
        use crate::world::ContactEvent;

        let mut engine = PhysicsEngine::new(&SimConfig::default());
        let id = engine.create_vehicle(SPORT_COUPE, [0.0, 1.0, 0.0], 0.0).unwrap();
        let grass = engine.surfaces().grass;
        let wheel = engine.vehicle(id).unwrap().wheel(WheelId::FR).body;
        let dusty = ContactEvent {
            collider1: ColliderHandle::invalid(),
            collider2: ColliderHandle::invalid(),
            body1: None,
            body2: Some(wheel),
            point: Point::origin(),
            normal: Vector::y(),
            relative_velocity: vector![0.0, 0.0, 4.0],
            surface1: Some(grass),
            surface2: None,
        };

        let car = engine.vehicles.get_mut(&id).unwrap();
        car.update(&mut engine.world, &[dusty, dusty], 1.0 / 60.0).unwrap();

        let drained = engine.drain_effects();
        assert_eq!(drained.len(), 2);
        assert!(drained.iter().all(|(v, e)| *v == id && e.kind == EffectKind::Dust));
        assert!(engine.drain_effects().is_empty());
    }

    #[test]
    fn bad_dt_leaves_vehicles_alone() {
        let mut engine = PhysicsEngine::new(&SimConfig::default());
        let id = engine.create_vehicle(SPORT_COUPE, [0.0, 1.0, 0.0], 0.0).unwrap();
        engine.apply_input(id, 1.0, 0.0, 0.0).unwrap();
        let report = engine.update(f32::NAN);
        assert_eq!(report.substeps, 0);
        assert!(report.evicted.is_empty());
        assert_eq!(engine.vehicle(id).unwrap().engine_rpm().unwrap(), 800.0);
    }
}
