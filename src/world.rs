// src/world.rs

use log::{debug, warn};
use rapier3d::prelude::*;

use crate::config::WorldConfig;
use crate::materials::{SurfaceContactHooks, SurfaceId, SurfaceMaterialTable, surface_of};

pub const GROUP_STATIC: Group = Group::from_bits_truncate(0b0001);
pub const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);
pub const GROUP_WHEEL: Group = Group::from_bits_truncate(0b0100);

/// Static surfaces block chassis and wheels.
pub fn static_groups() -> InteractionGroups {
    InteractionGroups::new(GROUP_STATIC, GROUP_CHASSIS | GROUP_WHEEL)
}

/// Chassis hit the world and each other.
pub fn chassis_groups() -> InteractionGroups {
    InteractionGroups::new(GROUP_CHASSIS, GROUP_STATIC | GROUP_CHASSIS)
}

/// Wheels only ever touch static geometry (never their own chassis).
pub fn wheel_groups() -> InteractionGroups {
    InteractionGroups::new(GROUP_WHEEL, GROUP_STATIC)
}

const RUNAWAY_LIMIT: Real = 1_000.0;

/// One touching collider pair after a sub-step.
#[derive(Debug, Clone, Copy)]
pub struct ContactEvent {
    pub collider1: ColliderHandle,
    pub collider2: ColliderHandle,
    pub body1: Option<RigidBodyHandle>,
    pub body2: Option<RigidBodyHandle>,
    pub point: Point<Real>,               // world space
    pub normal: Vector<Real>,             // from collider1 towards collider2
    pub relative_velocity: Vector<Real>,  // linvel(body1) - linvel(body2)
    pub surface1: Option<SurfaceId>,
    pub surface2: Option<SurfaceId>,
}

impl ContactEvent {
    pub fn involves(&self, body: RigidBodyHandle) -> bool {
        self.body1 == Some(body) || self.body2 == Some(body)
    }

    /// Surface of the collider on the other side of `body`.
    pub fn other_surface(&self, body: RigidBodyHandle) -> Option<SurfaceId> {
        if self.body1 == Some(body) {
            self.surface2
        } else {
            self.surface1
        }
    }

    pub fn sliding_speed(&self) -> Real {
        self.relative_velocity.magnitude()
    }
}

#[derive(Debug, Default)]
pub struct StepOutcome {
    pub substeps: usize,
    pub contacts: Vec<ContactEvent>,
    pub runaway: Vec<RigidBodyHandle>,
}

pub struct RigidBodyWorld {
    pub gravity: Vector<Real>,
    pub pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd: CCDSolver,
    pub query_pipeline: QueryPipeline,
    timestep: Real,
    max_substeps: usize,
    accumulator: Real,
}

impl RigidBodyWorld {
    pub fn new(cfg: &WorldConfig) -> Self {
        let [gx, gy, gz] = cfg.gravity;
        Self {
            gravity: vector![gx, gy, gz],
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            timestep: cfg.timestep,
            max_substeps: cfg.max_substeps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn timestep(&self) -> Real {
        self.timestep
    }

    // ============================================
    // Static geometry
    // ============================================

    /// Infinite plane at y = 0.
    pub fn add_ground_plane(&mut self, surface: SurfaceId) -> ColliderHandle {
        let body = self.bodies.insert(RigidBodyBuilder::fixed().build());
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(static_groups())
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .user_data(surface.to_user_data())
            .build();
        self.colliders.insert_with_parent(collider, body, &mut self.bodies)
    }

    /// Axis-aligned fixed box, used for track slabs, barriers and grass patches.
    pub fn add_static_box(
        &mut self,
        center: Vector<Real>,
        half_extents: Vector<Real>,
        surface: SurfaceId,
    ) -> ColliderHandle {
        let body = self.bodies.insert(RigidBodyBuilder::fixed().translation(center).build());
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .collision_groups(static_groups())
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .user_data(surface.to_user_data())
            .build();
        self.colliders.insert_with_parent(collider, body, &mut self.bodies)
    }

    // ============================================
    // Dynamic bodies + joints
    // ============================================

    pub fn insert_body(&mut self, body: RigidBody, collider: Collider) -> RigidBodyHandle {
        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    pub fn insert_joint(
        &mut self,
        parent: RigidBodyHandle,
        child: RigidBodyHandle,
        joint: impl Into<GenericJoint>,
    ) -> ImpulseJointHandle {
        self.joints.insert(parent, child, joint, true)
    }

    pub fn remove_joint(&mut self, handle: ImpulseJointHandle) -> bool {
        self.joints.remove(handle, true).is_some()
    }

    /// Removes the body, its colliders and any joint still attached to it.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn contains_body(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    pub fn contains_joint(&self, handle: ImpulseJointHandle) -> bool {
        self.joints.get(handle).is_some()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    // ============================================
    // Stepping
    // ============================================

    /// Advances by the real elapsed `dt` in fixed sub-steps. Time beyond the
    /// sub-step budget is dropped rather than carried into the next call.
    pub fn step(&mut self, dt: Real, table: &SurfaceMaterialTable) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        if !dt.is_finite() || dt < 0.0 {
            warn!("⚠️ Ignoring world step with bad dt = {dt}");
            return outcome;
        }
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            warn!("⚠️ World timestep {} is unusable, not stepping", self.timestep);
            return outcome;
        }

        self.accumulator += dt;
        let hooks = SurfaceContactHooks { table };
        let params = IntegrationParameters {
            dt: self.timestep,
            ..IntegrationParameters::default()
        };

        while self.accumulator >= self.timestep && outcome.substeps < self.max_substeps {
            self.pipeline.step(
                &self.gravity,
                &params,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.joints,
                &mut self.multibody_joints,
                &mut self.ccd,
                Some(&mut self.query_pipeline),
                &hooks,
                &(),
            );
            self.accumulator -= self.timestep;
            outcome.substeps += 1;
            self.collect_contacts(&mut outcome.contacts);
        }

        if self.accumulator >= self.timestep {
            debug!(
                "dropping {:.4}s of simulation time after {} substeps",
                self.accumulator, outcome.substeps
            );
            self.accumulator %= self.timestep;
        }

        if outcome.substeps > 0 {
            outcome.runaway = self.runaway_bodies();
        }
        outcome
    }

    fn collect_contacts(&self, out: &mut Vec<ContactEvent>) {
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let surface1 = self.colliders.get(pair.collider1).and_then(surface_of);
            let surface2 = self.colliders.get(pair.collider2).and_then(surface_of);

            for manifold in &pair.manifolds {
                let Some(contact) = manifold.data.solver_contacts.first() else {
                    continue;
                };
                let body1 = manifold.data.rigid_body1;
                let body2 = manifold.data.rigid_body2;
                let velocity_of = |handle: Option<RigidBodyHandle>| {
                    handle
                        .and_then(|h| self.bodies.get(h))
                        .map(|b| *b.linvel())
                        .unwrap_or_else(Vector::zeros)
                };

                out.push(ContactEvent {
                    collider1: pair.collider1,
                    collider2: pair.collider2,
                    body1,
                    body2,
                    point: contact.point,
                    normal: manifold.data.normal,
                    relative_velocity: velocity_of(body1) - velocity_of(body2),
                    surface1,
                    surface2,
                });
            }
        }
    }

    /// Dynamic bodies that went non-finite or flew past the world limits.
    fn runaway_bodies(&self) -> Vec<RigidBodyHandle> {
        let mut bad = Vec::new();
        for (handle, body) in self.bodies.iter() {
            if !body.is_dynamic() {
                continue;
            }
            let pos = body.translation();
            let runaway = pos.iter().any(|c| !c.is_finite() || c.abs() > RUNAWAY_LIMIT);
            if runaway {
                warn!("⚠️ Runaway body {:?} at {:?}", handle, pos);
                bad.push(handle);
            }
        }
        bad
    }
}
