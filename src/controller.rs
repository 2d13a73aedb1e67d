// src/controller.rs
//
// One car in the world: a chassis body, four wheel bodies on spherical joints,
// and the runtime state the per-tick force pipeline reads and writes.

use log::{debug, info, trace};
use nalgebra::UnitQuaternion;
use rapier3d::prelude::*;

use crate::config::VehicleTuning;
use crate::dynamics::{
    ControlInput, ForcePlan, GripBand, PowertrainState, SolveContext, TickSolution,
    TireThermalModel, VehicleKinematics, WheelId, solve_tick,
};
use crate::effects::{self, SurfaceEffect};
use crate::error::{SpecError, VehicleError};
use crate::materials::StandardSurfaces;
use crate::telemetry::{TireTemperatures, VehicleTelemetry};
use crate::vehicle::{ChassisLayout, VehicleId, VehicleSpec};
use crate::world::{ContactEvent, RigidBodyWorld, chassis_groups, wheel_groups};

const MAX_QUEUED_EFFECTS: usize = 256;

#[inline] fn v3(v: &Vector<Real>) -> [f32; 3] { [v.x, v.y, v.z] }

/// One corner: wheel body plus the joint holding it to the chassis.
#[derive(Debug, Clone, Copy)]
pub struct WheelAssembly {
    pub id: WheelId,
    pub body: RigidBodyHandle,
    pub joint: ImpulseJointHandle,
    pub anchor: Point<Real>, // chassis space
    pub radius: Real,
}

impl WheelAssembly {
    fn missing_label(&self) -> &'static str {
        match self.id {
            WheelId::FL => "wheel FL",
            WheelId::FR => "wheel FR",
            WheelId::RL => "wheel RL",
            WheelId::RR => "wheel RR",
        }
    }
}

/// Chassis-space wheel mount: +z forward, left wheels at -x.
pub fn wheel_anchor(layout: &ChassisLayout, wheel: WheelId) -> Point<Real> {
    let [ax, ay, az] = layout.wheel_anchor;
    let x = if wheel.is_left() { -ax.abs() } else { ax.abs() };
    let z = if wheel.is_front() { az.abs() } else { -az.abs() };
    point![x, ay, z]
}

/// Solid-box inertia about the principal axes.
fn box_inertia(mass: Real, [hx, hy, hz]: [Real; 3]) -> Vector<Real> {
    let k = mass / 3.0;
    vector![k * (hy * hy + hz * hz), k * (hx * hx + hz * hz), k * (hx * hx + hy * hy)]
}

pub struct VehicleController {
    id: VehicleId,
    spec: VehicleSpec,
    layout: ChassisLayout,
    tuning: VehicleTuning,
    surfaces: StandardSurfaces,

    chassis: RigidBodyHandle,
    wheels: [WheelAssembly; 4],
    spawn_pose: Isometry<Real>,

    input: ControlInput,
    powertrain: PowertrainState,
    thermal: TireThermalModel,
    current_speed: f32,   // km/h
    effective_brake: f32, // brake actually used last tick
    abs_locked: [bool; 4],
    effects: Vec<SurfaceEffect>,
    destroyed: bool,
}

impl VehicleController {
    /// Builds the chassis, wheels and suspension joints. Nothing is inserted
    /// into the world when the spec is rejected.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        world: &mut RigidBodyWorld,
        id: VehicleId,
        spec: VehicleSpec,
        layout: ChassisLayout,
        tuning: VehicleTuning,
        surfaces: StandardSurfaces,
        position: Vector<Real>,
        heading: Real,
    ) -> Result<Self, SpecError> {
        spec.validate()?;

        let rotation = UnitQuaternion::from_axis_angle(&Vector::y_axis(), heading);
        let spawn_pose = Isometry::from_parts(
            (position + vector![0.0, layout.spawn_lift, 0.0]).into(),
            rotation,
        );

        // === Chassis ===
        let [hx, hy, hz] = layout.half_extents;
        let [cx, cy, cz] = layout.com_offset;
        let chassis_rb = RigidBodyBuilder::dynamic()
            .position(spawn_pose)
            .additional_mass_properties(MassProperties::new(
                point![cx, cy, cz],
                spec.mass,
                box_inertia(spec.mass, layout.half_extents),
            ))
            .can_sleep(false)
            .ccd_enabled(true)
            .build();
        let chassis_collider = ColliderBuilder::cuboid(hx, hy, hz)
            .density(0.0) // mass comes from the body's mass properties
            .collision_groups(chassis_groups())
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .build();
        let chassis = world.insert_body(chassis_rb, chassis_collider);

        // === Wheels + suspension ===
        let wheels = WheelId::ALL.map(|wheel| {
            let anchor = wheel_anchor(&layout, wheel);
            let wheel_rb = RigidBodyBuilder::dynamic()
                .position(Isometry::from_parts(
                    (spawn_pose * anchor).coords.into(),
                    rotation,
                ))
                .can_sleep(false)
                .build();
            let wheel_collider = ColliderBuilder::ball(layout.wheel_radius)
                .mass(layout.wheel_mass)
                .collision_groups(wheel_groups())
                .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
                .user_data(surfaces.tire.to_user_data())
                .build();
            let body = world.insert_body(wheel_rb, wheel_collider);

            let joint = SphericalJointBuilder::new()
                .local_anchor1(anchor)
                .local_anchor2(Point::origin())
                .contacts_enabled(false);
            let joint = world.insert_joint(chassis, body, joint);

            WheelAssembly { id: wheel, body, joint, anchor, radius: layout.wheel_radius }
        });

        info!(
            "🚗 Spawned {} at {:?} heading {:.2} rad (mass {} kg)",
            id,
            v3(&spawn_pose.translation.vector),
            heading,
            spec.mass
        );

        Ok(Self {
            id,
            spec,
            layout,
            powertrain: PowertrainState::idle(tuning.drivetrain.idle_rpm),
            thermal: TireThermalModel::new(tuning.thermal),
            tuning,
            surfaces,
            chassis,
            wheels,
            spawn_pose,
            input: ControlInput::default(),
            current_speed: 0.0,
            effective_brake: 0.0,
            abs_locked: [false; 4],
            effects: Vec::new(),
            destroyed: false,
        })
    }

    fn ensure_alive(&self) -> Result<(), VehicleError> {
        if self.destroyed {
            Err(VehicleError::Destroyed(self.id))
        } else {
            Ok(())
        }
    }

    fn desync(&self, missing: &'static str) -> VehicleError {
        VehicleError::WorldDesync { vehicle: self.id, missing }
    }

    /// Every body and joint this vehicle owns must still be in the world.
    pub fn check_world(&self, world: &RigidBodyWorld) -> Result<(), VehicleError> {
        self.ensure_alive()?;
        if !world.contains_body(self.chassis) {
            return Err(self.desync("chassis"));
        }
        for w in &self.wheels {
            if !world.contains_body(w.body) {
                return Err(self.desync(w.missing_label()));
            }
            if !world.contains_joint(w.joint) {
                return Err(self.desync("suspension joint"));
            }
        }
        Ok(())
    }

    fn chassis_body<'w>(&self, world: &'w RigidBodyWorld) -> Result<&'w RigidBody, VehicleError> {
        self.ensure_alive()?;
        world.body(self.chassis).ok_or_else(|| self.desync("chassis"))
    }

    // ============================================
    // Input
    // ============================================

    /// Stored for the next tick; out-of-range values are clamped.
    pub fn apply_input(&mut self, throttle: f32, brake: f32, steering: f32) -> Result<(), VehicleError> {
        self.ensure_alive()?;
        self.input = ControlInput::clamped(throttle, brake, steering);
        Ok(())
    }

    pub fn input(&self) -> Result<ControlInput, VehicleError> {
        self.ensure_alive()?;
        Ok(self.input)
    }

    // ============================================
    // Per-tick update
    // ============================================

    /// Runs once per world step: contacts -> tire heat + effects, then the
    /// force pipeline, whose forces integrate during the next world step.
    pub fn update(
        &mut self,
        world: &mut RigidBodyWorld,
        contacts: &[ContactEvent],
        dt: Real,
    ) -> Result<TickSolution, VehicleError> {
        self.check_world(world)?;

        self.absorb_contacts(world, contacts);
        let kin = self.kinematics(world)?;

        let ctx = SolveContext {
            dt,
            spec: &self.spec,
            tuning: &self.tuning,
            grip: self.thermal.grip(),
        };
        let solution = solve_tick(&ctx, &self.input, &kin, &self.powertrain);

        self.write_forces(world, &solution.forces)?;

        if solution.abs.locked_count() > 0 {
            debug!(
                "{} ABS: {} wheel(s) locked, brake {:.2} -> {:.2}",
                self.id,
                solution.abs.locked_count(),
                self.input.brake,
                solution.abs.brake
            );
        }

        self.powertrain = solution.powertrain;
        self.current_speed = solution.display_speed;
        self.effective_brake = solution.abs.brake;
        self.abs_locked = solution.abs.locked;
        Ok(solution)
    }

    fn absorb_contacts(&mut self, world: &RigidBodyWorld, contacts: &[ContactEvent]) {
        for contact in contacts {
            for wheel in &self.wheels {
                if !contact.involves(wheel.body) {
                    continue;
                }
                let sliding = contact.sliding_speed();
                self.thermal.absorb_contact(wheel.id, sliding);
                trace!("{} {} contact, sliding {:.2} m/s", self.id, wheel.id, sliding);

                let surface = contact.other_surface(wheel.body);
                let Some((kind, intensity)) =
                    effects::classify(surface, sliding, &self.surfaces, &self.tuning.effects)
                else {
                    continue;
                };
                let Some(body) = world.body(wheel.body) else { continue };
                if self.effects.len() >= MAX_QUEUED_EFFECTS {
                    self.effects.remove(0);
                }
                self.effects.push(SurfaceEffect {
                    kind,
                    wheel: wheel.id,
                    position: v3(body.translation()),
                    velocity: v3(body.linvel()),
                    intensity,
                });
            }
        }
    }

    fn kinematics(&self, world: &RigidBodyWorld) -> Result<VehicleKinematics, VehicleError> {
        let chassis = self.chassis_body(world)?;
        let rot = chassis.rotation();

        let mut wheel_surface_speed = [0.0; 4];
        for w in &self.wheels {
            let body = world.body(w.body).ok_or_else(|| self.desync(w.missing_label()))?;
            wheel_surface_speed[w.id.index()] = body.angvel().magnitude() * w.radius;
        }

        Ok(VehicleKinematics {
            forward: rot * Vector::z(),
            right: rot * Vector::x(),
            up: Vector::y(),
            linvel: *chassis.linvel(),
            wheel_surface_speed,
        })
    }

    /// Replaces last tick's user forces on all five bodies.
    fn write_forces(&self, world: &mut RigidBodyWorld, plan: &ForcePlan) -> Result<(), VehicleError> {
        let chassis = world.body_mut(self.chassis).ok_or_else(|| self.desync("chassis"))?;
        chassis.reset_forces(true);
        chassis.reset_torques(true);
        chassis.add_force(plan.chassis_force, true);
        chassis.add_torque(plan.chassis_torque, true);

        for w in &self.wheels {
            let body = world.body_mut(w.body).ok_or_else(|| self.desync(w.missing_label()))?;
            body.reset_forces(true);
            body.reset_torques(true);
            body.add_force(plan.wheel_forces[w.id.index()], true);
        }
        Ok(())
    }

    // ============================================
    // Lifecycle
    // ============================================

    /// Back to the spawn pose, at rest, with idle engine and fresh tires.
    pub fn reset(&mut self, world: &mut RigidBodyWorld) -> Result<(), VehicleError> {
        self.check_world(world)?;

        let pose = self.spawn_pose;
        let chassis = world.body_mut(self.chassis).ok_or_else(|| self.desync("chassis"))?;
        Self::park(chassis, pose);

        for w in &self.wheels {
            let body = world.body_mut(w.body).ok_or_else(|| self.desync(w.missing_label()))?;
            Self::park(body, Isometry::from_parts((pose * w.anchor).coords.into(), pose.rotation));
        }

        self.input = ControlInput::default();
        self.powertrain = PowertrainState::idle(self.tuning.drivetrain.idle_rpm);
        self.thermal.reset();
        self.current_speed = 0.0;
        self.effective_brake = 0.0;
        self.abs_locked = [false; 4];
        self.effects.clear();

        info!("🔄 Reset {}", self.id);
        Ok(())
    }

    fn park(body: &mut RigidBody, pose: Isometry<Real>) {
        body.set_position(pose, true);
        body.set_linvel(Vector::zeros(), true);
        body.set_angvel(Vector::zeros(), true);
        body.reset_forces(true);
        body.reset_torques(true);
    }

    /// Detaches joints and bodies. The controller is unusable afterwards;
    /// whatever already went missing from the world is skipped.
    pub fn destroy(&mut self, world: &mut RigidBodyWorld) -> Result<(), VehicleError> {
        self.ensure_alive()?;
        for w in &self.wheels {
            world.remove_joint(w.joint);
        }
        for w in &self.wheels {
            world.remove_body(w.body);
        }
        world.remove_body(self.chassis);
        self.effects.clear();
        self.destroyed = true;

        info!("🗑️ Destroyed {}", self.id);
        Ok(())
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether `body` is the chassis or one of the wheels.
    pub fn owns_body(&self, body: RigidBodyHandle) -> bool {
        self.chassis == body || self.wheels.iter().any(|w| w.body == body)
    }

    // ============================================
    // Queries
    // ============================================

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn spec(&self) -> &VehicleSpec {
        &self.spec
    }

    pub fn layout(&self) -> &ChassisLayout {
        &self.layout
    }

    pub fn chassis_handle(&self) -> RigidBodyHandle {
        self.chassis
    }

    pub fn wheel(&self, id: WheelId) -> &WheelAssembly {
        &self.wheels[id.index()]
    }

    pub fn position(&self, world: &RigidBodyWorld) -> Result<Vector<Real>, VehicleError> {
        Ok(*self.chassis_body(world)?.translation())
    }

    pub fn rotation(&self, world: &RigidBodyWorld) -> Result<UnitQuaternion<Real>, VehicleError> {
        Ok(*self.chassis_body(world)?.rotation())
    }

    pub fn velocity(&self, world: &RigidBodyWorld) -> Result<Vector<Real>, VehicleError> {
        Ok(*self.chassis_body(world)?.linvel())
    }

    /// km/h, as of the last update.
    pub fn current_speed(&self) -> Result<f32, VehicleError> {
        self.ensure_alive()?;
        Ok(self.current_speed)
    }

    pub fn engine_rpm(&self) -> Result<f32, VehicleError> {
        self.ensure_alive()?;
        Ok(self.powertrain.engine_rpm)
    }

    pub fn gear(&self) -> Result<u8, VehicleError> {
        self.ensure_alive()?;
        Ok(self.powertrain.gear)
    }

    pub fn turbo_boost(&self) -> Result<f32, VehicleError> {
        self.ensure_alive()?;
        Ok(self.powertrain.turbo_boost)
    }

    pub fn tire_temperatures(&self) -> Result<TireTemperatures, VehicleError> {
        self.ensure_alive()?;
        Ok(TireTemperatures::from_array(self.thermal.temperatures()))
    }

    pub fn grip(&self) -> Result<f32, VehicleError> {
        self.ensure_alive()?;
        Ok(self.thermal.grip())
    }

    pub fn grip_band(&self) -> Result<GripBand, VehicleError> {
        self.ensure_alive()?;
        Ok(self.thermal.band())
    }

    pub fn effective_brake(&self) -> Result<f32, VehicleError> {
        self.ensure_alive()?;
        Ok(self.effective_brake)
    }

    pub fn abs_locked(&self) -> Result<[bool; 4], VehicleError> {
        self.ensure_alive()?;
        Ok(self.abs_locked)
    }

    pub fn drain_effects(&mut self) -> Result<Vec<SurfaceEffect>, VehicleError> {
        self.ensure_alive()?;
        Ok(std::mem::take(&mut self.effects))
    }

    pub fn telemetry(&self, world: &RigidBodyWorld) -> Result<VehicleTelemetry, VehicleError> {
        let chassis = self.chassis_body(world)?;
        let q = chassis.rotation();
        Ok(VehicleTelemetry {
            id: self.id,
            position: v3(chassis.translation()),
            rotation: [q.i, q.j, q.k, q.w],
            velocity: v3(chassis.linvel()),
            speed: self.current_speed,
            speed_fraction: self.current_speed
                / (self.spec.max_speed * self.tuning.drivetrain.display_speed_factor),
            rpm: self.powertrain.engine_rpm,
            gear: self.powertrain.gear,
            turbo: self.powertrain.turbo_boost,
            brake: self.effective_brake,
            grip: self.thermal.grip(),
            grip_band: self.thermal.band(),
            tire_temperatures: TireTemperatures::from_array(self.thermal.temperatures()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::effects::EffectKind;
    use crate::materials::{SurfaceId, SurfaceMaterialTable};
    use crate::vehicle::SPORT_COUPE;
    use approx::assert_relative_eq;

    fn spawn_one(heading: Real) -> (RigidBodyWorld, SurfaceMaterialTable, VehicleController) {
        let (table, surfaces) = SurfaceMaterialTable::racing();
        let mut world = RigidBodyWorld::new(&WorldConfig::default());
        world.add_ground_plane(surfaces.ground);
        let car = VehicleController::spawn(
            &mut world,
            VehicleId::generate(),
            SPORT_COUPE,
            ChassisLayout::default(),
            VehicleTuning::default(),
            surfaces,
            vector![0.0, 1.0, 0.0],
            heading,
        )
        .unwrap();
        (world, table, car)
    }

    #[test]
    fn anchors_mirror_the_front_right_mount() {
        let layout = ChassisLayout::default();
        assert_eq!(wheel_anchor(&layout, WheelId::FL), point![-1.0, -0.2, 1.2]);
        assert_eq!(wheel_anchor(&layout, WheelId::RR), point![1.0, -0.2, -1.2]);
    }

    #[test]
    fn spawn_builds_five_bodies_and_four_joints() {
        let (world, _, car) = spawn_one(0.0);
        // ground + chassis + 4 wheels
        assert_eq!(world.body_count(), 6);
        assert_eq!(world.joint_count(), 4);
        assert!(car.check_world(&world).is_ok());

        let pos = car.position(&world).unwrap();
        assert_relative_eq!(pos.y, 1.5);
        assert_eq!(car.gear().unwrap(), 1);
        assert_eq!(car.engine_rpm().unwrap(), 800.0);
        assert_eq!(car.tire_temperatures().unwrap().to_array(), [80.0; 4]);
    }

    #[test]
    fn heading_rotates_the_wheels_with_the_chassis() {
        let (world, _, car) = spawn_one(std::f32::consts::FRAC_PI_2);
        let fl = world.body(car.wheel(WheelId::FL).body).unwrap().translation();
        // Facing +x: the front axle sits at +x, left wheels at +z.
        assert_relative_eq!(fl.x, 1.2, epsilon = 1e-5);
        assert_relative_eq!(fl.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn update_writes_rear_drive_force() {
        let (mut world, _, mut car) = spawn_one(0.0);
        car.apply_input(1.0, 0.0, 0.0).unwrap();
        let sol = car.update(&mut world, &[], 1.0 / 60.0).unwrap();

        let expected = 0.028 * 1200.0 * 20.0 / 2.0;
        assert_relative_eq!(sol.forces.wheel_forces[WheelId::RL.index()].z, expected, epsilon = 1e-3);
        let rl = world.body(car.wheel(WheelId::RL).body).unwrap();
        assert_relative_eq!(rl.user_force().z, expected, epsilon = 1e-3);
        assert!(car.engine_rpm().unwrap() > 800.0);
    }

    fn wheel_contact(wheel: RigidBodyHandle, surface: SurfaceId, sliding: Real) -> ContactEvent {
        ContactEvent {
            collider1: ColliderHandle::invalid(),
            collider2: ColliderHandle::invalid(),
            body1: Some(wheel),
            body2: None,
            point: Point::origin(),
            normal: Vector::y(),
            relative_velocity: vector![sliding, 0.0, 0.0],
            surface1: None,
            surface2: Some(surface),
        }
    }

    #[test]
    fn sliding_on_track_heats_that_tire_and_smokes() {
        let (mut world, _, mut car) = spawn_one(0.0);
        let (_, s) = SurfaceMaterialTable::racing();
        let rl = car.wheel(WheelId::RL).body;

        car.update(&mut world, &[wheel_contact(rl, s.track, 10.0)], 1.0 / 60.0).unwrap();

        let temps = car.tire_temperatures().unwrap();
        assert_relative_eq!(temps.rear_left, 80.0 + 10.0 * 0.5 - 0.02, epsilon = 1e-4);
        assert_eq!(temps.front_left, 80.0);
        assert_eq!(car.grip_band().unwrap(), GripBand::Optimal);

        let effects = car.drain_effects().unwrap();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind, EffectKind::TireSmoke);
        assert_eq!(effects[0].wheel, WheelId::RL);
        assert_relative_eq!(effects[0].intensity, 2.0);
        assert!(car.drain_effects().unwrap().is_empty());
    }

    #[test]
    fn grass_contact_kicks_up_dust_and_slow_track_contact_does_not_smoke() {
        let (mut world, _, mut car) = spawn_one(0.0);
        let (_, s) = SurfaceMaterialTable::racing();
        let fl = car.wheel(WheelId::FL).body;
        let fr = car.wheel(WheelId::FR).body;

        let contacts = [wheel_contact(fl, s.grass, 1.0), wheel_contact(fr, s.track, 1.0)];
        car.update(&mut world, &contacts, 1.0 / 60.0).unwrap();

        let effects = car.drain_effects().unwrap();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind, EffectKind::Dust);
        assert_eq!(effects[0].wheel, WheelId::FL);
        assert_relative_eq!(effects[0].intensity, 0.3);
    }

    #[test]
    fn sustained_sliding_overheats_and_drops_grip() {
        let (mut world, _, mut car) = spawn_one(0.0);
        let (_, s) = SurfaceMaterialTable::racing();
        let contacts: Vec<_> = WheelId::ALL
            .iter()
            .map(|w| wheel_contact(car.wheel(*w).body, s.ground, 20.0))
            .collect();
        for _ in 0..10 {
            car.update(&mut world, &contacts, 1.0 / 60.0).unwrap();
        }
        assert_eq!(car.tire_temperatures().unwrap().to_array(), [150.0; 4]);
        assert_eq!(car.grip_band().unwrap(), GripBand::Overheated);
        assert_relative_eq!(car.grip().unwrap(), 0.7);
    }

    #[test]
    fn effect_queue_is_capped() {
        let (mut world, _, mut car) = spawn_one(0.0);
        let (_, s) = SurfaceMaterialTable::racing();
        let rr = car.wheel(WheelId::RR).body;
        let contacts = vec![wheel_contact(rr, s.grass, 3.0); MAX_QUEUED_EFFECTS + 44];

        car.update(&mut world, &contacts, 1.0 / 60.0).unwrap();
        assert_eq!(car.drain_effects().unwrap().len(), MAX_QUEUED_EFFECTS);
    }

    #[test]
    fn contacts_of_other_bodies_are_ignored() {
        let (mut world, _, mut car) = spawn_one(0.0);
        let (_, s) = SurfaceMaterialTable::racing();
        let stranger = world.insert_body(
            RigidBodyBuilder::dynamic().build(),
            ColliderBuilder::ball(0.1).build(),
        );
        car.update(&mut world, &[wheel_contact(stranger, s.grass, 9.0)], 1.0 / 60.0).unwrap();
        assert_eq!(car.tire_temperatures().unwrap().to_array(), [80.0; 4]);
        assert!(car.drain_effects().unwrap().is_empty());
    }

    #[test]
    fn unknown_spec_is_rejected_before_touching_the_world() {
        let (_, surfaces) = SurfaceMaterialTable::racing();
        let mut world = RigidBodyWorld::new(&WorldConfig::default());
        let bad = VehicleSpec { mass: 0.0, ..SPORT_COUPE };
        let err = VehicleController::spawn(
            &mut world,
            VehicleId::generate(),
            bad,
            ChassisLayout::default(),
            VehicleTuning::default(),
            surfaces,
            Vector::zeros(),
            0.0,
        );
        assert!(err.is_err());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn missing_wheel_is_a_desync() {
        let (mut world, table, mut car) = spawn_one(0.0);
        let rr = car.wheel(WheelId::RR).body;
        world.remove_body(rr);
        let outcome = world.step(1.0 / 60.0, &table);
        let err = car.update(&mut world, &outcome.contacts, 1.0 / 60.0).unwrap_err();
        assert!(matches!(err, VehicleError::WorldDesync { missing: "wheel RR", .. }));
    }
}
