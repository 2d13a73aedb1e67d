// src/materials.rs
//
// Named surface materials plus the pairwise contact table used by the solver.
// Colliders carry their surface id in `user_data`; `SurfaceContactHooks`
// rewrites rapier's solver contacts with the table's coefficients.

use std::collections::HashMap;
use std::fmt;

use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::MaterialError;

/// Integer handle into a `SurfaceMaterialTable`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u16);

impl SurfaceId {
    /// Collider `user_data` encoding. 0 is reserved for "untagged".
    pub fn to_user_data(self) -> u128 {
        self.0 as u128 + 1
    }

    pub fn from_user_data(data: u128) -> Option<Self> {
        match data {
            0 => None,
            d if d <= u16::MAX as u128 + 1 => Some(SurfaceId((d - 1) as u16)),
            _ => None,
        }
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SurfaceMaterial {
    pub name: String,
    pub friction: f32,
    pub restitution: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactCoefficients {
    pub friction: f32,
    pub restitution: f32,
}

impl ContactCoefficients {
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self { friction, restitution }
    }
}

/// Fallback for pairs without an explicit entry.
pub const DEFAULT_CONTACT: ContactCoefficients = ContactCoefficients::new(0.4, 0.3);

fn check_coefficient(field: &'static str, value: f32) -> Result<f32, MaterialError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MaterialError::InvalidCoefficient { field, value })
    }
}

#[inline]
fn pair_key(a: SurfaceId, b: SurfaceId) -> (SurfaceId, SurfaceId) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Clone, Debug)]
pub struct SurfaceMaterialTable {
    materials: Vec<SurfaceMaterial>,
    by_name: HashMap<String, SurfaceId>,
    pairs: HashMap<(SurfaceId, SurfaceId), ContactCoefficients>,
    default_contact: ContactCoefficients,
}

impl Default for SurfaceMaterialTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Ids of the five materials registered by `SurfaceMaterialTable::racing()`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StandardSurfaces {
    pub tire: SurfaceId,
    pub ground: SurfaceId,
    pub track: SurfaceId,
    pub barrier: SurfaceId,
    pub grass: SurfaceId,
}

impl SurfaceMaterialTable {
    pub fn new() -> Self {
        Self {
            materials: Vec::new(),
            by_name: HashMap::new(),
            pairs: HashMap::new(),
            default_contact: DEFAULT_CONTACT,
        }
    }

    /// Reference racing set: tire, ground, asphalt track, bouncy barrier, grass,
    /// with explicit tire pairings for every surface a wheel can touch.
    pub fn racing() -> (Self, StandardSurfaces) {
        Self::try_racing().expect("reference racing materials are unique and in range")
    }

    /// `racing()` built through the public registration API.
    pub fn try_racing() -> Result<(Self, StandardSurfaces), MaterialError> {
        let mut table = Self::new();
        let tire = table.register_material("tire", 0.9, 0.1)?;
        let ground = table.register_material("ground", 0.8, 0.1)?;
        let track = table.register_material("track", 1.2, 0.05)?;
        let barrier = table.register_material("barrier", 0.3, 0.8)?;
        let grass = table.register_material("grass", 0.4, 0.2)?;

        table.register_pair_contact(tire, ground, 0.8, 0.1)?;
        table.register_pair_contact(tire, track, 1.2, 0.05)?;
        table.register_pair_contact(tire, grass, 0.4, 0.2)?;
        table.register_pair_contact(tire, barrier, 0.3, 0.8)?;

        Ok((table, StandardSurfaces { tire, ground, track, barrier, grass }))
    }

    pub fn register_material(
        &mut self,
        name: &str,
        friction: f32,
        restitution: f32,
    ) -> Result<SurfaceId, MaterialError> {
        if self.by_name.contains_key(name) {
            return Err(MaterialError::Duplicate(name.to_string()));
        }
        let friction = check_coefficient("friction", friction)?;
        let restitution = check_coefficient("restitution", restitution)?;

        let id = u16::try_from(self.materials.len())
            .map(SurfaceId)
            .map_err(|_| MaterialError::TableFull(self.materials.len()))?;
        self.materials.push(SurfaceMaterial {
            name: name.to_string(),
            friction,
            restitution,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Overrides the solver default for one (unordered) pair of surfaces.
    pub fn register_pair_contact(
        &mut self,
        a: SurfaceId,
        b: SurfaceId,
        friction: f32,
        restitution: f32,
    ) -> Result<(), MaterialError> {
        for id in [a, b] {
            if self.material(id).is_none() {
                return Err(MaterialError::Unknown(id));
            }
        }
        let c = ContactCoefficients::new(
            check_coefficient("friction", friction)?,
            check_coefficient("restitution", restitution)?,
        );
        self.pairs.insert(pair_key(a, b), c);
        Ok(())
    }

    pub fn id(&self, name: &str) -> Option<SurfaceId> {
        self.by_name.get(name).copied()
    }

    pub fn material(&self, id: SurfaceId) -> Option<&SurfaceMaterial> {
        self.materials.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn explicit_pair(&self, a: SurfaceId, b: SurfaceId) -> Option<ContactCoefficients> {
        self.pairs.get(&pair_key(a, b)).copied()
    }

    /// Effective coefficients for a contact between two surfaces.
    pub fn contact(&self, a: SurfaceId, b: SurfaceId) -> ContactCoefficients {
        self.explicit_pair(a, b).unwrap_or(self.default_contact)
    }

    /// Same as `contact`, for colliders that may be untagged.
    pub fn contact_between(&self, a: Option<SurfaceId>, b: Option<SurfaceId>) -> ContactCoefficients {
        match (a, b) {
            (Some(a), Some(b)) => self.contact(a, b),
            _ => self.default_contact,
        }
    }

    pub fn default_contact(&self) -> ContactCoefficients {
        self.default_contact
    }
}

pub fn surface_of(collider: &Collider) -> Option<SurfaceId> {
    SurfaceId::from_user_data(collider.user_data)
}

/// Rapier hook that replaces per-collider friction/restitution combining with
/// the pairwise table.
pub struct SurfaceContactHooks<'a> {
    pub table: &'a SurfaceMaterialTable,
}

impl PhysicsHooks for SurfaceContactHooks<'_> {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let a = context.colliders.get(context.collider1).and_then(surface_of);
        let b = context.colliders.get(context.collider2).and_then(surface_of);
        let c = self.table.contact_between(a, b);

        for contact in context.solver_contacts.iter_mut() {
            contact.friction = c.friction;
            contact.restitution = c.restitution;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut table = SurfaceMaterialTable::new();
        table.register_material("ice", 0.05, 0.0).unwrap();
        assert_eq!(
            table.register_material("ice", 0.1, 0.0),
            Err(MaterialError::Duplicate("ice".into()))
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn pair_lookup_is_symmetric_and_falls_back() {
        let (table, s) = SurfaceMaterialTable::racing();
        assert_eq!(table.contact(s.tire, s.track), table.contact(s.track, s.tire));
        assert_eq!(table.contact(s.barrier, s.grass), DEFAULT_CONTACT);
        assert_eq!(table.contact_between(None, Some(s.tire)), DEFAULT_CONTACT);
    }

    #[test]
    fn pair_registration_checks_ids_and_values() {
        let (mut table, s) = SurfaceMaterialTable::racing();
        let bogus = SurfaceId(42);
        assert_eq!(
            table.register_pair_contact(s.tire, bogus, 1.0, 0.0),
            Err(MaterialError::Unknown(bogus))
        );
        assert!(table.register_pair_contact(s.ground, s.barrier, f32::NAN, 0.0).is_err());

        table.register_pair_contact(s.barrier, s.ground, 0.5, 0.5).unwrap();
        assert_eq!(table.contact(s.ground, s.barrier), ContactCoefficients::new(0.5, 0.5));
    }

    #[test]
    fn racing_set_goes_through_registration() {
        let (table, s) = SurfaceMaterialTable::try_racing().unwrap();
        assert_eq!(table.id("barrier"), Some(s.barrier));
        assert_eq!(table.explicit_pair(s.grass, s.tire), Some(ContactCoefficients::new(0.4, 0.2)));
        assert_eq!(table.explicit_pair(s.track, s.grass), None);
    }

    #[test]
    fn ids_never_wrap_when_the_table_is_full() {
        let mut table = SurfaceMaterialTable::new();
        for i in 0..=u16::MAX as usize {
            table.register_material(&format!("m{i}"), 0.5, 0.0).unwrap();
        }
        assert_eq!(table.id("m65535"), Some(SurfaceId(u16::MAX)));
        assert_eq!(
            table.register_material("one_too_many", 0.5, 0.0),
            Err(MaterialError::TableFull(65_536))
        );
        assert_eq!(table.id("m0"), Some(SurfaceId(0)));
    }

    #[test]
    fn user_data_round_trips_surface_ids() {
        assert_eq!(SurfaceId::from_user_data(0), None);
        let id = SurfaceId(3);
        assert_eq!(SurfaceId::from_user_data(id.to_user_data()), Some(id));
    }
}
