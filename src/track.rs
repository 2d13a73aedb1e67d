// src/track.rs
//
// Static collision layout for a circuit. Pure data: `PhysicsEngine::build_track`
// turns it into fixed bodies.

use std::f32::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

/// Axis-aligned static box (centre + half extents).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticBox {
    pub center: [f32; 3],
    pub half_extents: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: [f32; 3],
    pub heading: f32, // yaw about +y, 0 faces +z
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    pub name: String,
    pub track_surfaces: Vec<StaticBox>,
    pub barriers: Vec<StaticBox>,
    pub grass_patches: Vec<StaticBox>,
    pub spawn: SpawnPoint,
}

// ---------------------------------------------
// Oval circuit constants
// ---------------------------------------------
const SLAB: StaticBox = StaticBox {
    center: [0.0, -0.1, 0.0],
    half_extents: [100.0, 0.1, 100.0],
};
const BARRIER_HALF: [f32; 3] = [0.5, 0.75, 0.5]; // 1 x 1.5 x 1 block
const INNER_RING: (usize, f32) = (64, 25.0);
const OUTER_RING: (usize, f32) = (80, 35.0);

/// `count` barrier blocks evenly spaced on a circle around the origin.
pub fn barrier_ring(count: usize, radius: f32, half_extents: [f32; 3]) -> Vec<StaticBox> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU;
            StaticBox {
                center: [angle.cos() * radius, half_extents[1], angle.sin() * radius],
                half_extents,
            }
        })
        .collect()
}

impl TrackLayout {
    /// Ring circuit: one asphalt slab, inner + outer barrier rings, driver
    /// spawning between them.
    pub fn oval_circuit() -> Self {
        let mut barriers = barrier_ring(INNER_RING.0, INNER_RING.1, BARRIER_HALF);
        barriers.extend(barrier_ring(OUTER_RING.0, OUTER_RING.1, BARRIER_HALF));

        Self {
            name: "oval_circuit".to_string(),
            track_surfaces: vec![SLAB],
            barriers,
            grass_patches: Vec::new(),
            spawn: SpawnPoint {
                position: [30.0, 1.0, 0.0],
                heading: -FRAC_PI_2,
            },
        }
    }

    pub fn static_box_count(&self) -> usize {
        self.track_surfaces.len() + self.barriers.len() + self.grass_patches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn oval_has_both_barrier_rings() {
        let track = TrackLayout::oval_circuit();
        assert_eq!(track.barriers.len(), 64 + 80);
        assert_eq!(track.static_box_count(), 145);

        for b in &track.barriers[..64] {
            let r = b.center[0].hypot(b.center[2]);
            assert_relative_eq!(r, 25.0, epsilon = 1e-3);
            assert_relative_eq!(b.center[1], 0.75);
        }
        let r = track.barriers[64].center[0].hypot(track.barriers[64].center[2]);
        assert_relative_eq!(r, 35.0, epsilon = 1e-3);
    }

    #[test]
    fn spawn_sits_between_the_rings() {
        let track = TrackLayout::oval_circuit();
        let [x, _, z] = track.spawn.position;
        let r = x.hypot(z);
        assert!(r > 25.0 && r < 35.0);
    }
}
