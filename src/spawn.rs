use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::track::SpawnPoint;

// ---------------------------------------------
// SPAWN SLOT RETURNED TO STATE + NET
// ---------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpawnSlot {
    pub index: usize,
    pub position: [f32; 3],
    pub heading: f32,
}

// ---------------------------------------------
// STARTING GRID
// ---------------------------------------------
/// Hands out grid slots around a track's spawn point. Slot 0 is the spawn
/// point itself; further columns alternate right / left of it, and extra
/// rows line up behind.
#[derive(Debug)]
pub struct SpawnGrid {
    origin: SpawnPoint,
    max_slots: usize,
    columns: usize,
    lateral_spacing: f32, // m between columns
    row_spacing: f32,     // m between rows
    taken: HashMap<Uuid, usize>,
}

impl SpawnGrid {
    pub fn new(origin: SpawnPoint, max_slots: usize) -> Self {
        Self {
            origin,
            max_slots,
            columns: 8,
            lateral_spacing: 3.5,
            row_spacing: 6.0,
            taken: HashMap::new(),
        }
    }

    pub fn with_spacing(mut self, columns: usize, lateral: f32, row: f32) -> Self {
        self.columns = columns.max(1);
        self.lateral_spacing = lateral;
        self.row_spacing = row;
        self
    }

    // ---------------------------------------------------------
    // Pose of a slot in world space
    // ---------------------------------------------------------
    pub fn slot(&self, index: usize) -> SpawnSlot {
        let col = index % self.columns;
        let row = index / self.columns;

        // 0, +1, -1, +2, -2 ...
        let step = col.div_ceil(2) as f32;
        let side = if col % 2 == 1 { 1.0 } else { -1.0 };
        let lateral = side * step * self.lateral_spacing;
        let back = row as f32 * self.row_spacing;

        let h = self.origin.heading;
        let forward = [h.sin(), h.cos()]; // (x, z)
        let right = [h.cos(), -h.sin()];
        let [x, y, z] = self.origin.position;

        SpawnSlot {
            index,
            position: [
                x + right[0] * lateral - forward[0] * back,
                y,
                z + right[1] * lateral - forward[1] * back,
            ],
            heading: h,
        }
    }

    // ---------------------------------------------------------
    // Allocation pipeline called from net.rs
    // ---------------------------------------------------------
    /// First free slot, or the one this player already holds. `None` when full.
    pub fn allocate(&mut self, player_id: Uuid) -> Option<SpawnSlot> {
        if let Some(&index) = self.taken.get(&player_id) {
            return Some(self.slot(index));
        }
        let index = (0..self.max_slots).find(|i| !self.taken.values().any(|t| t == i))?;
        self.taken.insert(player_id, index);
        Some(self.slot(index))
    }

    pub fn release(&mut self, player_id: Uuid) -> Option<usize> {
        self.taken.remove(&player_id)
    }

    pub fn occupied(&self) -> usize {
        self.taken.len()
    }

    pub fn capacity(&self) -> usize {
        self.max_slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(max: usize) -> SpawnGrid {
        SpawnGrid::new(SpawnPoint { position: [0.0, 1.0, 0.0], heading: 0.0 }, max)
    }

    #[test]
    fn first_slot_is_the_spawn_point() {
        let mut g = grid(4);
        let slot = g.allocate(Uuid::new_v4()).unwrap();
        assert_eq!(slot.index, 0);
        assert_eq!(slot.position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn columns_alternate_sides_and_rows_go_backwards() {
        let g = grid(8).with_spacing(2, 4.0, 6.0);
        assert_relative_eq!(g.slot(1).position[0], 4.0);
        assert_relative_eq!(g.slot(2).position[2], -6.0);
        assert_relative_eq!(g.slot(2).position[0], 0.0);
    }

    #[test]
    fn full_grid_refuses_and_release_frees_a_slot() {
        let mut g = grid(2);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        g.allocate(a).unwrap();
        g.allocate(b).unwrap();
        assert!(g.allocate(Uuid::new_v4()).is_none());

        assert_eq!(g.release(a), Some(0));
        let c = g.allocate(Uuid::new_v4()).unwrap();
        assert_eq!(c.index, 0);
        // Re-allocating keeps a player's slot.
        assert_eq!(g.allocate(b).unwrap().index, 1);
        assert_eq!(g.occupied(), 2);
    }
}
