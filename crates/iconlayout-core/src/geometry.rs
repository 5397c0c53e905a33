use crate::types::GridGeometry;
use serde::Serialize;

/// Smallest distance reported between two slots
pub const MIN_DISTANCE: f64 = 1e-9;

/// Position of a slot; dock slots sit on the virtual row below the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlotCoord {
    pub slot: u32,
    pub row: u32,
    pub col: u32,
}

/// Slot coordinates for one grid; distances are computed on demand.
#[derive(Debug, Clone)]
pub struct SlotGeometry {
    coords: Vec<SlotCoord>,
}

impl SlotGeometry {
    pub fn new(grid: &GridGeometry) -> Self {
        let coords = (1..=grid.slot_count())
            .map(|slot| slot_coord(grid, slot))
            .collect();

        Self { coords }
    }

    pub fn slot_count(&self) -> u32 {
        self.coords.len() as u32
    }

    pub fn coords(&self) -> &[SlotCoord] {
        &self.coords
    }

    pub fn coord(&self, slot: u32) -> Option<SlotCoord> {
        self.index(slot).map(|i| self.coords[i])
    }

    /// Euclidean distance between two distinct slots. `None` for `a == b`
    /// or slots outside the grid.
    pub fn distance(&self, a: u32, b: u32) -> Option<f64> {
        let (i, j) = (self.index(a)?, self.index(b)?);
        if i == j {
            return None;
        }
        Some(between(&self.coords[i], &self.coords[j]))
    }

    /// Every unordered pair `(a, b)` with `a < b` and its distance.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        self.coords.iter().enumerate().flat_map(move |(i, a)| {
            self.coords[i + 1..]
                .iter()
                .map(move |b| (a.slot, b.slot, between(a, b)))
        })
    }

    fn index(&self, slot: u32) -> Option<usize> {
        if slot == 0 || slot > self.slot_count() {
            None
        } else {
            Some(slot as usize - 1)
        }
    }
}

fn between(a: &SlotCoord, b: &SlotCoord) -> f64 {
    let dr = a.row as f64 - b.row as f64;
    let dc = a.col as f64 - b.col as f64;
    dr.hypot(dc).max(MIN_DISTANCE)
}

fn slot_coord(grid: &GridGeometry, slot: u32) -> SlotCoord {
    let main = grid.main_slots();
    if slot <= main {
        SlotCoord {
            slot,
            row: (slot - 1) / grid.cols,
            col: (slot - 1) % grid.cols,
        }
    } else {
        SlotCoord {
            slot,
            row: grid.rows,
            col: slot - main - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_row_major_with_dock_row() {
        let geometry = SlotGeometry::new(&GridGeometry::default());

        assert_eq!(geometry.slot_count(), 28);
        let first = geometry.coord(1).unwrap();
        assert_eq!((first.row, first.col), (0, 0));
        let fifth = geometry.coord(5).unwrap();
        assert_eq!((fifth.row, fifth.col), (1, 0));
        let last_main = geometry.coord(24).unwrap();
        assert_eq!((last_main.row, last_main.col), (5, 3));
        let first_dock = geometry.coord(25).unwrap();
        assert_eq!((first_dock.row, first_dock.col), (6, 0));
        assert!(geometry.coord(29).is_none());
        assert!(geometry.coord(0).is_none());
    }

    #[test]
    fn test_known_distances() {
        let geometry = SlotGeometry::new(&GridGeometry::new(2, 2, 0));

        assert_eq!(geometry.distance(1, 2), Some(1.0));
        assert_eq!(geometry.distance(1, 3), Some(1.0));
        let diagonal = geometry.distance(1, 4).unwrap();
        assert!((diagonal - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_large_grid_distances_without_table() {
        let geometry = SlotGeometry::new(&GridGeometry::new(1000, 4, 0));

        assert_eq!(geometry.coords().len(), 4000);
        let corner = geometry.distance(1, 4000).unwrap();
        assert!((corner - 999f64.hypot(3.0)).abs() < 1e-9);
        assert_eq!(geometry.distance(4000, 1), Some(corner));
    }

    #[test]
    fn test_same_slot_and_out_of_range_are_undefined() {
        let geometry = SlotGeometry::new(&GridGeometry::new(1, 3, 1));

        assert_eq!(geometry.distance(2, 2), None);
        assert_eq!(geometry.distance(1, 5), None);
        assert_eq!(geometry.distance(0, 1), None);
    }

    #[test]
    fn test_pairs_cover_upper_triangle() {
        let geometry = SlotGeometry::new(&GridGeometry::new(2, 3, 2));
        let pairs: Vec<_> = geometry.pairs().collect();

        assert_eq!(pairs.len(), 8 * 7 / 2);
        for (a, b, d) in pairs {
            assert!(a < b);
            assert_eq!(geometry.distance(a, b), Some(d));
        }
    }

    proptest! {
        #[test]
        fn distance_is_symmetric_and_positive(
            rows in 1u32..6,
            cols in 1u32..6,
            dock in 0u32..5,
            a_seed in 0u32..1000,
            b_seed in 0u32..1000,
        ) {
            let grid = GridGeometry::new(rows, cols, dock);
            let geometry = SlotGeometry::new(&grid);
            let a = 1 + a_seed % grid.slot_count();
            let b = 1 + b_seed % grid.slot_count();
            prop_assume!(a != b);

            let ab = geometry.distance(a, b).unwrap();
            prop_assert_eq!(Some(ab), geometry.distance(b, a));
            prop_assert!(ab >= MIN_DISTANCE);
        }
    }
}
