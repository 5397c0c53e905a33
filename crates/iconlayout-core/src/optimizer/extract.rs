use super::model::VariableIndex;
use super::*;
use good_lp::Variable;
use std::collections::BTreeMap;

/// Solved values above this count as selected
const SELECTED_THRESHOLD: f64 = 0.5;
/// Largest distance from 0 or 1 accepted for a binary
const INTEGRALITY_TOLERANCE: f64 = 1e-4;

/// Solved binaries, same shapes as [`VariableIndex`]
pub(super) struct Assignment {
    place: Vec<Vec<bool>>,
    folder_at: Vec<Vec<bool>>,
    in_folder: Vec<Vec<bool>>,
    pub(super) integral: bool,
}

impl VariableIndex {
    pub(super) fn read_back(&self, value: impl Fn(Variable) -> f64) -> Assignment {
        let mut integral = true;
        let place = select(&self.place, &value, &mut integral);
        let folder_at = select(&self.folder_at, &value, &mut integral);
        let in_folder = select(&self.in_folder, &value, &mut integral);

        Assignment {
            place,
            folder_at,
            in_folder,
            integral,
        }
    }
}

fn select(
    grid: &[Vec<Variable>],
    value: &impl Fn(Variable) -> f64,
    integral: &mut bool,
) -> Vec<Vec<bool>> {
    let mut selected = Vec::with_capacity(grid.len());
    for row in grid {
        let mut out = Vec::with_capacity(row.len());
        for &v in row {
            let x = value(v);
            if (x - x.round()).abs() > INTEGRALITY_TOLERANCE {
                *integral = false;
            }
            out.push(x > SELECTED_THRESHOLD);
        }
        selected.push(out);
    }
    selected
}

impl LayoutOptimizer {
    /// Rebuilds the slot and folder mappings from solved values.
    ///
    /// Returns `None` when the backend handed back a non-integral point.
    pub(super) fn extract(&self, assignment: &Assignment, objective: f64) -> Option<SolvedLayout> {
        if !assignment.integral {
            return None;
        }

        let mut slots: BTreeMap<u32, Occupant> = (1..=self.geometry.slot_count())
            .map(|slot| (slot, Occupant::Empty))
            .collect();

        for (item, row) in self.request.items.iter().zip(&assignment.place) {
            for (s, &on) in row.iter().enumerate() {
                if on {
                    slots.insert(s as u32 + 1, Occupant::Item(item.name.clone()));
                }
            }
        }
        for (genre, row) in self.folder_keys.iter().zip(&assignment.folder_at) {
            for (s, &on) in row.iter().enumerate() {
                if on {
                    slots.insert(s as u32 + 1, Occupant::Folder(genre.clone()));
                }
            }
        }

        // Membership comes from itemInFolder alone, independent of the folder's slot
        let mut folders: BTreeMap<String, Vec<String>> = self
            .folder_keys
            .iter()
            .map(|genre| (genre.clone(), Vec::new()))
            .collect();
        for (item, row) in self.request.items.iter().zip(&assignment.in_folder) {
            for (genre, &on) in self.folder_keys.iter().zip(row) {
                if !on {
                    continue;
                }
                if let Some(members) = folders.get_mut(genre) {
                    members.push(item.name.clone());
                }
            }
        }

        Some(SolvedLayout {
            slots,
            folders,
            objective,
        })
    }
}
