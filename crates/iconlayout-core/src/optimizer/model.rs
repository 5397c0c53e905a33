use super::linearize::conjunction;
use super::*;
use good_lp::{constraint, variable, Constraint, Expression, ProblemVariables, Variable};
use serde::Serialize;

/// Size of the binary program built for one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelStats {
    /// `place[item, slot]`
    pub placement_vars: usize,
    /// `folderAtSlot[folder, slot]`
    pub folder_slot_vars: usize,
    /// `itemInFolder[item, folder]`
    pub membership_vars: usize,
    /// `itemInFolder AND folderAtSlot`, priced in the objective
    pub folder_link_vars: usize,
    /// `place AND place` for same-colored items at two slots
    pub color_pair_vars: usize,
    pub constraints: usize,
}

impl ModelStats {
    pub fn variables(&self) -> usize {
        self.placement_vars
            + self.folder_slot_vars
            + self.membership_vars
            + self.folder_link_vars
            + self.color_pair_vars
    }
}

/// Variables the extractor reads back. Slots are 0-based here.
pub(super) struct VariableIndex {
    /// `place[item][slot]`
    pub place: Vec<Vec<Variable>>,
    /// `folder_at[folder][slot]`
    pub folder_at: Vec<Vec<Variable>>,
    /// `in_folder[item][folder]`
    pub in_folder: Vec<Vec<Variable>>,
}

pub(super) struct LayoutModel {
    pub vars: ProblemVariables,
    pub objective: Expression,
    pub constraints: Vec<Constraint>,
    pub index: VariableIndex,
    pub stats: ModelStats,
}

impl LayoutOptimizer {
    /// Builds variables, objective and constraints for the request.
    pub(super) fn build_model(&self) -> LayoutModel {
        let items = &self.request.items;
        let slot_count = self.geometry.slot_count() as usize;
        let folder_count = self.folder_keys.len();

        let mut vars = ProblemVariables::new();
        let mut constraints: Vec<Constraint> = Vec::new();
        let mut objective = Expression::from(0.0);

        let place = binary_grid(&mut vars, items.len(), slot_count);
        let folder_at = binary_grid(&mut vars, folder_count, slot_count);
        let in_folder = binary_grid(&mut vars, items.len(), folder_count);

        let mut stats = ModelStats {
            placement_vars: items.len() * slot_count,
            folder_slot_vars: folder_count * slot_count,
            membership_vars: items.len() * folder_count,
            ..ModelStats::default()
        };

        // Direct placement value
        for (j, item) in items.iter().enumerate() {
            let usage = item.usage as f64;
            for (s, &x) in place[j].iter().enumerate() {
                objective += self.request.weight(s as u32 + 1) * usage * x;
            }
        }

        // Folder placement value, priced only at the slot the folder lands on
        if let Some(options) = self.request.folders {
            for (j, item) in items.iter().enumerate() {
                let usage = item.usage as f64;
                for (f, genre) in self.folder_keys.iter().enumerate() {
                    if item.genre.as_deref() != Some(genre.as_str()) {
                        let z = in_folder[j][f];
                        constraints.push(constraint!(z == 0.0));
                        continue;
                    }
                    for (s, &y) in folder_at[f].iter().enumerate() {
                        let q = conjunction(&mut vars, &mut constraints, in_folder[j][f], y);
                        let value = self.request.weight(s as u32 + 1) - options.penalty;
                        objective += value * usage * q;
                        stats.folder_link_vars += 1;
                    }
                }
            }
        }

        // Same-colored items repel; the penalty decays with distance
        if self.request.color_penalty > 0.0 {
            let pairs = same_color_pairs(items);
            if !pairs.is_empty() {
                for (a, b, distance) in self.geometry.pairs() {
                    let weight = -self.request.color_penalty / distance;
                    let (sa, sb) = (a as usize - 1, b as usize - 1);
                    for &(i, j) in &pairs {
                        let p = conjunction(&mut vars, &mut constraints, place[i][sa], place[j][sb]);
                        objective += weight * p;
                        stats.color_pair_vars += 1;
                    }
                }
            }
        }

        // Each item lands in one slot or one folder
        for j in 0..items.len() {
            let direct: Expression = place[j].iter().copied().sum();
            let foldered: Expression = in_folder[j].iter().copied().sum();
            let assigned = direct + foldered;
            constraints.push(match self.request.placement {
                PlacementMode::ExactlyOne => constraint!(assigned == 1.0),
                PlacementMode::AtMostOne => constraint!(assigned <= 1.0),
            });
        }

        // One occupant per slot
        for s in 0..slot_count {
            let occupants: Expression = place
                .iter()
                .chain(folder_at.iter())
                .map(|row| row[s])
                .sum();
            constraints.push(constraint!(occupants <= 1.0));
        }

        if let Some(options) = self.request.folders {
            let big_m = items.len() as f64;
            let capacity = options.capacity as f64;
            for f in 0..folder_count {
                let members: Expression = in_folder.iter().map(|row| row[f]).sum();
                let opened: Expression = folder_at[f].iter().copied().sum();
                constraints.push(constraint!(members.clone() <= opened.clone() * big_m));
                constraints.push(constraint!(members.clone() <= capacity));
                constraints.push(constraint!(opened.clone() <= 1.0));
                // No slot for a folder without members
                constraints.push(constraint!(opened <= members));
            }
        }

        stats.constraints = constraints.len();

        LayoutModel {
            vars,
            objective,
            constraints,
            index: VariableIndex {
                place,
                folder_at,
                in_folder,
            },
            stats,
        }
    }
}

fn binary_grid(vars: &mut ProblemVariables, rows: usize, cols: usize) -> Vec<Vec<Variable>> {
    let mut grid = Vec::with_capacity(rows);
    for _ in 0..rows {
        let mut row = Vec::with_capacity(cols);
        for _ in 0..cols {
            row.push(vars.add(variable().binary()));
        }
        grid.push(row);
    }
    grid
}

/// Ordered pairs `(i, j)`, `i != j`, of items sharing a color.
///
/// Combined with slot pairs `a < b` this names every unordered co-location
/// exactly once: `(i at a, j at b)` and `(j at a, i at b)` are different
/// placements.
fn same_color_pairs(items: &[Item]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, first) in items.iter().enumerate() {
        let Some(color) = first.color.as_deref() else {
            continue;
        };
        for (j, second) in items.iter().enumerate() {
            if i != j && second.color.as_deref() == Some(color) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}
