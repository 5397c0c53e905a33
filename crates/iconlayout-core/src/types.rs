use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default number of members a folder can hold
pub const DEFAULT_FOLDER_CAPACITY: usize = 9;

/// Largest grid (main slots plus dock) accepted by the optimizer
pub const MAX_SLOTS: u32 = 4096;

/// An icon to be placed on the home screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Relative frequency of use
    pub usage: u32,
    /// Category label; items only join the folder of their own genre
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Icon color, used by the proximity penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Item {
    /// Creates an item, rejecting blank names.
    pub fn new(name: impl Into<String>, usage: u32) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LayoutError::InvalidInput(
                "Item name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            name,
            usage,
            genre: None,
            color: None,
        })
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Shape of the home screen: a row-major main grid plus a dock row below it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub rows: u32,
    pub cols: u32,
    #[serde(default)]
    pub dock_size: u32,
}

impl GridGeometry {
    pub fn new(rows: u32, cols: u32, dock_size: u32) -> Self {
        Self {
            rows,
            cols,
            dock_size,
        }
    }

    /// Number of slots in the main grid, saturating at `u32::MAX`
    pub fn main_slots(&self) -> u32 {
        self.rows.saturating_mul(self.cols)
    }

    /// Total number of slots, numbered `1..=slot_count()`, saturating at
    /// `u32::MAX`. Use [`checked_slot_count`](Self::checked_slot_count) on
    /// unvalidated input.
    pub fn slot_count(&self) -> u32 {
        self.main_slots().saturating_add(self.dock_size)
    }

    /// Total number of slots, or `None` when it does not fit in a `u32`
    pub fn checked_slot_count(&self) -> Option<u32> {
        self.rows.checked_mul(self.cols)?.checked_add(self.dock_size)
    }

    pub fn is_dock(&self, slot: u32) -> bool {
        slot > self.main_slots() && slot <= self.slot_count()
    }
}

impl Default for GridGeometry {
    /// 6x4 main screen with a 4-slot dock (28 slots)
    fn default() -> Self {
        Self::new(6, 4, 4)
    }
}

/// How strictly every item must be placed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Every item goes to exactly one slot or folder; too many items is infeasible
    #[default]
    ExactlyOne,
    /// Items may be left out when the grid runs short
    AtMostOne,
}

/// Enables the folder variant of the model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FolderOptions {
    /// Subtracted from a slot's weight for items reached through a folder
    #[serde(default)]
    pub penalty: f64,
    #[serde(default = "default_folder_capacity")]
    pub capacity: usize,
}

fn default_folder_capacity() -> usize {
    DEFAULT_FOLDER_CAPACITY
}

impl FolderOptions {
    pub fn new(penalty: f64) -> Self {
        Self {
            penalty,
            capacity: DEFAULT_FOLDER_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// MIP backend used to solve the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// Pure Rust branch-and-bound (`microlp` feature)
    #[default]
    Microlp,
    /// COIN-OR CBC (`coin_cbc` feature)
    CoinCbc,
    /// HiGHS (`highs` feature)
    Highs,
}

impl SolverBackend {
    pub fn name(&self) -> &'static str {
        match self {
            SolverBackend::Microlp => "microlp",
            SolverBackend::CoinCbc => "coin_cbc",
            SolverBackend::Highs => "highs",
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SolverBackend {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "microlp" => Ok(SolverBackend::Microlp),
            "coin_cbc" | "cbc" => Ok(SolverBackend::CoinCbc),
            "highs" => Ok(SolverBackend::Highs),
            other => Err(LayoutError::InvalidInput(format!(
                "Unknown solver backend '{}', expected microlp, coin_cbc or highs",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOptions {
    #[serde(default)]
    pub backend: SolverBackend,
    /// Let the backend print its own log
    #[serde(default)]
    pub verbose: bool,
    /// Worker threads for backends that support it (CBC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
}

/// Input: What the caller provides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub items: Vec<Item>,
    /// Sparse slot weights; slots without an entry weigh 1.0
    #[serde(default)]
    pub weights: BTreeMap<u32, f64>,
    #[serde(default)]
    pub geometry: GridGeometry,
    #[serde(default)]
    pub placement: PlacementMode,
    /// Folder variant when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folders: Option<FolderOptions>,
    /// Repulsion between same-colored items; zero disables the color terms
    #[serde(default)]
    pub color_penalty: f64,
    #[serde(default)]
    pub solver: SolverOptions,
}

impl LayoutRequest {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            weights: BTreeMap::new(),
            geometry: GridGeometry::default(),
            placement: PlacementMode::default(),
            folders: None,
            color_penalty: 0.0,
            solver: SolverOptions::default(),
        }
    }

    pub fn with_weights(mut self, weights: impl IntoIterator<Item = (u32, f64)>) -> Self {
        self.weights = weights.into_iter().collect();
        self
    }

    pub fn with_geometry(mut self, geometry: GridGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_placement(mut self, placement: PlacementMode) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_folders(mut self, folders: FolderOptions) -> Self {
        self.folders = Some(folders);
        self
    }

    pub fn with_color_penalty(mut self, penalty: f64) -> Self {
        self.color_penalty = penalty;
        self
    }

    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self
    }

    /// Weight of a slot, defaulting to 1.0
    pub fn weight(&self, slot: u32) -> f64 {
        self.weights.get(&slot).copied().unwrap_or(1.0)
    }
}

/// What a single slot holds after optimization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Occupant {
    Item(String),
    /// Folder marker, keyed by genre
    Folder(String),
    Empty,
}

impl Occupant {
    pub fn is_empty(&self) -> bool {
        matches!(self, Occupant::Empty)
    }
}

/// Solver-reported outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The backend returned an assignment that is not integral
    Undefined,
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "Optimal",
            SolveStatus::Infeasible => "Infeasible",
            SolveStatus::Unbounded => "Unbounded",
            SolveStatus::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optimal arrangement of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedLayout {
    /// Every slot in `1..=N`, empty slots included
    pub slots: BTreeMap<u32, Occupant>,
    /// Members of each folder, keyed by genre. Empty outside the folder variant
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub folders: BTreeMap<String, Vec<String>>,
    pub objective: f64,
}

impl SolvedLayout {
    /// Slot holding the item directly, if any
    pub fn slot_of(&self, name: &str) -> Option<u32> {
        self.slots.iter().find_map(|(slot, occupant)| match occupant {
            Occupant::Item(item) if item == name => Some(*slot),
            _ => None,
        })
    }

    /// Slot occupied by the folder for `genre`, if it was opened
    pub fn folder_slot(&self, genre: &str) -> Option<u32> {
        self.slots.iter().find_map(|(slot, occupant)| match occupant {
            Occupant::Folder(key) if key == genre => Some(*slot),
            _ => None,
        })
    }

    /// Genre of the folder containing the item, if any
    pub fn folder_of(&self, name: &str) -> Option<&str> {
        self.folders
            .iter()
            .find(|(_, members)| members.iter().any(|m| m == name))
            .map(|(genre, _)| genre.as_str())
    }
}

/// Output: What the optimizer returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOutcome {
    pub status: SolveStatus,
    /// Present only when `status` is optimal
    pub layout: Option<SolvedLayout>,
}

impl LayoutOutcome {
    pub fn solved(layout: SolvedLayout) -> Self {
        Self {
            status: SolveStatus::Optimal,
            layout: Some(layout),
        }
    }

    pub fn unsolved(status: SolveStatus) -> Self {
        Self {
            status,
            layout: None,
        }
    }
}

/// Error type for optimization
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Solver backend '{0}' is not available in this build")]
    SolverUnavailable(SolverBackend),

    #[error("Solver failure: {0}")]
    Solver(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
