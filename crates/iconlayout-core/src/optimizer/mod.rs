use crate::geometry::SlotGeometry;
use crate::types::*;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

mod extract;
mod linearize;
mod model;
mod solve;

pub use model::ModelStats;

/// Assigns items to home-screen slots by solving a binary integer program.
pub struct LayoutOptimizer {
    request: LayoutRequest,
    geometry: SlotGeometry,
    /// Distinct genres in order of first appearance; empty without folders
    folder_keys: Vec<String>,
}

impl LayoutOptimizer {
    /// Validates the request and builds a new optimizer instance.
    pub fn new(request: LayoutRequest) -> Result<Self> {
        if request.items.is_empty() {
            return Err(LayoutError::InvalidInput(
                "At least one item must be provided".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (i, item) in request.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(LayoutError::InvalidInput(format!(
                    "Item #{} has an empty name",
                    i + 1
                )));
            }
            if !seen.insert(item.name.as_str()) {
                return Err(LayoutError::InvalidInput(format!(
                    "Item #{} ('{}'): duplicate name",
                    i + 1,
                    item.name
                )));
            }
        }

        let grid = &request.geometry;
        let slot_count = match grid.checked_slot_count() {
            Some(0) => {
                return Err(LayoutError::InvalidInput(
                    "Grid geometry has no slots".to_string(),
                ))
            }
            Some(n) if n <= MAX_SLOTS => n,
            _ => {
                return Err(LayoutError::InvalidInput(format!(
                    "Grid geometry {}x{} + {} dock exceeds {} slots",
                    grid.rows, grid.cols, grid.dock_size, MAX_SLOTS
                )))
            }
        };

        for (&slot, &weight) in &request.weights {
            if slot == 0 || slot > slot_count {
                return Err(LayoutError::InvalidInput(format!(
                    "Weight given for slot {} outside 1..={}",
                    slot, slot_count
                )));
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(LayoutError::InvalidInput(format!(
                    "Slot {} has invalid weight {}",
                    slot, weight
                )));
            }
        }

        if !request.color_penalty.is_finite() || request.color_penalty < 0.0 {
            return Err(LayoutError::InvalidInput(format!(
                "Color penalty must be a non-negative number, got {}",
                request.color_penalty
            )));
        }

        let mut folder_keys: Vec<String> = Vec::new();
        if let Some(folders) = &request.folders {
            if !folders.penalty.is_finite() || folders.penalty < 0.0 {
                return Err(LayoutError::InvalidInput(format!(
                    "Folder penalty must be a non-negative number, got {}",
                    folders.penalty
                )));
            }
            if folders.capacity == 0 {
                return Err(LayoutError::InvalidInput(
                    "Folder capacity must be at least 1".to_string(),
                ));
            }
            for genre in request.items.iter().filter_map(|item| item.genre.as_ref()) {
                if !folder_keys.contains(genre) {
                    folder_keys.push(genre.clone());
                }
            }
        }

        let geometry = SlotGeometry::new(&request.geometry);

        Ok(Self {
            request,
            geometry,
            folder_keys,
        })
    }

    pub fn request(&self) -> &LayoutRequest {
        &self.request
    }

    pub fn geometry(&self) -> &SlotGeometry {
        &self.geometry
    }

    /// Genres that get a folder, in order of first appearance
    pub fn folder_keys(&self) -> &[String] {
        &self.folder_keys
    }

    /// Builds the model without solving it and reports its size.
    pub fn model_stats(&self) -> ModelStats {
        self.build_model().stats
    }

    /// Builds the model, solves it and extracts the layout.
    ///
    /// Infeasible or otherwise non-optimal outcomes are `Ok` with no layout;
    /// `Err` is reserved for solver backend failures.
    pub fn optimize(&self) -> Result<LayoutOutcome> {
        let started = Instant::now();
        let result = self.run();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(outcome) => info!(
                elapsed_ms,
                status = %outcome.status,
                objective = ?outcome.layout.as_ref().map(|l| l.objective),
                "Layout optimization finished"
            ),
            Err(err) => info!(elapsed_ms, error = %err, "Layout optimization failed"),
        }

        result
    }

    fn run(&self) -> Result<LayoutOutcome> {
        let model = self.build_model();
        debug!(
            items = self.request.items.len(),
            slots = self.geometry.slot_count(),
            folders = self.folder_keys.len(),
            variables = model.stats.variables(),
            constraints = model.stats.constraints,
            backend = %self.request.solver.backend,
            "Built layout model"
        );

        let run = self.solve(model)?;
        Ok(self.outcome(run))
    }

    /// Maps a backend run to the reported outcome; non-integral points are `Undefined`.
    fn outcome(&self, run: solve::SolveRun) -> LayoutOutcome {
        match run {
            solve::SolveRun::Solved {
                assignment,
                objective,
            } => match self.extract(&assignment, objective) {
                Some(layout) => LayoutOutcome::solved(layout),
                None => LayoutOutcome::unsolved(SolveStatus::Undefined),
            },
            solve::SolveRun::Unsolved(status) => LayoutOutcome::unsolved(status),
        }
    }
}

/// Validates `request` and solves it in one call.
pub fn solve_layout(request: LayoutRequest) -> Result<LayoutOutcome> {
    LayoutOptimizer::new(request)?.optimize()
}
