use super::extract::Assignment;
use super::model::LayoutModel;
use super::*;
#[cfg(any(feature = "microlp", feature = "coin_cbc", feature = "highs"))]
use {
    super::model::VariableIndex,
    good_lp::{Constraint, Expression, ResolutionError, Solution, SolverModel},
};

pub(super) enum SolveRun {
    Solved {
        assignment: Assignment,
        objective: f64,
    },
    Unsolved(SolveStatus),
}

impl LayoutOptimizer {
    /// Hands the model to the configured backend.
    pub(super) fn solve(&self, model: LayoutModel) -> Result<SolveRun> {
        let options = &self.request.solver;
        match options.backend {
            SolverBackend::Microlp => solve_microlp(model, options),
            SolverBackend::CoinCbc => solve_coin_cbc(model, options),
            SolverBackend::Highs => solve_highs(model, options),
        }
    }
}

#[cfg(feature = "microlp")]
fn solve_microlp(model: LayoutModel, _options: &SolverOptions) -> Result<SolveRun> {
    let LayoutModel {
        vars,
        objective,
        constraints,
        index,
        ..
    } = model;
    let problem = vars.maximise(objective.clone()).using(good_lp::microlp);
    run(problem, constraints, &objective, &index)
}

#[cfg(not(feature = "microlp"))]
fn solve_microlp(_model: LayoutModel, _options: &SolverOptions) -> Result<SolveRun> {
    Err(LayoutError::SolverUnavailable(SolverBackend::Microlp))
}

#[cfg(feature = "coin_cbc")]
fn solve_coin_cbc(model: LayoutModel, options: &SolverOptions) -> Result<SolveRun> {
    let LayoutModel {
        vars,
        objective,
        constraints,
        index,
        ..
    } = model;
    let mut problem = vars.maximise(objective.clone()).using(good_lp::coin_cbc);
    if !options.verbose {
        problem.set_parameter("logLevel", "0");
    }
    if let Some(threads) = options.threads {
        problem.set_parameter("threads", &threads.to_string());
    }
    run(problem, constraints, &objective, &index)
}

#[cfg(not(feature = "coin_cbc"))]
fn solve_coin_cbc(_model: LayoutModel, _options: &SolverOptions) -> Result<SolveRun> {
    Err(LayoutError::SolverUnavailable(SolverBackend::CoinCbc))
}

#[cfg(feature = "highs")]
fn solve_highs(model: LayoutModel, options: &SolverOptions) -> Result<SolveRun> {
    let LayoutModel {
        vars,
        objective,
        constraints,
        index,
        ..
    } = model;
    let problem = vars
        .maximise(objective.clone())
        .using(good_lp::highs)
        .set_verbose(options.verbose);
    run(problem, constraints, &objective, &index)
}

#[cfg(not(feature = "highs"))]
fn solve_highs(_model: LayoutModel, _options: &SolverOptions) -> Result<SolveRun> {
    Err(LayoutError::SolverUnavailable(SolverBackend::Highs))
}

/// Adds the constraints, solves, and maps the backend outcome to a status.
///
/// Infeasible and unbounded models are ordinary outcomes. Any other backend
/// error is a solver failure and is returned as `Err`.
#[cfg(any(feature = "microlp", feature = "coin_cbc", feature = "highs"))]
fn run<P>(
    mut problem: P,
    constraints: Vec<Constraint>,
    objective: &Expression,
    index: &VariableIndex,
) -> Result<SolveRun>
where
    P: SolverModel<Error = ResolutionError>,
{
    for c in constraints {
        problem.add_constraint(c);
    }

    match problem.solve() {
        Ok(solution) => Ok(SolveRun::Solved {
            assignment: index.read_back(|v| solution.value(v)),
            objective: solution.eval(objective),
        }),
        Err(ResolutionError::Infeasible) => Ok(SolveRun::Unsolved(SolveStatus::Infeasible)),
        Err(ResolutionError::Unbounded) => Ok(SolveRun::Unsolved(SolveStatus::Unbounded)),
        Err(err) => Err(LayoutError::Solver(err.to_string())),
    }
}
