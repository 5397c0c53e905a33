use good_lp::{constraint, variable, Constraint, ProblemVariables, Variable};

/// Adds a binary `p` with `p == a AND b` for binaries `a` and `b`.
///
/// The three constraints `p <= a`, `p <= b`, `p >= a + b - 1` pin `p` to
/// exactly 1 when both inputs are 1 and to 0 otherwise.
pub(super) fn conjunction(
    vars: &mut ProblemVariables,
    constraints: &mut Vec<Constraint>,
    a: Variable,
    b: Variable,
) -> Variable {
    let p = vars.add(variable().binary());
    constraints.extend(conjunction_constraints(p, a, b));
    p
}

pub(super) fn conjunction_constraints(p: Variable, a: Variable, b: Variable) -> [Constraint; 3] {
    [
        constraint!(p <= a),
        constraint!(p <= b),
        constraint!(p >= a + b - 1.0),
    ]
}

#[cfg(all(test, feature = "microlp"))]
mod tests {
    use super::*;
    use good_lp::{microlp, Solution, SolverModel};

    // Fixes `a` and `b`, then pushes `p` up or down and reads it back.
    fn solve_and(a_val: f64, b_val: f64, maximise: bool) -> f64 {
        let mut vars = ProblemVariables::new();
        let a = vars.add(variable().binary());
        let b = vars.add(variable().binary());
        let mut constraints = vec![constraint!(a == a_val), constraint!(b == b_val)];
        let p = conjunction(&mut vars, &mut constraints, a, b);

        let mut problem = if maximise {
            vars.maximise(p).using(microlp)
        } else {
            vars.minimise(p).using(microlp)
        };
        for c in constraints {
            problem.add_constraint(c);
        }
        problem.solve().unwrap().value(p)
    }

    #[test]
    fn test_conjunction_truth_table() {
        for (a, b) in [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)] {
            let expected = if a + b > 1.5 { 1.0 } else { 0.0 };
            for maximise in [true, false] {
                let p = solve_and(a, b, maximise);
                assert!(
                    (p - expected).abs() < 1e-6,
                    "a={} b={} maximise={} gave p={}",
                    a,
                    b,
                    maximise,
                    p
                );
            }
        }
    }
}
