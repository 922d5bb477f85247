use crate::error::Result;

pub mod simplex;

pub use simplex::SimplexOracle;

/// Typed handle to a variable of an [`LpModel`].
///
/// Builders hold on to the handles they get from [`LpModel::add_var`] and use
/// them to read values out of an [`LpSolution`]; there is no lookup by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Var(pub(crate) usize);

impl Var {
    /// Position of this variable in the model's primal/ray vectors.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Objective direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// Relation of a linear constraint to its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

/// A single linear constraint over model variables.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    pub coeffs: Vec<(Var, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

/// A linear program: variables with bounds, a linear objective, and linear
/// constraints.
///
/// Each model is an independently owned value with no shared solver state;
/// dropping it releases everything it holds. Variables are created through
/// [`LpModel::add_var`], which fixes their bounds and objective coefficient
/// and returns the [`Var`] handle used everywhere else.
#[derive(Debug, Clone)]
pub struct LpModel {
    name: String,
    sense: Sense,
    objective: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

impl LpModel {
    pub fn new(name: impl Into<String>, sense: Sense) -> Self {
        Self {
            name: name.into(),
            sense,
            objective: Vec::new(),
            lower: Vec::new(),
            upper: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Adds a variable with bounds `[lower, upper]` (either side may be
    /// infinite) and the given objective coefficient.
    pub fn add_var(&mut self, lower: f64, upper: f64, objective: f64) -> Var {
        let var = Var(self.objective.len());
        self.lower.push(lower);
        self.upper.push(upper);
        self.objective.push(objective);
        var
    }

    /// Adds the constraint `sum coeffs * vars  <relation>  rhs`.
    pub fn add_constr(&mut self, coeffs: Vec<(Var, f64)>, relation: Relation, rhs: f64) {
        self.constraints.push(LinearConstraint {
            coeffs,
            relation,
            rhs,
        });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constrs(&self) -> usize {
        self.constraints.len()
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }
}

/// Outcome classification of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Pivot budget exhausted; treated as a numerical failure by callers.
    IterationLimit,
}

impl std::fmt::Display for LpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LpStatus::Optimal => write!(f, "optimal"),
            LpStatus::Infeasible => write!(f, "infeasible"),
            LpStatus::Unbounded => write!(f, "unbounded"),
            LpStatus::IterationLimit => write!(f, "iteration_limit"),
        }
    }
}

/// Result of solving an [`LpModel`].
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub status: LpStatus,
    /// Primal values per variable; empty unless `status` is `Optimal`.
    pub primal: Vec<f64>,
    /// Objective value; meaningful only when `status` is `Optimal`.
    pub objective: f64,
    /// Extreme ray certificate, present exactly when `status` is `Unbounded`:
    /// a direction that stays feasible and improves the objective forever.
    pub ray: Option<Vec<f64>>,
    /// Simplex pivots spent.
    pub iterations: usize,
}

/// The solver abstraction the decomposition is written against.
///
/// Implementations must report `Unbounded` together with an extreme ray; the
/// feasibility-cut machinery depends on that certificate.
pub trait LpOracle {
    fn solve(&self, model: &LpModel) -> Result<LpSolution>;
}
