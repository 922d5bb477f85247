use crate::error::Result;
use crate::lp::{LpModel, LpOracle, LpSolution, LpStatus, Relation, Sense};

const EPSILON: f64 = 1e-9;
const FEASIBILITY_TOL: f64 = 1e-7;

/// Dense two-phase primal simplex.
///
/// Bland's rule is used in both phases, so solves are deterministic and free
/// of cycling; the pivot budget is a guard against numerical stalls only.
/// General models are reduced to standard form internally: finite lower
/// bounds are shifted out, variables with only an upper bound are negated,
/// free variables are split, and upper bounds become explicit rows.
#[derive(Debug, Clone)]
pub struct SimplexOracle {
    pub max_iterations: usize,
}

impl Default for SimplexOracle {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
        }
    }
}

impl SimplexOracle {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl LpOracle for SimplexOracle {
    fn solve(&self, model: &LpModel) -> Result<LpSolution> {
        let standard = StandardForm::build(model);
        let mut tableau = Tableau::new(&standard);
        let mut iterations = 0;

        // Phase 1: minimize the sum of artificial variables.
        let art_cost: Vec<f64> = (0..tableau.width())
            .map(|j| if j >= standard.num_cols { 1.0 } else { 0.0 })
            .collect();
        match tableau.run(&art_cost, self.max_iterations, &mut iterations) {
            Phase::Optimal => {}
            // The phase-1 objective is bounded below by zero, so anything
            // other than optimal is a numerical failure.
            Phase::Unbounded { .. } | Phase::IterationLimit => {
                return Ok(failure(LpStatus::IterationLimit, iterations));
            }
        }
        // Residual artificial mass scales with the row magnitudes, so the
        // feasibility threshold must too.
        let scale = standard
            .rhs
            .iter()
            .fold(1.0f64, |acc, &v| acc.max(v.abs()));
        if tableau.objective_value(&art_cost) > FEASIBILITY_TOL * scale {
            return Ok(failure(LpStatus::Infeasible, iterations));
        }
        tableau.drop_artificials(standard.num_cols);

        // Phase 2: the real objective over structural and slack columns.
        match tableau.run(&standard.cost, self.max_iterations, &mut iterations) {
            Phase::Optimal => {
                let primal = standard.recover_point(&tableau.point());
                let objective = model
                    .objective()
                    .iter()
                    .zip(primal.iter())
                    .map(|(c, x)| c * x)
                    .sum();
                Ok(LpSolution {
                    status: LpStatus::Optimal,
                    primal,
                    objective,
                    ray: None,
                    iterations,
                })
            }
            Phase::Unbounded { entering } => {
                let ray = standard.recover_direction(&tableau.direction(entering));
                Ok(LpSolution {
                    status: LpStatus::Unbounded,
                    primal: Vec::new(),
                    objective: 0.0,
                    ray: Some(ray),
                    iterations,
                })
            }
            Phase::IterationLimit => Ok(failure(LpStatus::IterationLimit, iterations)),
        }
    }
}

fn failure(status: LpStatus, iterations: usize) -> LpSolution {
    LpSolution {
        status,
        primal: Vec::new(),
        objective: 0.0,
        ray: None,
        iterations,
    }
}

/// How an original variable maps onto nonnegative standard-form columns.
#[derive(Debug, Clone, Copy)]
enum ColMap {
    /// v = lower + column
    Shifted { col: usize, lower: f64 },
    /// v = upper - column (no finite lower bound)
    Negated { col: usize, upper: f64 },
    /// v = pos - neg (free)
    Split { pos: usize, neg: usize },
}

/// `min cost * w  s.t.  rows * w = rhs, w >= 0, rhs >= 0`, plus the mapping
/// back to the original variable space.
struct StandardForm {
    /// Objective over structural and slack columns, minimization sense.
    cost: Vec<f64>,
    rows: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    map: Vec<ColMap>,
    num_cols: usize,
}

impl StandardForm {
    fn build(model: &LpModel) -> Self {
        let mut map = Vec::with_capacity(model.num_vars());
        let mut structural = 0;
        for v in 0..model.num_vars() {
            let (lower, upper) = (model.lower()[v], model.upper()[v]);
            if lower.is_finite() {
                map.push(ColMap::Shifted {
                    col: structural,
                    lower,
                });
                structural += 1;
            } else if upper.is_finite() {
                map.push(ColMap::Negated {
                    col: structural,
                    upper,
                });
                structural += 1;
            } else {
                map.push(ColMap::Split {
                    pos: structural,
                    neg: structural + 1,
                });
                structural += 2;
            }
        }

        // Substitute the mapping into every constraint, then append a bound
        // row for each variable with both bounds finite.
        let mut raw: Vec<(Vec<f64>, Relation, f64)> = Vec::new();
        for constr in model.constraints() {
            let mut coeffs = vec![0.0; structural];
            let mut rhs = constr.rhs;
            for &(var, a) in &constr.coeffs {
                match map[var.0] {
                    ColMap::Shifted { col, lower } => {
                        coeffs[col] += a;
                        rhs -= a * lower;
                    }
                    ColMap::Negated { col, upper } => {
                        coeffs[col] -= a;
                        rhs -= a * upper;
                    }
                    ColMap::Split { pos, neg } => {
                        coeffs[pos] += a;
                        coeffs[neg] -= a;
                    }
                }
            }
            raw.push((coeffs, constr.relation, rhs));
        }
        for v in 0..model.num_vars() {
            if let ColMap::Shifted { col, lower } = map[v] {
                let upper = model.upper()[v];
                if upper.is_finite() {
                    let mut coeffs = vec![0.0; structural];
                    coeffs[col] = 1.0;
                    raw.push((coeffs, Relation::LessEq, upper - lower));
                }
            }
        }

        let num_slack = raw
            .iter()
            .filter(|(_, rel, _)| *rel != Relation::Equal)
            .count();
        let num_cols = structural + num_slack;

        let sign = match model.sense() {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        };
        let mut cost = vec![0.0; num_cols];
        for v in 0..model.num_vars() {
            let c = model.objective()[v] * sign;
            match map[v] {
                ColMap::Shifted { col, .. } => cost[col] += c,
                ColMap::Negated { col, .. } => cost[col] -= c,
                ColMap::Split { pos, neg } => {
                    cost[pos] += c;
                    cost[neg] -= c;
                }
            }
        }

        let mut rows = Vec::with_capacity(raw.len());
        let mut rhs_all = Vec::with_capacity(raw.len());
        let mut next_slack = structural;
        for (coeffs, relation, rhs) in raw {
            let mut row = vec![0.0; num_cols];
            row[..structural].copy_from_slice(&coeffs);
            match relation {
                Relation::LessEq => {
                    row[next_slack] = 1.0;
                    next_slack += 1;
                }
                Relation::GreaterEq => {
                    row[next_slack] = -1.0;
                    next_slack += 1;
                }
                Relation::Equal => {}
            }
            let mut rhs = rhs;
            if rhs < 0.0 {
                for a in row.iter_mut() {
                    *a = -*a;
                }
                rhs = -rhs;
            }
            rows.push(row);
            rhs_all.push(rhs);
        }

        Self {
            cost,
            rows,
            rhs: rhs_all,
            map,
            num_cols,
        }
    }

    /// Maps a standard-form point back to the original variables.
    fn recover_point(&self, w: &[f64]) -> Vec<f64> {
        self.map
            .iter()
            .map(|cm| match *cm {
                ColMap::Shifted { col, lower } => lower + w[col],
                ColMap::Negated { col, upper } => upper - w[col],
                ColMap::Split { pos, neg } => w[pos] - w[neg],
            })
            .collect()
    }

    /// Maps a standard-form direction back; bound shifts drop out.
    fn recover_direction(&self, d: &[f64]) -> Vec<f64> {
        self.map
            .iter()
            .map(|cm| match *cm {
                ColMap::Shifted { col, .. } => d[col],
                ColMap::Negated { col, .. } => -d[col],
                ColMap::Split { pos, neg } => d[pos] - d[neg],
            })
            .collect()
    }
}

enum Phase {
    Optimal,
    Unbounded { entering: usize },
    IterationLimit,
}

/// Simplex tableau with the artificial basis appended after the structural
/// and slack columns.
struct Tableau {
    rows: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    basis: Vec<usize>,
    width: usize,
}

impl Tableau {
    fn new(standard: &StandardForm) -> Self {
        let m = standard.rows.len();
        let width = standard.num_cols + m;
        let mut rows = Vec::with_capacity(m);
        let mut basis = Vec::with_capacity(m);
        for (i, row) in standard.rows.iter().enumerate() {
            let mut full = vec![0.0; width];
            full[..standard.num_cols].copy_from_slice(row);
            full[standard.num_cols + i] = 1.0;
            rows.push(full);
            basis.push(standard.num_cols + i);
        }
        Self {
            rows,
            rhs: standard.rhs.clone(),
            basis,
            width,
        }
    }

    fn width(&self) -> usize {
        self.width
    }

    fn objective_value(&self, cost: &[f64]) -> f64 {
        self.basis
            .iter()
            .zip(self.rhs.iter())
            .map(|(&b, &v)| cost[b] * v)
            .sum()
    }

    /// Primal simplex with Bland's rule: the entering column is the lowest
    /// index with negative reduced cost, the leaving row breaks ratio ties by
    /// lowest basis index.
    fn run(&mut self, cost: &[f64], max_iterations: usize, iterations: &mut usize) -> Phase {
        let width = cost.len();
        loop {
            let mut in_basis = vec![false; width];
            for &b in &self.basis {
                in_basis[b] = true;
            }

            let mut entering = None;
            for j in 0..width {
                if in_basis[j] {
                    continue;
                }
                let mut reduced = cost[j];
                for (i, row) in self.rows.iter().enumerate() {
                    reduced -= cost[self.basis[i]] * row[j];
                }
                if reduced < -EPSILON {
                    entering = Some(j);
                    break;
                }
            }
            let Some(entering) = entering else {
                return Phase::Optimal;
            };

            let mut leaving: Option<usize> = None;
            let mut best = f64::INFINITY;
            for (i, row) in self.rows.iter().enumerate() {
                let a = row[entering];
                if a <= EPSILON {
                    continue;
                }
                let ratio = self.rhs[i] / a;
                match leaving {
                    None => {
                        leaving = Some(i);
                        best = ratio;
                    }
                    Some(l) => {
                        if ratio < best - EPSILON {
                            leaving = Some(i);
                            best = ratio;
                        } else if (ratio - best).abs() <= EPSILON && self.basis[i] < self.basis[l] {
                            leaving = Some(i);
                            best = best.min(ratio);
                        }
                    }
                }
            }
            let Some(leaving) = leaving else {
                return Phase::Unbounded { entering };
            };

            self.pivot(leaving, entering);
            *iterations += 1;
            if *iterations >= max_iterations {
                return Phase::IterationLimit;
            }
        }
    }

    fn pivot(&mut self, leaving: usize, entering: usize) {
        let pivot = self.rows[leaving][entering];
        for a in self.rows[leaving].iter_mut() {
            *a /= pivot;
        }
        self.rhs[leaving] /= pivot;
        let pivot_row = self.rows[leaving].clone();
        let pivot_rhs = self.rhs[leaving];
        for i in 0..self.rows.len() {
            if i == leaving {
                continue;
            }
            let factor = self.rows[i][entering];
            if factor.abs() <= EPSILON {
                continue;
            }
            for (a, p) in self.rows[i].iter_mut().zip(pivot_row.iter()) {
                *a -= factor * p;
            }
            self.rhs[i] -= factor * pivot_rhs;
        }
        self.basis[leaving] = entering;
    }

    /// After a feasible phase 1: pivot basic artificials out onto structural
    /// columns, drop linearly dependent rows, truncate artificial columns.
    fn drop_artificials(&mut self, num_cols: usize) {
        let mut i = 0;
        while i < self.rows.len() {
            if self.basis[i] < num_cols {
                i += 1;
                continue;
            }
            let pivot_col = (0..num_cols).find(|&j| self.rows[i][j].abs() > EPSILON);
            match pivot_col {
                Some(j) => {
                    self.pivot(i, j);
                    i += 1;
                }
                None => {
                    self.rows.remove(i);
                    self.rhs.remove(i);
                    self.basis.remove(i);
                }
            }
        }
        for row in &mut self.rows {
            row.truncate(num_cols);
        }
        self.width = num_cols;
    }

    /// Standard-form point of the current basis.
    fn point(&self) -> Vec<f64> {
        let mut w = vec![0.0; self.width()];
        for (i, &b) in self.basis.iter().enumerate() {
            w[b] = self.rhs[i];
        }
        w
    }

    /// Recession direction proving unboundedness along `entering`.
    fn direction(&self, entering: usize) -> Vec<f64> {
        let mut d = vec![0.0; self.width()];
        d[entering] = 1.0;
        for (i, &b) in self.basis.iter().enumerate() {
            d[b] = -self.rows[i][entering];
        }
        d
    }
}
