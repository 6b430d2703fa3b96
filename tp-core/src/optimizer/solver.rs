use crate::matrix::Matrix;
use good_lp::{Expression, ResolutionError, Solution, Variable};

/// Solution values below this are solver noise and are snapped to zero.
pub const EPSILON: f64 = 0.001;

/// Loose big-M multiplier on cargo capacity linking trade volume to visit and edge variables.
pub(crate) const BIG_M_FACTOR: f64 = 10.0;

/// Result of handing a formulation to the MILP backend.
/// Infeasibility is an expected outcome and not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome<T> {
    Optimal { objective: f64, value: T },
    NoSolution { reason: String },
}

impl<T> SolveOutcome<T> {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveOutcome::Optimal { .. })
    }

    pub fn objective(&self) -> Option<f64> {
        match self {
            SolveOutcome::Optimal { objective, .. } => Some(*objective),
            SolveOutcome::NoSolution { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            SolveOutcome::Optimal { value, .. } => Some(value),
            SolveOutcome::NoSolution { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SolveOutcome<U> {
        match self {
            SolveOutcome::Optimal { objective, value } => SolveOutcome::Optimal { objective, value: f(value) },
            SolveOutcome::NoSolution { reason } => SolveOutcome::NoSolution { reason },
        }
    }
}

impl<T> From<ResolutionError> for SolveOutcome<T> {
    fn from(err: ResolutionError) -> Self {
        SolveOutcome::NoSolution { reason: err.to_string() }
    }
}

pub fn snap(value: f64) -> f64 {
    if value < EPSILON {
        0.0
    } else {
        value
    }
}

pub(crate) fn values(solution: &impl Solution, variables: &Matrix<Variable>) -> Matrix<f64> {
    variables.map(|v| solution.value(*v))
}

pub(crate) fn snap_all(values: &Matrix<f64>) -> Matrix<f64> {
    values.map(|v| snap(*v))
}

/// Solved values of a boolean variable matrix.
pub(crate) fn boolean_values(solution: &impl Solution, variables: &Matrix<Variable>) -> Matrix<bool> {
    variables.map(|v| solution.value(*v) > 0.5)
}

pub(crate) fn linear(terms: impl IntoIterator<Item = (f64, Variable)>) -> Expression {
    let mut expression = Expression::default();
    for (coefficient, variable) in terms {
        expression.add_mul(coefficient, variable);
    }
    expression
}

pub(crate) fn sum(variables: impl IntoIterator<Item = Variable>) -> Expression {
    linear(variables.into_iter().map(|v| (1.0, v)))
}
