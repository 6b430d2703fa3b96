use crate::matrix::Matrix;
use crate::symbol_index::SymbolIndex;
use itertools::{EitherOrBoth, Itertools};
use tp_domain::LocationPath;

/// Placeholder travel cost between every pair of locations.
///
/// The cost of a pair is the depth of the deepest path minus the number of leading segments both
/// paths share, so siblings deep in the hierarchy are cheap and locations that only agree at the root
/// are close to the maximum. A shorter path is padded with empty segments, which never match.
/// This is not a metric; it does not satisfy the triangle inequality.
pub fn compute_travel_cost(paths: &[LocationPath], index: &SymbolIndex<LocationPath>) -> Matrix<f64> {
    let max_level = paths.iter().map(LocationPath::depth).max().unwrap_or(0);
    let mut result = Matrix::zeros(index.len(), index.len());

    for (a, b) in paths.iter().cartesian_product(paths.iter()) {
        let (Some(ix_a), Some(ix_b)) = (index.position(a), index.position(b)) else {
            continue;
        };
        result[(ix_a, ix_b)] = pair_cost(a, b, max_level) as f64;
    }
    result
}

fn pair_cost(a: &LocationPath, b: &LocationPath, max_level: usize) -> usize {
    let mut level = max_level;
    for segments in a.segments().zip_longest(b.segments()) {
        match segments {
            EitherOrBoth::Both(x, y) if x == y => level = level.saturating_sub(1),
            _ => return level,
        }
    }
    0
}

/// Cost matrix restricted to `sub_index`, remapped from positions in `full_index`.
pub fn cherry_pick_travel_cost(
    full_cost: &Matrix<f64>,
    full_index: &SymbolIndex<LocationPath>,
    sub_index: &SymbolIndex<LocationPath>,
) -> Matrix<f64> {
    let mut result = Matrix::zeros(sub_index.len(), sub_index.len());
    for (ip, a) in sub_index.symbols().iter().enumerate() {
        for (jp, b) in sub_index.symbols().iter().enumerate() {
            if let (Some(i), Some(j)) = (full_index.position(a), full_index.position(b)) {
                result[(ip, jp)] = full_cost[(i, j)];
            }
        }
    }
    result
}
