use std::ops::{Index, IndexMut};

/// Dense row-major matrix. Market matrices are indexed `[commodity_row, location_col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Clone> Matrix<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows * cols],
        }
    }
}

impl<T> Matrix<T> {
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                cells.push(f(r, c));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, r: usize) -> &[T] {
        &self.cells[r * self.cols..(r + 1) * self.cols]
    }

    pub fn column(&self, c: usize) -> impl Iterator<Item = &T> + '_ {
        (0..self.rows).map(move |r| &self[(r, c)])
    }

    /// `(row, col, value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        let cols = self.cols;
        self.cells.iter().enumerate().map(move |(i, v)| (i / cols, i % cols, v))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(|v| f(v)).collect(),
        }
    }
}

impl<T: Clone> Matrix<T> {
    /// Sub-matrix made of the given rows and columns, in the given order.
    pub fn select(&self, rows: &[usize], cols: &[usize]) -> Self {
        Matrix::from_fn(rows.len(), cols.len(), |r, c| self[(rows[r], cols[c])].clone())
    }
}

impl Matrix<f64> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    pub fn set_column(&mut self, c: usize, value: f64) {
        for r in 0..self.rows {
            self[(r, c)] = value;
        }
    }

    pub fn set_row(&mut self, r: usize, value: f64) {
        for c in 0..self.cols {
            self[(r, c)] = value;
        }
    }

    pub fn sum(&self) -> f64 {
        self.cells.iter().sum()
    }

    pub fn row_sum(&self, r: usize) -> f64 {
        self.row(r).iter().sum()
    }

    pub fn column_sum(&self, c: usize) -> f64 {
        self.column(c).sum()
    }

    /// Sum of the element-wise product, i.e. `sum(self ⊙ other)`.
    pub fn dot(&self, other: &Matrix<f64>) -> f64 {
        debug_assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        self.cells.iter().zip(other.cells.iter()).map(|(a, b)| a * b).sum()
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (r, c): (usize, usize)) -> &T {
        assert!(r < self.rows && c < self.cols, "index ({r}, {c}) out of bounds for {}x{} matrix", self.rows, self.cols);
        &self.cells[r * self.cols + c]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut T {
        assert!(r < self.rows && c < self.cols, "index ({r}, {c}) out of bounds for {}x{} matrix", self.rows, self.cols);
        &mut self.cells[r * self.cols + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_picks_rows_and_columns_in_order() {
        let m = Matrix::from_fn(3, 3, |r, c| (r * 10 + c) as f64);
        let picked = m.select(&[2, 0], &[1]);

        assert_eq!(picked.rows(), 2);
        assert_eq!(picked.cols(), 1);
        assert_eq!(picked[(0, 0)], 21.0);
        assert_eq!(picked[(1, 0)], 1.0);
    }

    #[test]
    fn sums_and_dot_product() {
        let m = Matrix::from_fn(2, 2, |r, c| (r + c) as f64);
        assert_eq!(m.sum(), 4.0);
        assert_eq!(m.row_sum(1), 3.0);
        assert_eq!(m.column_sum(0), 1.0);
        assert_eq!(m.dot(&Matrix::filled(2, 2, 2.0)), 8.0);
    }

    #[test]
    fn cells_iterate_row_major_with_coordinates() {
        let m = Matrix::from_fn(2, 3, |r, c| r * 3 + c);
        let coords: Vec<_> = m.cells().map(|(r, c, v)| (r, c, *v)).collect();
        assert_eq!(coords[4], (1, 1, 4));
    }
}
