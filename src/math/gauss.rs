//! Dense linear system solver.
//!
//! Solves `A x = b` for a small square `A` by Gaussian elimination with
//! partial pivoting on the augmented matrix `[A | b]`:
//!
//! 1. for each column `k`, swap in the row (from `k` down) with the largest
//!    `|a_ik|`
//! 2. if that pivot is below `PIVOT_EPS`, the system is singular (or too
//!    ill-conditioned to trust) and we stop
//! 3. eliminate column `k` from every row below
//! 4. back-substitute from the last row up
//!
//! There is no iterative refinement. The quadratic fitter only ever solves
//! 3×3 normal equations, but nothing here assumes a size.

use nalgebra::{DMatrix, DVector};

use crate::error::FitError;

/// Pivots with an absolute value below this are treated as zero.
pub const PIVOT_EPS: f64 = 1e-10;

/// Solve `a * x = b`.
pub fn solve_linear_system(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, FitError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(FitError::validation(format!(
            "coefficient matrix must be square (got {}x{})",
            n,
            a.ncols()
        )));
    }
    if b.len() != n {
        return Err(FitError::validation(format!(
            "right-hand side has length {} but the matrix is {n}x{n}",
            b.len()
        )));
    }

    let mut aug = DMatrix::<f64>::zeros(n, n + 1);
    aug.view_mut((0, 0), (n, n)).copy_from(a);
    aug.set_column(n, b);

    for k in 0..n {
        let mut pivot_row = k;
        let mut pivot_abs = aug[(k, k)].abs();
        for i in (k + 1)..n {
            let v = aug[(i, k)].abs();
            if v > pivot_abs {
                pivot_abs = v;
                pivot_row = i;
            }
        }
        if pivot_row != k {
            aug.swap_rows(k, pivot_row);
        }

        // NaN pivots fail here too.
        if !(aug[(k, k)].abs() >= PIVOT_EPS) {
            return Err(FitError::SingularSystem {
                column: k,
                pivot: aug[(k, k)],
            });
        }

        for i in (k + 1)..n {
            let factor = aug[(i, k)] / aug[(k, k)];
            if factor == 0.0 {
                continue;
            }
            for j in k..=n {
                let delta = factor * aug[(k, j)];
                aug[(i, j)] -= delta;
            }
        }
    }

    let mut x = DVector::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut acc = aug[(i, n)];
        for j in (i + 1)..n {
            acc -= aug[(i, j)] * x[j];
        }
        x[i] = acc / aug[(i, i)];
    }

    Ok(x)
}

/// Row-major convenience wrapper around [`solve_linear_system`].
pub fn solve(matrix: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>, FitError> {
    let n = rhs.len();
    if matrix.len() != n {
        return Err(FitError::validation(format!(
            "matrix has {} rows but the right-hand side has length {n}",
            matrix.len()
        )));
    }
    if let Some((i, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != n) {
        return Err(FitError::validation(format!(
            "matrix row {i} has {} entries, expected {n}",
            row.len()
        )));
    }

    let a = DMatrix::from_fn(n, n, |i, j| matrix[i][j]);
    let b = DVector::from_column_slice(rhs);
    let x = solve_linear_system(&a, &b)?;
    Ok(x.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn solves_two_by_two() {
        let x = solve(&[vec![2.0, 1.0], vec![1.0, 3.0]], &[5.0, 10.0]).unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(x[1], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn solves_three_by_three() {
        let m = vec![
            vec![1.0, 1.0, 1.0],
            vec![2.0, 1.0, -1.0],
            vec![1.0, -1.0, 2.0],
        ];
        let x = solve(&m, &[6.0, 1.0, 5.0]).unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(x[1], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(x[2], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn pivoting_handles_zero_leading_entry() {
        // Without a row swap the first pivot would be exactly 0.
        let x = solve(&[vec![0.0, 1.0], vec![1.0, 1.0]], &[2.0, 3.0]).unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn round_trips_larger_system() {
        // Diagonally dominant 5x5, so it is comfortably invertible.
        let n = 5;
        let a = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                10.0 + i as f64
            } else {
                ((i * 3 + j * 7) % 5) as f64 - 2.0
            }
        });
        let v = DVector::from_vec(vec![1.5, -2.0, 0.25, 4.0, -3.5]);
        let b = &a * &v;

        let x = solve_linear_system(&a, &b).unwrap();
        for i in 0..n {
            assert_abs_diff_eq!(x[i], v[i], epsilon = 1e-5);
        }
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let err = solve(&[vec![1.0, 2.0], vec![2.0, 4.0]], &[3.0, 6.0]).unwrap_err();
        assert!(matches!(err, FitError::SingularSystem { column: 1, .. }));
    }

    #[test]
    fn tiny_pivot_is_rejected() {
        let err = solve(&[vec![1e-12, 0.0], vec![0.0, 1.0]], &[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, FitError::SingularSystem { column: 0, .. }));
    }

    #[test]
    fn shape_mismatch_is_a_validation_error() {
        let err = solve(&[vec![1.0, 2.0]], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, FitError::Validation(_)));

        let err = solve(&[vec![1.0], vec![2.0, 3.0]], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, FitError::Validation(_)));
    }
}
