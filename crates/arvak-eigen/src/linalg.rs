//! Dense Hermitian eigendecomposition on top of `faer`.

use faer::{Mat, Side, c64};
use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::{SolverError, SolverResult};

/// Eigenvalues in ascending order and matching normalized eigenvectors.
pub(crate) struct Eigh {
    pub values: Vec<f64>,
    pub vectors: Vec<Array1<Complex64>>,
}

/// Largest `|M_ij - conj(M_ji)|`.
pub(crate) fn hermitian_deviation(m: &Array2<Complex64>) -> f64 {
    let n = m.nrows();
    let mut worst = 0.0_f64;
    for i in 0..n {
        for j in i..n {
            worst = worst.max((m[[i, j]] - m[[j, i]].conj()).norm());
        }
    }
    worst
}

/// Diagonalize a Hermitian matrix. Only the lower triangle is read.
pub(crate) fn eigh(m: &Array2<Complex64>) -> SolverResult<Eigh> {
    let n = m.nrows();
    let a = Mat::<c64>::from_fn(n, n, |i, j| {
        let v = m[[i, j]];
        c64::new(v.re, v.im)
    });
    let evd = a
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| SolverError::Backend(format!("eigendecomposition failed: {e:?}")))?;

    let s = evd.S().column_vector();
    let u = evd.U();
    let mut values = Vec::with_capacity(n);
    let mut vectors = Vec::with_capacity(n);
    for k in 0..n {
        values.push(s[k].re);
        vectors.push(Array1::from_iter((0..n).map(|i| {
            let z = u[(i, k)];
            Complex64::new(z.re, z.im)
        })));
    }
    Ok(Eigh { values, vectors })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn inner(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Complex64 {
        a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).sum()
    }

    fn residual(m: &Array2<Complex64>, value: f64, v: &Array1<Complex64>) -> f64 {
        let mv = m.dot(v);
        mv.iter()
            .zip(v.iter())
            .map(|(a, b)| (*a - *b * value).norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    #[test]
    fn test_real_symmetric() {
        let m = Array2::from_shape_vec(
            (3, 3),
            vec![
                c(2.0, 0.0),
                c(1.0, 0.0),
                c(0.0, 0.0),
                c(1.0, 0.0),
                c(2.0, 0.0),
                c(1.0, 0.0),
                c(0.0, 0.0),
                c(1.0, 0.0),
                c(2.0, 0.0),
            ],
        )
        .unwrap();
        let result = eigh(&m).unwrap();
        let sqrt2 = 2.0_f64.sqrt();
        let expected = [2.0 - sqrt2, 2.0, 2.0 + sqrt2];
        for (value, want) in result.values.iter().zip(expected) {
            assert!((value - want).abs() < 1e-10, "{value} != {want}");
        }
        for (value, v) in result.values.iter().zip(&result.vectors) {
            assert!(residual(&m, *value, v) < 1e-9);
        }
    }

    #[test]
    fn test_pauli_y_is_complex_hermitian() {
        let m = Array2::from_shape_vec(
            (2, 2),
            vec![c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)],
        )
        .unwrap();
        let result = eigh(&m).unwrap();
        assert_eq!(result.values.len(), 2);
        assert!((result.values[0] + 1.0).abs() < 1e-10);
        assert!((result.values[1] - 1.0).abs() < 1e-10);
        for (value, v) in result.values.iter().zip(&result.vectors) {
            assert!((inner(v, v).re - 1.0).abs() < 1e-10);
            assert!(residual(&m, *value, v) < 1e-9);
        }
    }

    #[test]
    fn test_degenerate_complex_spectrum() {
        // diag(Y, Y): eigenvalues -1, -1, 1, 1
        let mut m = Array2::<Complex64>::zeros((4, 4));
        for block in [0, 2] {
            m[[block, block + 1]] = c(0.0, -1.0);
            m[[block + 1, block]] = c(0.0, 1.0);
        }
        let result = eigh(&m).unwrap();
        assert_eq!(result.values.len(), 4);
        for (value, want) in result.values.iter().zip([-1.0, -1.0, 1.0, 1.0]) {
            assert!((value - want).abs() < 1e-10);
        }
        for i in 0..4 {
            for j in 0..4 {
                let overlap = inner(&result.vectors[i], &result.vectors[j]).norm();
                let want = if i == j { 1.0 } else { 0.0 };
                assert!((overlap - want).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_hermitian_deviation() {
        let mut m = Array2::<Complex64>::zeros((2, 2));
        m[[0, 1]] = c(0.0, 1.0);
        m[[1, 0]] = c(0.0, -1.0);
        assert!(hermitian_deviation(&m) < 1e-15);
        m[[1, 0]] = c(0.0, 1.0);
        assert!((hermitian_deviation(&m) - 2.0).abs() < 1e-12);
    }
}
