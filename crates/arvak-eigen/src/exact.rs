//! Reference eigensolvers based on dense diagonalization.
//!
//! These build the full `2^n × 2^n` matrix of the operator, so they are
//! limited to small registers (see [`ExactSolverConfig::max_qubits`]).

use std::sync::Arc;

use arvak_qmap::{QubitMapper, QubitOperator, QubitOperatorMap};
use async_trait::async_trait;
use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{SolverError, SolverResult};
use crate::linalg;
use crate::problem::Problem;
use crate::result::{AuxValues, EigensolverResult, MinimumEigensolverResult};
use crate::solver::{
    Eigensolver, EigensolverFactory, MinimumEigensolver, MinimumEigensolverFactory,
};

/// Accepts or rejects an eigenstate given `(state, eigenvalue, aux_values)`.
pub type FilterCriterion =
    Arc<dyn Fn(&Array1<Complex64>, f64, Option<&AuxValues>) -> bool + Send + Sync>;

const HERMITIAN_TOL: f64 = 1e-8;

fn default_k() -> usize {
    1
}

fn default_max_qubits() -> usize {
    10
}

/// Exact solver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactSolverConfig {
    /// Number of eigenstates to return.
    #[serde(default = "default_k")]
    pub k: usize,

    /// Largest register accepted for dense diagonalization.
    #[serde(default = "default_max_qubits")]
    pub max_qubits: usize,
}

impl Default for ExactSolverConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            max_qubits: default_max_qubits(),
        }
    }
}

impl ExactSolverConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> SolverResult<()> {
        if self.k == 0 {
            return Err(SolverError::InvalidK(self.k));
        }
        Ok(())
    }
}

/// Dense eigensolver returning the `k` lowest eigenstates.
#[derive(Clone, Default)]
pub struct ExactEigensolver {
    config: ExactSolverConfig,
    filter_criterion: Option<FilterCriterion>,
}

impl std::fmt::Debug for ExactEigensolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExactEigensolver")
            .field("config", &self.config)
            .field("filter_criterion", &self.filter_criterion.is_some())
            .finish()
    }
}

impl ExactEigensolver {
    /// Solver for the `k` lowest eigenstates.
    pub fn new(k: usize) -> Self {
        Self::with_config(ExactSolverConfig {
            k,
            ..Default::default()
        })
    }

    /// Solver with explicit settings.
    pub fn with_config(config: ExactSolverConfig) -> Self {
        Self {
            config,
            filter_criterion: None,
        }
    }

    /// Only return eigenstates accepted by `filter`.
    #[must_use]
    pub fn with_filter_criterion(mut self, filter: FilterCriterion) -> Self {
        self.filter_criterion = Some(filter);
        self
    }

    pub fn config(&self) -> &ExactSolverConfig {
        &self.config
    }

    pub fn filter_criterion(&self) -> Option<&FilterCriterion> {
        self.filter_criterion.as_ref()
    }

    /// Diagonalize synchronously.
    ///
    /// Eigenstates are scanned in ascending eigenvalue order; the first `k`
    /// that pass the filter are returned. Fewer than `k` states are returned
    /// when the register is small or the filter is selective, and
    /// [`SolverError::NoEigenstateMatched`] when none pass.
    pub fn solve(
        &self,
        operator: &QubitOperator,
        aux_operators: Option<&QubitOperatorMap>,
    ) -> SolverResult<EigensolverResult> {
        self.config.validate()?;
        let num_qubits = operator.num_qubits();
        if num_qubits > self.config.max_qubits {
            return Err(SolverError::TooLarge {
                num_qubits,
                max_qubits: self.config.max_qubits,
            });
        }
        if let Some(aux) = aux_operators {
            for (name, op) in aux {
                if op.num_qubits() != num_qubits {
                    return Err(SolverError::DimensionMismatch {
                        name: name.clone(),
                        expected: num_qubits,
                        found: op.num_qubits(),
                    });
                }
            }
        }

        let matrix = operator.to_matrix();
        let deviation = linalg::hermitian_deviation(&matrix);
        if deviation > HERMITIAN_TOL {
            return Err(SolverError::NotHermitian { deviation });
        }
        let spectrum = linalg::eigh(&matrix)?;

        let mut result = EigensolverResult {
            aux_operators_evaluated: aux_operators.map(|_| Vec::new()),
            ..Default::default()
        };
        for (value, state) in spectrum.values.into_iter().zip(spectrum.vectors) {
            if result.eigenvalues.len() == self.config.k {
                break;
            }
            let aux_values = aux_operators.map(|aux| evaluate(aux, &state));
            if let Some(filter) = &self.filter_criterion {
                if !filter(&state, value, aux_values.as_ref()) {
                    continue;
                }
            }
            result.eigenvalues.push(value);
            result.eigenstates.push(state);
            if let (Some(all), Some(values)) = (result.aux_operators_evaluated.as_mut(), aux_values) {
                all.push(values);
            }
        }
        if result.eigenvalues.is_empty() {
            return Err(SolverError::NoEigenstateMatched);
        }
        debug!(
            num_qubits,
            k = self.config.k,
            found = result.eigenvalues.len(),
            filtered = self.filter_criterion.is_some(),
            "exact diagonalization"
        );
        Ok(result)
    }
}

fn evaluate(aux: &QubitOperatorMap, state: &Array1<Complex64>) -> AuxValues {
    aux.iter()
        .map(|(name, op)| (name.clone(), op.expectation(state)))
        .collect()
}

#[async_trait]
impl Eigensolver for ExactEigensolver {
    fn supports_aux_operators(&self) -> bool {
        true
    }

    #[instrument(skip_all, fields(num_qubits = operator.num_qubits()))]
    async fn compute_eigenvalues(
        &self,
        operator: &QubitOperator,
        aux_operators: Option<&QubitOperatorMap>,
    ) -> SolverResult<EigensolverResult> {
        let solver = self.clone();
        let operator = operator.clone();
        let aux_operators = aux_operators.cloned();
        // Diagonalization is CPU-bound
        tokio::task::spawn_blocking(move || solver.solve(&operator, aux_operators.as_ref()))
            .await
            .map_err(|e| SolverError::Backend(format!("diagonalization task failed: {e}")))?
    }
}

/// Dense solver for the lowest eigenstate.
#[derive(Debug, Clone)]
pub struct ExactMinimumEigensolver {
    inner: ExactEigensolver,
}

impl Default for ExactMinimumEigensolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ExactMinimumEigensolver {
    pub fn new() -> Self {
        Self {
            inner: ExactEigensolver::new(1),
        }
    }

    /// Override the register limit.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.inner.config.max_qubits = max_qubits;
        self
    }

    /// Return the lowest eigenstate accepted by `filter`.
    #[must_use]
    pub fn with_filter_criterion(mut self, filter: FilterCriterion) -> Self {
        self.inner.filter_criterion = Some(filter);
        self
    }

    pub fn filter_criterion(&self) -> Option<&FilterCriterion> {
        self.inner.filter_criterion()
    }
}

#[async_trait]
impl MinimumEigensolver for ExactMinimumEigensolver {
    fn supports_aux_operators(&self) -> bool {
        true
    }

    async fn compute_minimum_eigenvalue(
        &self,
        operator: &QubitOperator,
        aux_operators: Option<&QubitOperatorMap>,
    ) -> SolverResult<MinimumEigensolverResult> {
        let result = self.inner.compute_eigenvalues(operator, aux_operators).await?;
        let eigenvalue = result
            .eigenvalues
            .first()
            .copied()
            .ok_or(SolverError::NoEigenstateMatched)?;
        Ok(MinimumEigensolverResult {
            eigenvalue,
            eigenstate: result.eigenstates.into_iter().next(),
            aux_operators_evaluated: result
                .aux_operators_evaluated
                .and_then(|all| all.into_iter().next()),
        })
    }
}

/// Builds [`ExactEigensolver`]s.
#[derive(Clone, Default)]
pub struct ExactEigensolverFactory {
    config: ExactSolverConfig,
    filter_criterion: Option<FilterCriterion>,
    use_default_filter_criterion: bool,
}

impl std::fmt::Debug for ExactEigensolverFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExactEigensolverFactory")
            .field("config", &self.config)
            .field("filter_criterion", &self.filter_criterion.is_some())
            .field("use_default_filter_criterion", &self.use_default_filter_criterion)
            .finish()
    }
}

impl ExactEigensolverFactory {
    pub fn new(config: ExactSolverConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Filter applied by every built solver.
    #[must_use]
    pub fn with_filter_criterion(mut self, filter: FilterCriterion) -> Self {
        self.filter_criterion = Some(filter);
        self
    }

    /// Take the filter from [`Problem::default_filter_criterion`] instead.
    #[must_use]
    pub fn with_default_filter_criterion(mut self, enabled: bool) -> Self {
        self.use_default_filter_criterion = enabled;
        self
    }
}

impl EigensolverFactory for ExactEigensolverFactory {
    fn supports_aux_operators(&self) -> bool {
        true
    }

    fn get_solver(&self, problem: &dyn Problem) -> SolverResult<Arc<dyn Eigensolver>> {
        self.config.validate()?;
        let filter_criterion = if self.use_default_filter_criterion {
            problem.default_filter_criterion()
        } else {
            self.filter_criterion.clone()
        };
        debug!(
            k = self.config.k,
            filtered = filter_criterion.is_some(),
            "building exact eigensolver"
        );
        Ok(Arc::new(ExactEigensolver {
            config: self.config.clone(),
            filter_criterion,
        }))
    }
}

/// Builds [`ExactMinimumEigensolver`]s.
#[derive(Clone)]
pub struct ExactMinimumEigensolverFactory {
    max_qubits: usize,
    filter_criterion: Option<FilterCriterion>,
    use_default_filter_criterion: bool,
}

impl Default for ExactMinimumEigensolverFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExactMinimumEigensolverFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExactMinimumEigensolverFactory")
            .field("max_qubits", &self.max_qubits)
            .field("filter_criterion", &self.filter_criterion.is_some())
            .field("use_default_filter_criterion", &self.use_default_filter_criterion)
            .finish()
    }
}

impl ExactMinimumEigensolverFactory {
    pub fn new() -> Self {
        Self {
            max_qubits: default_max_qubits(),
            filter_criterion: None,
            use_default_filter_criterion: false,
        }
    }

    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Filter applied by every built solver.
    #[must_use]
    pub fn with_filter_criterion(mut self, filter: FilterCriterion) -> Self {
        self.filter_criterion = Some(filter);
        self
    }

    /// Take the filter from [`Problem::default_filter_criterion`] instead.
    #[must_use]
    pub fn with_default_filter_criterion(mut self, enabled: bool) -> Self {
        self.use_default_filter_criterion = enabled;
        self
    }
}

impl MinimumEigensolverFactory for ExactMinimumEigensolverFactory {
    fn supports_aux_operators(&self) -> bool {
        true
    }

    fn get_solver(
        &self,
        problem: &dyn Problem,
        mapper: &dyn QubitMapper,
    ) -> SolverResult<Arc<dyn MinimumEigensolver>> {
        let filter_criterion = if self.use_default_filter_criterion {
            problem.default_filter_criterion()
        } else {
            self.filter_criterion.clone()
        };
        debug!(
            family = %mapper.family(),
            max_qubits = self.max_qubits,
            filtered = filter_criterion.is_some(),
            "building exact minimum eigensolver"
        );
        let mut solver = ExactMinimumEigensolver::new().with_max_qubits(self.max_qubits);
        solver.inner.filter_criterion = filter_criterion;
        Ok(Arc::new(solver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn zz_plus_x() -> QubitOperator {
        QubitOperator::from_labels([("ZZ", c(1.0)), ("XI", c(0.5))]).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ExactSolverConfig::default();
        assert_eq!(config.k, 1);
        assert_eq!(config.max_qubits, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config: ExactSolverConfig = serde_json::from_str(r#"{"k": 3}"#).unwrap();
        assert_eq!(config.k, 3);
        assert_eq!(config.max_qubits, 10);
    }

    #[test]
    fn test_zero_k_is_rejected() {
        let result = ExactEigensolver::new(0).solve(&zz_plus_x(), None);
        assert!(matches!(result, Err(SolverError::InvalidK(0))));
    }

    #[test]
    fn test_spectrum_is_ascending() {
        // ZZ + 0.5 XI has eigenvalues ±sqrt(1.25), each twice
        let result = ExactEigensolver::new(4).solve(&zz_plus_x(), None).unwrap();
        let e = 1.25_f64.sqrt();
        let expected = [-e, -e, e, e];
        assert_eq!(result.eigenvalues.len(), 4);
        for (value, want) in result.eigenvalues.iter().zip(expected) {
            assert!((value - want).abs() < 1e-10);
        }
        assert!(result.aux_operators_evaluated.is_none());
    }

    #[test]
    fn test_k_larger_than_dimension_is_clamped() {
        let op = QubitOperator::from_labels([("Z", c(1.0))]).unwrap();
        let result = ExactEigensolver::new(5).solve(&op, None).unwrap();
        assert_eq!(result.eigenvalues.len(), 2);
    }

    #[test]
    fn test_too_large() {
        let op = QubitOperator::identity(4);
        let solver = ExactEigensolver::with_config(ExactSolverConfig {
            k: 1,
            max_qubits: 3,
        });
        assert!(matches!(
            solver.solve(&op, None),
            Err(SolverError::TooLarge {
                num_qubits: 4,
                max_qubits: 3
            })
        ));
    }

    #[test]
    fn test_not_hermitian() {
        let op = QubitOperator::from_labels([("X", Complex64::new(0.0, 1.0))]).unwrap();
        assert!(matches!(
            ExactEigensolver::new(1).solve(&op, None),
            Err(SolverError::NotHermitian { .. })
        ));
    }

    #[test]
    fn test_aux_dimension_mismatch() {
        let mut aux = QubitOperatorMap::new();
        aux.insert("z".into(), QubitOperator::from_labels([("Z", c(1.0))]).unwrap());
        let result = ExactEigensolver::new(1).solve(&zz_plus_x(), Some(&aux));
        assert!(matches!(
            result,
            Err(SolverError::DimensionMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_filter_rejects_everything() {
        let solver = ExactEigensolver::new(2).with_filter_criterion(Arc::new(
            |_: &Array1<Complex64>, _: f64, _: Option<&AuxValues>| false,
        ));
        assert!(matches!(
            solver.solve(&zz_plus_x(), None),
            Err(SolverError::NoEigenstateMatched)
        ));
    }

    #[test]
    fn test_complex_operator_on_eight_qubits() {
        // sum of Y_q plus Z_q X_{q+1}: complex, 256 x 256
        let n = 8;
        let mut terms = Vec::new();
        for q in 0..n {
            let mut y = vec!['I'; n];
            y[n - 1 - q] = 'Y';
            terms.push((y.into_iter().collect::<String>(), c(1.0)));
            if q + 1 < n {
                let mut zx = vec!['I'; n];
                zx[n - 1 - q] = 'Z';
                zx[n - 2 - q] = 'X';
                terms.push((zx.into_iter().collect::<String>(), c(0.5)));
            }
        }
        let op = QubitOperator::from_labels(terms.iter().map(|(l, v)| (l.as_str(), *v))).unwrap();
        let result = ExactEigensolver::new(2).solve(&op, None).unwrap();
        assert_eq!(result.eigenvalues.len(), 2);
        assert!(result.eigenvalues[0] <= result.eigenvalues[1]);
        for (value, state) in result.eigenvalues.iter().zip(&result.eigenstates) {
            assert!((op.expectation(state).re - value).abs() < 1e-9);
        }
        // bounded by the product state with every qubit in the -1 eigenstate of Y
        assert!(result.eigenvalues[0] < -(n as f64) + 1e-9);
    }

    #[tokio::test]
    async fn test_minimum_eigensolver_evaluates_aux() {
        // -Z on qubit 0: ground state |0>, where <Z_0> = 1
        let op = QubitOperator::from_labels([("IZ", c(-1.0)), ("ZI", c(-2.0))]).unwrap();
        let mut aux = QubitOperatorMap::new();
        aux.insert("z0".into(), QubitOperator::from_labels([("IZ", c(1.0))]).unwrap());
        let result = ExactMinimumEigensolver::new()
            .compute_minimum_eigenvalue(&op, Some(&aux))
            .await
            .unwrap();
        assert!((result.eigenvalue + 3.0).abs() < 1e-12);
        let values = result.aux_operators_evaluated.unwrap();
        assert!((values["z0"] - c(1.0)).norm() < 1e-12);
        assert!(result.eigenstate.is_some());
    }
}
