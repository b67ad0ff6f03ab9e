//! Raw spectra returned by solvers and the interpreted eigenstate result.

use std::collections::BTreeMap;

use ndarray::Array1;
use num_complex::Complex64;

/// Auxiliary operator expectation values for one eigenstate, keyed by name.
pub type AuxValues = BTreeMap<String, Complex64>;

/// Output of a minimum eigensolver.
#[derive(Debug, Clone, Default)]
pub struct MinimumEigensolverResult {
    /// Lowest eigenvalue.
    pub eigenvalue: f64,
    /// Corresponding eigenstate, if the solver produces one.
    pub eigenstate: Option<Array1<Complex64>>,
    /// Auxiliary expectation values in that eigenstate.
    pub aux_operators_evaluated: Option<AuxValues>,
}

/// Output of an eigensolver; entries are in ascending eigenvalue order.
#[derive(Debug, Clone, Default)]
pub struct EigensolverResult {
    pub eigenvalues: Vec<f64>,
    pub eigenstates: Vec<Array1<Complex64>>,
    pub aux_operators_evaluated: Option<Vec<AuxValues>>,
}

/// Solver-agnostic result handed to [`Problem::interpret`](crate::Problem::interpret).
///
/// The raw fields are filled from the solver output. Problems fill
/// `computed_energies`, `energy_shifts` and `properties` when interpreting.
#[derive(Debug, Clone, Default)]
pub struct EigenstateResult {
    /// Raw eigenvalues, ground state first.
    pub eigenvalues: Vec<f64>,
    /// Raw eigenstates, aligned with `eigenvalues` (may be empty).
    pub eigenstates: Vec<Array1<Complex64>>,
    /// Auxiliary expectation values per eigenstate.
    pub aux_operators_evaluated: Option<Vec<AuxValues>>,
    /// Electronic (or vibrational) part of each energy.
    pub computed_energies: Vec<f64>,
    /// Constant shifts added on top of the computed energies, by name.
    pub energy_shifts: BTreeMap<String, f64>,
    /// Interpreted per-state properties, by name.
    pub properties: BTreeMap<String, Vec<f64>>,
}

impl EigenstateResult {
    /// Wrap a minimum eigensolver result.
    pub fn from_minimum(raw: MinimumEigensolverResult) -> Self {
        Self {
            eigenvalues: vec![raw.eigenvalue],
            eigenstates: raw.eigenstate.into_iter().collect(),
            aux_operators_evaluated: raw.aux_operators_evaluated.map(|aux| vec![aux]),
            ..Default::default()
        }
    }

    /// Wrap an eigensolver result.
    pub fn from_eigensolver(raw: EigensolverResult) -> Self {
        Self {
            eigenvalues: raw.eigenvalues,
            eigenstates: raw.eigenstates,
            aux_operators_evaluated: raw.aux_operators_evaluated,
            ..Default::default()
        }
    }

    /// Ground-state energy: the first computed energy, else the first raw eigenvalue.
    pub fn groundenergy(&self) -> Option<f64> {
        self.computed_energies
            .first()
            .or_else(|| self.eigenvalues.first())
            .copied()
    }

    /// Ground state vector, if the solver returned one.
    pub fn groundstate(&self) -> Option<&Array1<Complex64>> {
        self.eigenstates.first()
    }

    /// Computed energies plus the sum of all energy shifts.
    ///
    /// Falls back to the raw eigenvalues when nothing has been interpreted.
    pub fn total_energies(&self) -> Vec<f64> {
        let shift: f64 = self.energy_shifts.values().sum();
        let base = if self.computed_energies.is_empty() {
            &self.eigenvalues
        } else {
            &self.computed_energies
        };
        base.iter().map(|e| e + shift).collect()
    }

    /// Number of states in the result.
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    /// True if the result holds no states.
    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minimum() {
        let mut aux = AuxValues::new();
        aux.insert("n".into(), Complex64::new(2.0, 0.0));
        let result = EigenstateResult::from_minimum(MinimumEigensolverResult {
            eigenvalue: -1.5,
            eigenstate: Some(Array1::from_vec(vec![Complex64::new(1.0, 0.0)])),
            aux_operators_evaluated: Some(aux),
        });
        assert_eq!(result.eigenvalues, vec![-1.5]);
        assert_eq!(result.eigenstates.len(), 1);
        assert_eq!(result.aux_operators_evaluated.as_ref().map(Vec::len), Some(1));
        assert_eq!(result.groundenergy(), Some(-1.5));
    }

    #[test]
    fn test_total_energies() {
        let mut result = EigenstateResult::from_eigensolver(EigensolverResult {
            eigenvalues: vec![-2.0, -1.0],
            ..Default::default()
        });
        assert_eq!(result.total_energies(), vec![-2.0, -1.0]);

        result.computed_energies = vec![-3.0, -2.5];
        result.energy_shifts.insert("nuclear_repulsion".into(), 0.5);
        result.energy_shifts.insert("frozen_core".into(), -0.25);
        assert_eq!(result.total_energies(), vec![-2.75, -2.25]);
        assert_eq!(result.groundenergy(), Some(-3.0));
    }

    #[test]
    fn test_empty_result() {
        let result = EigenstateResult::default();
        assert!(result.is_empty());
        assert_eq!(result.groundenergy(), None);
        assert!(result.groundstate().is_none());
    }
}
