//! Two-qubit reduction for parity-encoded fermionic operators.
//!
//! Under the parity encoding qubit `n/2 - 1` holds the parity of the
//! alpha-spin modes and qubit `n - 1` the parity of all modes. With known
//! particle numbers both are fixed, so their `Z` factors can be replaced
//! by `(-1)^{N_α}` and `(-1)^{N_α + N_β}` and the qubits dropped.

use tracing::debug;

use super::Z2Symmetries;
use crate::error::{MappingError, MappingResult};
use crate::pauli::{PauliOp, PauliString};
use crate::qubit_op::QubitOperator;

/// Drops the two parity qubits of a spin-ordered fermionic register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoQubitReduction {
    num_particles: (usize, usize),
}

impl TwoQubitReduction {
    /// Reduction for `(N_alpha, N_beta)` particles.
    pub fn new(num_particles: (usize, usize)) -> Self {
        Self { num_particles }
    }

    /// Qubits removed from an `n`-qubit register. The register must be
    /// even and hold at least two qubits.
    pub fn removed_qubits(num_qubits: usize) -> MappingResult<[usize; 2]> {
        if num_qubits < 2 || num_qubits % 2 != 0 {
            return Err(MappingError::UnsupportedRegister {
                num_qubits,
                reason: "two-qubit reduction needs an even register of at least two qubits",
            });
        }
        Ok([num_qubits / 2 - 1, num_qubits - 1])
    }

    /// The fixed-sector symmetries describing the reduction.
    pub fn symmetries(&self, num_qubits: usize) -> MappingResult<Z2Symmetries> {
        let sq_list = Self::removed_qubits(num_qubits)?.to_vec();
        let paulis: Vec<PauliString> = sq_list
            .iter()
            .map(|&q| PauliString::single(num_qubits, q, PauliOp::Z))
            .collect();
        let (alpha, beta) = self.num_particles;
        let parity = |count: usize| if count % 2 == 0 { 1 } else { -1 };
        Z2Symmetries::new(paulis.clone(), paulis, sq_list)
            .with_tapering_values(vec![parity(alpha), parity(alpha + beta)])
    }

    /// Reduce `op` by two qubits.
    pub fn reduce(&self, op: &QubitOperator) -> MappingResult<QubitOperator> {
        let symmetries = self.symmetries(op.num_qubits())?;
        debug!(
            num_qubits = op.num_qubits(),
            removed = ?symmetries.sq_list(),
            values = ?symmetries.tapering_values(),
            "two-qubit reduction"
        );
        symmetries.taper_clifford(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn removes_middle_and_last_qubit() {
        assert_eq!(TwoQubitReduction::removed_qubits(4).unwrap(), [1, 3]);
        assert_eq!(TwoQubitReduction::removed_qubits(2).unwrap(), [0, 1]);
        assert_eq!(TwoQubitReduction::removed_qubits(6).unwrap(), [2, 5]);
    }

    #[test]
    fn short_or_odd_registers_are_rejected() {
        for n in [0, 1, 3] {
            assert!(matches!(
                TwoQubitReduction::removed_qubits(n),
                Err(MappingError::UnsupportedRegister { num_qubits, .. }) if num_qubits == n
            ));
        }
        let op = QubitOperator::from_labels([("Z", Complex64::new(1.0, 0.0))]).unwrap();
        assert!(matches!(
            TwoQubitReduction::new((1, 0)).reduce(&op),
            Err(MappingError::UnsupportedRegister { num_qubits: 1, .. })
        ));
    }

    #[test]
    fn z_factors_replaced_by_parities() {
        // qubits 1 and 3 carry Z; one alpha and one beta particle
        let op = QubitOperator::from_labels([
            ("ZIZI", Complex64::new(1.0, 0.0)),
            ("IIZX", Complex64::new(2.0, 0.0)),
        ])
        .unwrap();
        let reduced = TwoQubitReduction::new((1, 1)).reduce(&op).unwrap();
        assert_eq!(reduced.num_qubits(), 2);
        // ZIZI -> (+1)(-1) on the removed qubits; IIZX -> Z on qubit 1 gives -1
        let expected = QubitOperator::from_labels([
            ("II", Complex64::new(-1.0, 0.0)),
            ("IX", Complex64::new(-2.0, 0.0)),
        ])
        .unwrap();
        assert!(reduced.equiv(&expected, 1e-12), "{reduced}");
    }
}
