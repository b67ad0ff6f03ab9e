//! Parity encoding: qubit `j` stores the parity of modes `0..=j`.
//!
//! With a fixed particle number the qubits at `n/2 - 1` and `n - 1` hold
//! known parities, which is what makes two-qubit reduction possible.

use std::sync::Arc;

use tracing::debug;

use super::{PauliTable, PauliTableCache, QubitMapper, mode_based_mapping};
use crate::error::MappingResult;
use crate::pauli::{PauliOp, PauliString};
use crate::qubit_op::QubitOperator;
use crate::second_q::{OperatorFamily, SecondQuantizedOp};

/// Table entry `j` is `(Z_{j-1} X_j X_{>j}, Y_j X_{>j})`.
pub fn parity_table(num_modes: usize) -> PauliTable {
    debug!(n_modes = num_modes, "building parity table");
    (0..num_modes)
        .map(|j| {
            let x_tail = (j + 1..num_modes).map(|q| (q, PauliOp::X));
            let z_prev = j.checked_sub(1).map(|q| (q, PauliOp::Z));
            let even = PauliString::from_ops(
                num_modes,
                z_prev
                    .into_iter()
                    .chain(std::iter::once((j, PauliOp::X)))
                    .chain(x_tail.clone()),
            );
            let odd = PauliString::from_ops(
                num_modes,
                std::iter::once((j, PauliOp::Y)).chain(x_tail),
            );
            (even, odd)
        })
        .collect()
}

/// Fermionic mapper using the parity encoding.
#[derive(Debug, Default)]
pub struct ParityMapper {
    cache: PauliTableCache,
}

impl ParityMapper {
    /// Create a mapper with an empty table cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoding table for `num_modes` modes.
    pub fn pauli_table(&self, num_modes: usize) -> Arc<PauliTable> {
        self.cache.get_or_build(num_modes, parity_table)
    }
}

impl QubitMapper for ParityMapper {
    fn family(&self) -> OperatorFamily {
        OperatorFamily::Fermionic
    }

    fn allows_two_qubit_reduction(&self) -> bool {
        true
    }

    fn map_single(&self, op: &SecondQuantizedOp) -> MappingResult<QubitOperator> {
        let table = self.pauli_table(op.register_length());
        Ok(mode_based_mapping(op, &table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_mode_table() {
        let table = parity_table(3);
        let labels: Vec<(String, String)> = table
            .iter()
            .map(|(e, o)| (e.to_string(), o.to_string()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("XXX".to_string(), "XXY".to_string()),
                ("XXZ".to_string(), "XYI".to_string()),
                ("XZI".to_string(), "YII".to_string()),
            ]
        );
    }
}
