//! Bravyi-Kitaev encoding: qubits store partial parities over a binary
//! tree of modes, so both occupation and parity need only `O(log n)`
//! qubits per ladder operator.

use std::sync::Arc;

use tracing::debug;

use super::{PauliTable, PauliTableCache, QubitMapper, mode_based_mapping};
use crate::error::MappingResult;
use crate::index_sets::ModeIndexSets;
use crate::pauli::{PauliOp, PauliString};
use crate::qubit_op::QubitOperator;
use crate::second_q::{OperatorFamily, SecondQuantizedOp};

/// Table entry `j` is `(Z_{P(j)} X_j X_{U(j)}, Z_{R(j)} Y_j X_{U(j)})`
/// with phase 0.
pub fn bravyi_kitaev_table(num_modes: usize) -> PauliTable {
    debug!(n_modes = num_modes, "building Bravyi-Kitaev table");
    let on = |indices: &[usize], op: PauliOp| {
        PauliString::from_ops(num_modes, indices.iter().map(|&q| (q, op)))
    };
    (0..num_modes)
        .map(|j| {
            let sets = ModeIndexSets::new(j, num_modes);
            let update = on(&sets.update, PauliOp::X);
            let parity = on(&sets.parity, PauliOp::Z);
            let remainder = on(&sets.remainder, PauliOp::Z);
            let x_j = PauliString::single(num_modes, j, PauliOp::X);
            let y_j = PauliString::single(num_modes, j, PauliOp::Y);
            let even = parity.compose(&x_j).compose(&update).with_phase(0);
            let odd = remainder.compose(&y_j).compose(&update).with_phase(0);
            (even, odd)
        })
        .collect()
}

/// Fermionic mapper using the Bravyi-Kitaev encoding.
#[derive(Debug, Default)]
pub struct BravyiKitaevMapper {
    cache: PauliTableCache,
}

impl BravyiKitaevMapper {
    /// Create a mapper with an empty table cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoding table for `num_modes` modes.
    pub fn pauli_table(&self, num_modes: usize) -> Arc<PauliTable> {
        self.cache.get_or_build(num_modes, bravyi_kitaev_table)
    }
}

impl QubitMapper for BravyiKitaevMapper {
    fn family(&self) -> OperatorFamily {
        OperatorFamily::Fermionic
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
    fn four_mode_table() {
        let table = bravyi_kitaev_table(4);
        let labels: Vec<(String, String)> = table
            .iter()
            .map(|(e, o)| (e.to_string(), o.to_string()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("XIXX".to_string(), "XIXY".to_string()),
                ("XIXZ".to_string(), "XIYI".to_string()),
                ("XXZI".to_string(), "XYZI".to_string()),
                ("XZZI".to_string(), "YIII".to_string()),
            ]
        );
    }

    #[test]
    fn every_entry_has_zero_phase() {
        for n in 1..=9 {
            for (even, odd) in bravyi_kitaev_table(n) {
                assert_eq!(even.phase(), 0);
                assert_eq!(odd.phase(), 0);
            }
        }
    }
}
