//! Jordan-Wigner encoding: mode `j` stores its own occupation, and the
//! parity of lower modes is recovered from a string of Z operators.

use std::sync::Arc;

use tracing::debug;

use super::{PauliTable, PauliTableCache, QubitMapper, mode_based_mapping};
use crate::error::MappingResult;
use crate::pauli::{PauliOp, PauliString};
use crate::qubit_op::QubitOperator;
use crate::second_q::{OperatorFamily, SecondQuantizedOp};

/// Table entry `j` is `(Z_{<j} X_j, Z_{<j} Y_j)`.
pub fn jordan_wigner_table(num_modes: usize) -> PauliTable {
    debug!(n_modes = num_modes, "building Jordan-Wigner table");
    (0..num_modes)
        .map(|j| {
            let z_string = (0..j).map(|q| (q, PauliOp::Z));
            let even = PauliString::from_ops(
                num_modes,
                z_string.clone().chain(std::iter::once((j, PauliOp::X))),
            );
            let odd = PauliString::from_ops(
                num_modes,
                z_string.chain(std::iter::once((j, PauliOp::Y))),
            );
            (even, odd)
        })
        .collect()
}

/// Fermionic mapper using the Jordan-Wigner encoding.
#[derive(Debug, Default)]
pub struct JordanWignerMapper {
    cache: PauliTableCache,
}

impl JordanWignerMapper {
    /// Create a mapper with an empty table cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoding table for `num_modes` modes.
    pub fn pauli_table(&self, num_modes: usize) -> Arc<PauliTable> {
        self.cache.get_or_build(num_modes, jordan_wigner_table)
    }
}

impl QubitMapper for JordanWignerMapper {
    fn family(&self) -> OperatorFamily {
        OperatorFamily::Fermionic
    }

    fn map_single(&self, op: &SecondQuantizedOp) -> MappingResult<QubitOperator> {
        let table = self.pauli_table(op.register_length());
        Ok(mode_based_mapping(op, &table))
    }
}
