//! Direct encoding of vibrational modals: one qubit per modal.

use std::sync::Arc;

use tracing::debug;

use super::{PauliTable, PauliTableCache, QubitMapper, mode_based_mapping};
use crate::error::MappingResult;
use crate::pauli::{PauliOp, PauliString};
use crate::qubit_op::QubitOperator;
use crate::second_q::{OperatorFamily, SecondQuantizedOp};

/// Table entry `i` is `(X_i, Y_i)`.
pub fn direct_table(num_modals: usize) -> PauliTable {
    debug!(n_modes = num_modals, "building direct table");
    (0..num_modals)
        .map(|i| {
            (
                PauliString::single(num_modals, i, PauliOp::X),
                PauliString::single(num_modals, i, PauliOp::Y),
            )
        })
        .collect()
}

/// Vibrational mapper placing every modal on its own qubit.
#[derive(Debug, Default)]
pub struct DirectMapper {
    cache: PauliTableCache,
}

impl DirectMapper {
    /// Create a mapper with an empty table cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoding table for `num_modals` modals.
    pub fn pauli_table(&self, num_modals: usize) -> Arc<PauliTable> {
        self.cache.get_or_build(num_modals, direct_table)
    }
}

impl QubitMapper for DirectMapper {
    fn family(&self) -> OperatorFamily {
        OperatorFamily::Vibrational
    }

    fn map_single(&self, op: &SecondQuantizedOp) -> MappingResult<QubitOperator> {
        let table = self.pauli_table(op.register_length());
        Ok(mode_based_mapping(op, &table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::second_q::VibrationalOp;
    use num_complex::Complex64;

    #[test]
    fn modal_excitation() {
        // +_0_1 -_0_0 on one mode with two modals
        let op = VibrationalOp::from_labels([("+_0_1 -_0_0", Complex64::new(1.0, 0.0))], vec![2])
            .unwrap();
        let mapped = DirectMapper::new().map(&op.into()).unwrap();
        let expected = QubitOperator::from_labels([
            ("XX", Complex64::new(0.25, 0.0)),
            ("XY", Complex64::new(0.0, 0.25)),
            ("YX", Complex64::new(0.0, -0.25)),
            ("YY", Complex64::new(0.25, 0.0)),
        ])
        .unwrap();
        assert!(mapped.equiv(&expected, 1e-12));
    }
}
