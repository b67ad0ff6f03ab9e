//! Second-quantized → qubit operator mappers.
//!
//! Every variant describes each mode `j` by a pair of Pauli strings
//! `(P_even_j, P_odd_j)` and builds ladder operators from them:
//!
//!   a†_j = ½ (P_even_j − i·P_odd_j)
//!   a_j  = ½ (P_even_j + i·P_odd_j)
//!
//! Variants differ only in their table; batching, family checks and
//! register-length checks live in the [`QubitMapper`] default methods.

mod bravyi_kitaev;
mod direct;
mod jordan_wigner;
mod parity;

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{MappingError, MappingResult};
use crate::pauli::PauliString;
use crate::qubit_op::QubitOperator;
use crate::second_q::{LadderAction, OperatorFamily, SecondQuantizedOp};
use crate::symmetry::Z2Symmetries;

pub use bravyi_kitaev::{BravyiKitaevMapper, bravyi_kitaev_table};
pub use direct::{DirectMapper, direct_table};
pub use jordan_wigner::{JordanWignerMapper, jordan_wigner_table};
pub use parity::{ParityMapper, parity_table};

/// Per-mode `(P_even, P_odd)` pairs.
pub type PauliTable = Vec<(PauliString, PauliString)>;

/// An auxiliary operator: either still second-quantized or already mapped.
#[derive(Debug, Clone, PartialEq)]
pub enum AuxOperator {
    /// Needs mapping.
    SecondQuantized(SecondQuantizedOp),
    /// Passed through unchanged.
    Qubit(QubitOperator),
}

impl From<SecondQuantizedOp> for AuxOperator {
    fn from(op: SecondQuantizedOp) -> Self {
        AuxOperator::SecondQuantized(op)
    }
}

impl From<QubitOperator> for AuxOperator {
    fn from(op: QubitOperator) -> Self {
        AuxOperator::Qubit(op)
    }
}

/// Named auxiliary operators before mapping.
pub type OperatorMap = BTreeMap<String, AuxOperator>;

/// Named auxiliary operators after mapping.
pub type QubitOperatorMap = BTreeMap<String, QubitOperator>;

/// Read-through cache of encoding tables keyed by register length.
///
/// Tables are built outside the lock. Two callers racing on the same
/// length both build it and the later insert wins; readers only ever see
/// complete tables.
#[derive(Debug, Default)]
pub struct PauliTableCache {
    tables: RwLock<FxHashMap<usize, Arc<PauliTable>>>,
}

impl PauliTableCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `num_modes`, building it on a miss.
    pub fn get_or_build(
        &self,
        num_modes: usize,
        build: impl FnOnce(usize) -> PauliTable,
    ) -> Arc<PauliTable> {
        if let Some(table) = self
            .tables
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&num_modes)
        {
            return Arc::clone(table);
        }
        let table = Arc::new(build(num_modes));
        self.tables
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(num_modes, Arc::clone(&table));
        table
    }

    /// Number of cached register lengths.
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// True if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Picks the physically relevant Z2 sector for a set of detected symmetries.
pub trait SectorLocator {
    /// Tapering values (each ±1), or `None` if no sector can be chosen.
    fn locate(&self, symmetries: &Z2Symmetries) -> Option<Vec<i8>>;
}

impl<F> SectorLocator for F
where
    F: Fn(&Z2Symmetries) -> Option<Vec<i8>>,
{
    fn locate(&self, symmetries: &Z2Symmetries) -> Option<Vec<i8>> {
        self(symmetries)
    }
}

/// Problem-level information consumed by reducing mappers.
#[derive(Clone, Copy, Default)]
pub struct ReductionHints<'a> {
    /// `(N_alpha, N_beta)` if known.
    pub num_particles: Option<(usize, usize)>,
    /// Sector locator for automatic Z2 reduction.
    pub sector_locator: Option<&'a dyn SectorLocator>,
}

impl std::fmt::Debug for ReductionHints<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReductionHints")
            .field("num_particles", &self.num_particles)
            .field("sector_locator", &self.sector_locator.is_some())
            .finish()
    }
}

/// Main and auxiliary operators of one problem, mapped in a single call.
#[derive(Debug, Clone)]
pub struct MappedOperators {
    /// The mapped main operator.
    pub main: QubitOperator,
    /// The problem's default auxiliary operators.
    pub defaults: QubitOperatorMap,
    /// Caller auxiliary operators. `None` marks an operator that could not
    /// be projected onto the chosen symmetry sector.
    pub caller: BTreeMap<String, Option<QubitOperator>>,
}

/// Converts second-quantized operators into qubit operators.
pub trait QubitMapper: Send + Sync {
    /// Operator family accepted by this mapper.
    fn family(&self) -> OperatorFamily;

    /// Whether two-qubit reduction is valid on this mapper's output.
    fn allows_two_qubit_reduction(&self) -> bool {
        false
    }

    /// Map one operator whose family has already been checked.
    fn map_single(&self, op: &SecondQuantizedOp) -> MappingResult<QubitOperator>;

    /// Map one operator, rejecting foreign families.
    fn map(&self, op: &SecondQuantizedOp) -> MappingResult<QubitOperator> {
        if op.family() != self.family() {
            return Err(MappingError::TypeMismatch {
                expected: self.family(),
                found: op.family(),
            });
        }
        self.map_single(op)
    }

    /// Map every second-quantized entry; qubit entries pass through.
    ///
    /// All second-quantized entries must share one register length.
    fn map_collection(&self, ops: &OperatorMap) -> MappingResult<QubitOperatorMap> {
        check_register_lengths(ops)?;
        ops.iter()
            .map(|(name, op)| {
                let mapped = match op {
                    AuxOperator::SecondQuantized(op) => self.map(op)?,
                    AuxOperator::Qubit(op) => op.clone(),
                };
                Ok((name.clone(), mapped))
            })
            .collect()
    }

    /// Map the main operator of a problem.
    ///
    /// Plain mappers ignore the hints; reducing mappers use them to fix the
    /// qubit drop and symmetry sector applied to later auxiliary batches.
    fn map_main(
        &self,
        op: &SecondQuantizedOp,
        hints: ReductionHints<'_>,
    ) -> MappingResult<QubitOperator> {
        let _ = hints;
        self.map(op)
    }

    /// Map one caller-supplied auxiliary operator.
    ///
    /// Reducing mappers return `None` when the operator cannot be projected
    /// onto the sector chosen by [`QubitMapper::map_main`].
    fn map_auxiliary(&self, op: &SecondQuantizedOp) -> MappingResult<Option<QubitOperator>> {
        self.map(op).map(Some)
    }

    /// Map a problem's main operator, its default auxiliary operators and
    /// the caller's auxiliary operators.
    ///
    /// Reducing mappers apply the reduction chosen for `main` to every
    /// auxiliary entry of the same call.
    fn map_problem(
        &self,
        main: &SecondQuantizedOp,
        hints: ReductionHints<'_>,
        defaults: &OperatorMap,
        caller: Option<&OperatorMap>,
    ) -> MappingResult<MappedOperators> {
        let main = self.map_main(main, hints)?;
        let defaults = self.map_collection(defaults)?;
        let mut mapped = BTreeMap::new();
        for (name, op) in caller.into_iter().flatten() {
            let op = match op {
                AuxOperator::SecondQuantized(op) => self.map_auxiliary(op)?,
                AuxOperator::Qubit(op) => Some(op.clone()),
            };
            mapped.insert(name.clone(), op);
        }
        Ok(MappedOperators {
            main,
            defaults,
            caller: mapped,
        })
    }
}

pub(crate) fn check_register_lengths(ops: &OperatorMap) -> MappingResult<()> {
    let mut expected: Option<usize> = None;
    for op in ops.values() {
        if let AuxOperator::SecondQuantized(op) = op {
            let found = op.register_length();
            match expected {
                None => expected = Some(found),
                Some(expected) if expected != found => {
                    return Err(MappingError::RegisterLengthMismatch { expected, found });
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

/// Ladder operators of one mode, indexed by [`LadderAction`].
struct ModeLadders {
    create: QubitOperator,
    annihilate: QubitOperator,
    number: QubitOperator,
    empty: QubitOperator,
}

impl ModeLadders {
    fn new(even: &PauliString, odd: &PauliString) -> Self {
        let n = even.num_qubits();
        let half = Complex64::new(0.5, 0.0);
        let half_i = Complex64::new(0.0, 0.5);
        let mut create = QubitOperator::zero(n);
        create.push(even.clone(), half);
        create.push(odd.clone(), -half_i);
        let mut annihilate = QubitOperator::zero(n);
        annihilate.push(even.clone(), half);
        annihilate.push(odd.clone(), half_i);
        let number = create.compose(&annihilate).simplify();
        let empty = annihilate.compose(&create).simplify();
        Self {
            create,
            annihilate,
            number,
            empty,
        }
    }

    fn get(&self, action: LadderAction) -> &QubitOperator {
        match action {
            LadderAction::Create => &self.create,
            LadderAction::Annihilate => &self.annihilate,
            LadderAction::Number => &self.number,
            LadderAction::Empty => &self.empty,
        }
    }
}

/// Apply the shared mode-based rule with a given encoding table.
///
/// The table length fixes the qubit count. Every label is expanded as an
/// ordered product of its factors' ladder operators, scaled by the label's
/// coefficient; the sum is simplified before returning.
pub fn mode_based_mapping(op: &SecondQuantizedOp, table: &PauliTable) -> QubitOperator {
    let num_qubits = table.len();
    let ladders: Vec<ModeLadders> = table
        .iter()
        .map(|(even, odd)| ModeLadders::new(even, odd))
        .collect();

    let terms = op.ladder_terms();
    let mut out = QubitOperator::zero(num_qubits);
    for (label, coeff) in &terms {
        let mut product = QubitOperator::identity(num_qubits);
        for &(action, index) in label {
            product = product.compose(ladders[index].get(action)).simplify();
        }
        out = &out + &product.scale(*coeff);
    }
    let out = out.simplify();
    debug!(
        n_terms_in = terms.len(),
        n_terms_out = out.len(),
        num_qubits,
        "mode-based mapping"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::second_q::FermionicOp;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn cache_builds_once_per_length() {
        let cache = PauliTableCache::new();
        let mut calls = 0;
        let first = cache.get_or_build(3, |n| {
            calls += 1;
            jordan_wigner_table(n)
        });
        let second = cache.get_or_build(3, |_| unreachable!("cached"));
        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let vib = crate::second_q::VibrationalOp::from_labels([("+_0_0", c(1.0))], vec![2])
            .unwrap();
        let result = JordanWignerMapper::new().map(&vib.into());
        assert!(matches!(
            result,
            Err(MappingError::TypeMismatch {
                expected: OperatorFamily::Fermionic,
                found: OperatorFamily::Vibrational
            })
        ));
    }

    #[test]
    fn collection_rejects_mixed_lengths() {
        let mut ops = OperatorMap::new();
        ops.insert(
            "a".into(),
            SecondQuantizedOp::from(FermionicOp::particle_number(2)).into(),
        );
        ops.insert(
            "b".into(),
            SecondQuantizedOp::from(FermionicOp::particle_number(3)).into(),
        );
        let result = JordanWignerMapper::new().map_collection(&ops);
        assert!(matches!(
            result,
            Err(MappingError::RegisterLengthMismatch { expected: 2, found: 3 })
        ));
    }

    #[test]
    fn collection_passes_qubit_entries_through() {
        let pre = QubitOperator::from_labels([("XY", c(0.5))]).unwrap();
        let mut ops = OperatorMap::new();
        ops.insert("pre".into(), pre.clone().into());
        ops.insert(
            "n".into(),
            SecondQuantizedOp::from(FermionicOp::particle_number(2)).into(),
        );
        let mapped = JordanWignerMapper::new().map_collection(&ops).unwrap();
        assert_eq!(mapped["pre"], pre);
        assert_eq!(mapped["n"].num_qubits(), 2);
    }

    #[test]
    fn zero_operator_maps_to_no_terms() {
        let op = SecondQuantizedOp::from(FermionicOp::zero(4));
        let mapped = BravyiKitaevMapper::new().map(&op).unwrap();
        assert!(mapped.is_empty());
        assert_eq!(mapped.num_qubits(), 4);
    }
}
