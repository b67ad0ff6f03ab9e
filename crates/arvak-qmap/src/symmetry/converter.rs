//! Symmetry-reducing decorator around a base mapper.
//!
//! [`QubitConverter`] maps with its inner mapper and then optionally
//! applies two-qubit reduction and Z2 tapering. The reductions chosen while
//! converting a problem's main operator are remembered so that later
//! auxiliary operators are reduced consistently.
//!
//! The remembered reductions are shared by every caller of one converter.
//! To map several problems concurrently through one converter, use
//! [`QubitMapper::map_problem`], which reduces a problem's auxiliary
//! operators with the sector chosen in the same call.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{TwoQubitReduction, Z2Symmetries};
use crate::error::{MappingError, MappingResult};
use crate::mapper::{
    AuxOperator, MappedOperators, OperatorMap, QubitMapper, QubitOperatorMap, ReductionHints,
    SectorLocator, check_register_lengths,
};
use crate::qubit_op::QubitOperator;
use crate::second_q::{OperatorFamily, SecondQuantizedOp};

/// How Z2 symmetries are used.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Z2Reduction {
    /// No tapering.
    #[default]
    None,
    /// Detect symmetries and ask a sector locator for the sector.
    Auto,
    /// Detect symmetries and taper onto this fixed sector.
    Sector(Vec<i8>),
}

#[derive(Debug, Clone, Default)]
struct ReductionState {
    num_particles: Option<(usize, usize)>,
    z2symmetries: Z2Symmetries,
}

/// A mapper that reduces the qubit count of its inner mapper's output.
pub struct QubitConverter {
    mapper: Arc<dyn QubitMapper>,
    two_qubit_reduction: bool,
    z2symmetry_reduction: Z2Reduction,
    state: RwLock<ReductionState>,
}

impl std::fmt::Debug for QubitConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QubitConverter")
            .field("family", &self.mapper.family())
            .field("two_qubit_reduction", &self.two_qubit_reduction)
            .field("z2symmetry_reduction", &self.z2symmetry_reduction)
            .finish_non_exhaustive()
    }
}

impl QubitConverter {
    /// Wrap `mapper` with both reductions disabled.
    pub fn new(mapper: Arc<dyn QubitMapper>) -> Self {
        Self {
            mapper,
            two_qubit_reduction: false,
            z2symmetry_reduction: Z2Reduction::None,
            state: RwLock::new(ReductionState::default()),
        }
    }

    /// Enable or disable two-qubit reduction.
    #[must_use]
    pub fn with_two_qubit_reduction(mut self, enabled: bool) -> Self {
        self.two_qubit_reduction = enabled;
        self
    }

    /// Select the Z2 reduction mode.
    #[must_use]
    pub fn with_z2symmetry_reduction(mut self, reduction: Z2Reduction) -> Self {
        self.z2symmetry_reduction = reduction;
        self
    }

    /// The wrapped mapper.
    pub fn mapper(&self) -> &Arc<dyn QubitMapper> {
        &self.mapper
    }

    /// Whether two-qubit reduction was requested.
    pub fn two_qubit_reduction(&self) -> bool {
        self.two_qubit_reduction
    }

    /// Requested Z2 reduction.
    pub fn z2symmetry_reduction(&self) -> &Z2Reduction {
        &self.z2symmetry_reduction
    }

    /// Particle numbers recorded by the last [`convert`](Self::convert).
    pub fn num_particles(&self) -> Option<(usize, usize)> {
        self.read_state().num_particles
    }

    /// Symmetries (and sector) recorded by the last [`convert`](Self::convert).
    pub fn z2symmetries(&self) -> Z2Symmetries {
        self.read_state().z2symmetries.clone()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, ReductionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Map the main operator, choose the reductions and remember them.
    pub fn convert(
        &self,
        op: &SecondQuantizedOp,
        num_particles: Option<(usize, usize)>,
        sector_locator: Option<&dyn SectorLocator>,
    ) -> MappingResult<QubitOperator> {
        let (tapered, state) = self.reduce_main(op, num_particles, sector_locator)?;
        self.record(state);
        Ok(tapered)
    }

    fn reduce_main(
        &self,
        op: &SecondQuantizedOp,
        num_particles: Option<(usize, usize)>,
        sector_locator: Option<&dyn SectorLocator>,
    ) -> MappingResult<(QubitOperator, ReductionState)> {
        let mapped = self.mapper.map(op)?;
        let reduced = self.two_qubit_reduce(&mapped, num_particles)?;
        let (tapered, z2symmetries) = self.find_and_taper(&reduced, sector_locator)?;
        debug!(
            qubits_mapped = mapped.num_qubits(),
            qubits_reduced = tapered.num_qubits(),
            "converted main operator"
        );
        let state = ReductionState {
            num_particles,
            z2symmetries,
        };
        Ok((tapered, state))
    }

    fn record(&self, state: ReductionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Map `op` and apply the reductions chosen by the last `convert`.
    ///
    /// If `op` does not commute with the recorded symmetries the result is
    /// `None` when `suppress_none` is set, and an error otherwise.
    pub fn convert_match(
        &self,
        op: &SecondQuantizedOp,
        suppress_none: bool,
    ) -> MappingResult<Option<QubitOperator>> {
        self.convert_match_named("operator", op, suppress_none)
    }

    /// [`convert_match`](Self::convert_match) over a named batch; qubit
    /// entries are passed through unchanged.
    pub fn convert_match_collection(
        &self,
        ops: &OperatorMap,
        suppress_none: bool,
    ) -> MappingResult<BTreeMap<String, Option<QubitOperator>>> {
        let state = self.read_state().clone();
        self.match_collection(&state, ops, suppress_none)
    }

    fn match_collection(
        &self,
        state: &ReductionState,
        ops: &OperatorMap,
        suppress_none: bool,
    ) -> MappingResult<BTreeMap<String, Option<QubitOperator>>> {
        check_register_lengths(ops)?;
        ops.iter()
            .map(|(name, op)| {
                let converted = match op {
                    AuxOperator::SecondQuantized(op) => {
                        self.match_named(state, name, op, suppress_none)?
                    }
                    AuxOperator::Qubit(op) => Some(op.clone()),
                };
                Ok((name.clone(), converted))
            })
            .collect()
    }

    fn convert_match_named(
        &self,
        name: &str,
        op: &SecondQuantizedOp,
        suppress_none: bool,
    ) -> MappingResult<Option<QubitOperator>> {
        let state = self.read_state().clone();
        self.match_named(&state, name, op, suppress_none)
    }

    fn match_named(
        &self,
        state: &ReductionState,
        name: &str,
        op: &SecondQuantizedOp,
        suppress_none: bool,
    ) -> MappingResult<Option<QubitOperator>> {
        let mapped = self.mapper.map(op)?;
        let reduced = self.two_qubit_reduce(&mapped, state.num_particles)?;
        match state.z2symmetries.taper(&reduced)? {
            Some(tapered) => Ok(Some(tapered)),
            None if suppress_none => {
                debug!(operator = name, "operator does not commute with the Z2 symmetries");
                Ok(None)
            }
            None => Err(MappingError::SectorAssignment {
                name: name.to_string(),
            }),
        }
    }

    fn two_qubit_reduce(
        &self,
        op: &QubitOperator,
        num_particles: Option<(usize, usize)>,
    ) -> MappingResult<QubitOperator> {
        if !self.two_qubit_reduction {
            return Ok(op.clone());
        }
        if !self.mapper.allows_two_qubit_reduction() {
            debug!("mapper does not allow two-qubit reduction, skipping");
            return Ok(op.clone());
        }
        if op.num_qubits() < 2 || op.num_qubits() % 2 != 0 {
            debug!(num_qubits = op.num_qubits(), "odd register, skipping two-qubit reduction");
            return Ok(op.clone());
        }
        match num_particles {
            Some(num_particles) => TwoQubitReduction::new(num_particles).reduce(op),
            None => {
                debug!("particle numbers unknown, skipping two-qubit reduction");
                Ok(op.clone())
            }
        }
    }

    fn check_family(&self, op: &SecondQuantizedOp) -> MappingResult<()> {
        if op.family() != self.family() {
            return Err(MappingError::TypeMismatch {
                expected: self.family(),
                found: op.family(),
            });
        }
        Ok(())
    }

    fn find_and_taper(
        &self,
        op: &QubitOperator,
        sector_locator: Option<&dyn SectorLocator>,
    ) -> MappingResult<(QubitOperator, Z2Symmetries)> {
        let values = match &self.z2symmetry_reduction {
            Z2Reduction::None => return Ok((op.clone(), Z2Symmetries::default())),
            Z2Reduction::Auto => None,
            Z2Reduction::Sector(values) => Some(values.clone()),
        };
        let detected = Z2Symmetries::find(op);
        if detected.is_empty() {
            return match values {
                Some(values) if !values.is_empty() => Err(MappingError::InvalidSector {
                    expected: 0,
                    found: values,
                }),
                _ => Ok((op.clone(), detected)),
            };
        }
        let values = match values {
            Some(values) => values,
            None => sector_locator
                .and_then(|locator| locator.locate(&detected))
                .ok_or_else(|| {
                    MappingError::SectorResolution(format!(
                        "no sector for {} detected symmetries",
                        detected.len()
                    ))
                })?,
        };
        let symmetries = detected.with_tapering_values(values)?;
        let tapered = symmetries
            .taper(op)?
            .ok_or_else(|| MappingError::SectorAssignment {
                name: "main operator".into(),
            })?;
        Ok((tapered, symmetries))
    }
}

impl QubitMapper for QubitConverter {
    fn family(&self) -> OperatorFamily {
        self.mapper.family()
    }

    fn allows_two_qubit_reduction(&self) -> bool {
        self.mapper.allows_two_qubit_reduction()
    }

    fn map_single(&self, op: &SecondQuantizedOp) -> MappingResult<QubitOperator> {
        self.convert_match(op, false)?
            .ok_or_else(|| MappingError::SectorAssignment {
                name: "operator".into(),
            })
    }

    /// Entries that cannot be projected onto the recorded sector are dropped.
    fn map_collection(&self, ops: &OperatorMap) -> MappingResult<QubitOperatorMap> {
        Ok(self
            .convert_match_collection(ops, true)?
            .into_iter()
            .filter_map(|(name, op)| op.map(|op| (name, op)))
            .collect())
    }

    fn map_main(
        &self,
        op: &SecondQuantizedOp,
        hints: ReductionHints<'_>,
    ) -> MappingResult<QubitOperator> {
        self.check_family(op)?;
        self.convert(op, hints.num_particles, hints.sector_locator)
    }

    fn map_auxiliary(&self, op: &SecondQuantizedOp) -> MappingResult<Option<QubitOperator>> {
        self.convert_match(op, true)
    }

    /// Auxiliary entries are reduced with the sector chosen for `main` in
    /// this call, whatever other callers record in the meantime.
    fn map_problem(
        &self,
        main: &SecondQuantizedOp,
        hints: ReductionHints<'_>,
        defaults: &OperatorMap,
        caller: Option<&OperatorMap>,
    ) -> MappingResult<MappedOperators> {
        self.check_family(main)?;
        let (main, state) = self.reduce_main(main, hints.num_particles, hints.sector_locator)?;
        let defaults = self
            .match_collection(&state, defaults, true)?
            .into_iter()
            .filter_map(|(name, op)| op.map(|op| (name, op)))
            .collect();
        let mut mapped = BTreeMap::new();
        for (name, op) in caller.into_iter().flatten() {
            let op = match op {
                AuxOperator::SecondQuantized(op) => self.match_named(&state, name, op, true)?,
                AuxOperator::Qubit(op) => Some(op.clone()),
            };
            mapped.insert(name.clone(), op);
        }
        self.record(state);
        Ok(MappedOperators {
            main,
            defaults,
            caller: mapped,
        })
    }
}
