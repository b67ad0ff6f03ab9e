//! Eigenstate pipelines.
//!
//! A pipeline binds a mapper and a solver (or solver factory). Each
//! `solve` call maps the problem's operators, resolves the solver, computes
//! the spectrum and hands it back to the problem for interpretation:
//!
//! ```text
//! OperatorsUnmapped → OperatorsMapped → SolverResolved → Solved → Interpreted
//! ```
//!
//! Any failure aborts the call; nothing is retried.

mod excited_states;
mod ground_state;

pub use excited_states::ExcitedStatesEigensolver;
pub use ground_state::GroundStateEigensolver;

use std::collections::BTreeMap;

use arvak_qmap::{
    MappingResult, OperatorMap, QubitMapper, QubitOperator, QubitOperatorMap, ReductionHints,
    SectorLocator, Z2Symmetries,
};
use tracing::{debug, warn};

use crate::problem::Problem;

/// Merge caller auxiliary operators over the problem defaults.
///
/// A caller entry replaces a default of the same name, with one warning per
/// collision. A caller entry of `None` (an operator that could not be
/// projected onto the chosen symmetry sector) removes the name entirely.
pub fn merge_aux_operators(
    defaults: QubitOperatorMap,
    caller: BTreeMap<String, Option<QubitOperator>>,
) -> QubitOperatorMap {
    let mut merged = defaults;
    for (name, op) in caller {
        if merged.contains_key(&name) {
            warn!(
                key = %name,
                "auxiliary operator overrides the problem's default operator of the same name"
            );
        }
        match op {
            Some(op) => {
                merged.insert(name, op);
            }
            None => {
                merged.remove(&name);
            }
        }
    }
    merged
}

/// Map the main operator and all auxiliary operators of `problem`.
///
/// Everything goes through one [`QubitMapper::map_problem`] call so that a
/// reducing mapper projects the auxiliary operators onto the sector it
/// chose for this problem's main operator.
pub(crate) fn qubit_operators(
    problem: &dyn Problem,
    mapper: &dyn QubitMapper,
    aux_operators: Option<&OperatorMap>,
) -> MappingResult<(QubitOperator, QubitOperatorMap)> {
    let (main_op, default_aux) = problem.second_q_ops();

    let locate = |symmetries: &Z2Symmetries| problem.symmetry_sector_locator(symmetries);
    let locator: &dyn SectorLocator = &locate;
    let hints = ReductionHints {
        num_particles: problem.num_particles(),
        sector_locator: Some(locator),
    };
    let mapped = mapper.map_problem(&main_op, hints, &default_aux, aux_operators)?;

    debug!(
        num_qubits = mapped.main.num_qubits(),
        main_terms = mapped.main.len(),
        default_aux = mapped.defaults.len(),
        caller_aux = mapped.caller.len(),
        "mapped problem operators"
    );
    Ok((mapped.main, merge_aux_operators(mapped.defaults, mapped.caller)))
}
