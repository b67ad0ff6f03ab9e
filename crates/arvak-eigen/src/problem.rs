//! The problem capability consumed by the pipelines.

use arvak_qmap::{OperatorMap, SecondQuantizedOp, Z2Symmetries};

use crate::error::BoxError;
use crate::exact::FilterCriterion;
use crate::result::EigenstateResult;

/// A physical problem that can be solved for its eigenstates.
///
/// Only [`second_q_ops`](Problem::second_q_ops) and
/// [`interpret`](Problem::interpret) are required; the remaining methods
/// feed the optional symmetry reductions and default solver filters.
pub trait Problem: Send + Sync {
    /// Main operator and the problem's default auxiliary operators.
    fn second_q_ops(&self) -> (SecondQuantizedOp, OperatorMap);

    /// `(N_alpha, N_beta)` if the particle numbers are known.
    fn num_particles(&self) -> Option<(usize, usize)> {
        None
    }

    /// Pick the physically relevant sector of the detected Z2 symmetries.
    fn symmetry_sector_locator(&self, symmetries: &Z2Symmetries) -> Option<Vec<i8>> {
        let _ = symmetries;
        None
    }

    /// Filter used by factories configured to take the problem's default.
    fn default_filter_criterion(&self) -> Option<FilterCriterion> {
        None
    }

    /// Turn a raw spectrum into the problem's result.
    fn interpret(&self, raw: EigenstateResult) -> Result<EigenstateResult, BoxError>;
}
