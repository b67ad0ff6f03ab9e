//! Ground-state pipeline.

use std::sync::Arc;

use arvak_qmap::{OperatorMap, QubitMapper, QubitOperator, QubitOperatorMap};
use tracing::{debug, instrument};

use super::qubit_operators;
use crate::error::{SolveError, SolveResult, SolverResult};
use crate::problem::Problem;
use crate::result::EigenstateResult;
use crate::solver::{
    BoundSolver, MinimumEigensolver, MinimumEigensolverFactory, MinimumSolverBinding,
    SolverBinding,
};

/// Finds the ground state of a problem with a minimum eigensolver.
pub struct GroundStateEigensolver {
    mapper: Arc<dyn QubitMapper>,
    solver: BoundSolver<dyn MinimumEigensolver, dyn MinimumEigensolverFactory>,
}

impl std::fmt::Debug for GroundStateEigensolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroundStateEigensolver")
            .field("family", &self.mapper.family())
            .field("solver", &self.solver.snapshot())
            .finish()
    }
}

impl GroundStateEigensolver {
    /// Pipeline with a ready solver.
    pub fn new(mapper: Arc<dyn QubitMapper>, solver: Arc<dyn MinimumEigensolver>) -> Self {
        Self::from_binding(mapper, SolverBinding::Ready(solver))
    }

    /// Pipeline whose solver is built by `factory` on the first solve.
    pub fn with_factory(
        mapper: Arc<dyn QubitMapper>,
        factory: Arc<dyn MinimumEigensolverFactory>,
    ) -> Self {
        Self::from_binding(mapper, SolverBinding::Factory(factory))
    }

    pub fn from_binding(mapper: Arc<dyn QubitMapper>, binding: MinimumSolverBinding) -> Self {
        Self {
            mapper,
            solver: BoundSolver::new(binding),
        }
    }

    pub fn mapper(&self) -> &Arc<dyn QubitMapper> {
        &self.mapper
    }

    /// Current binding; `Ready` once a factory has been resolved.
    pub fn binding(&self) -> MinimumSolverBinding {
        self.solver.snapshot()
    }

    pub fn is_resolved(&self) -> bool {
        self.solver.is_resolved()
    }

    /// Resolve the binding to a concrete solver.
    ///
    /// The factory, if any, is called at most once per pipeline; later calls
    /// return the cached solver.
    pub fn resolve(&self, problem: &dyn Problem) -> SolverResult<Arc<dyn MinimumEigensolver>> {
        self.solver.resolve_with(|factory| {
            debug!(family = %self.mapper.family(), "resolving minimum eigensolver from factory");
            factory.get_solver(problem, self.mapper.as_ref())
        })
    }

    /// Whether the bound solver (or the solvers its factory builds) evaluates
    /// auxiliary operators.
    pub fn supports_aux_operators(&self) -> bool {
        match self.solver.snapshot() {
            SolverBinding::Ready(solver) => solver.supports_aux_operators(),
            SolverBinding::Factory(factory) => factory.supports_aux_operators(),
        }
    }

    /// Map the problem's operators and resolve the solver.
    ///
    /// The auxiliary operators are the merged set the solver will receive,
    /// or `None` when the resolved solver does not evaluate them.
    pub fn get_qubit_operators(
        &self,
        problem: &dyn Problem,
        aux_operators: Option<&OperatorMap>,
    ) -> SolveResult<(QubitOperator, Option<QubitOperatorMap>)> {
        let (main_operator, aux, _) = self.prepare(problem, aux_operators)?;
        Ok((main_operator, aux))
    }

    fn prepare(
        &self,
        problem: &dyn Problem,
        aux_operators: Option<&OperatorMap>,
    ) -> SolveResult<(QubitOperator, Option<QubitOperatorMap>, Arc<dyn MinimumEigensolver>)> {
        let (main_operator, aux) = qubit_operators(problem, self.mapper.as_ref(), aux_operators)?;
        let solver = self.resolve(problem).map_err(SolveError::Resolution)?;
        let aux = if solver.supports_aux_operators() {
            Some(aux)
        } else {
            debug!(
                discarded = aux.len(),
                "solver does not support auxiliary operators"
            );
            None
        };
        Ok((main_operator, aux, solver))
    }

    /// Compute and interpret the ground state of `problem`.
    ///
    /// `aux_operators` are evaluated in the ground state alongside the
    /// problem's defaults, replacing defaults of the same name. If the solver
    /// does not support auxiliary operators none are passed to it.
    #[instrument(skip_all)]
    pub async fn solve(
        &self,
        problem: &dyn Problem,
        aux_operators: Option<&OperatorMap>,
    ) -> SolveResult<EigenstateResult> {
        let (main_operator, aux, solver) = self.prepare(problem, aux_operators)?;
        let raw = solver
            .compute_minimum_eigenvalue(&main_operator, aux.as_ref())
            .await
            .map_err(SolveError::Solver)?;
        debug!(eigenvalue = raw.eigenvalue, "minimum eigenvalue computed");

        problem
            .interpret(EigenstateResult::from_minimum(raw))
            .map_err(SolveError::Interpretation)
    }
}
