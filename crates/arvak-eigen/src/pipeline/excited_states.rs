//! Excited-states pipeline.

use std::sync::Arc;

use arvak_qmap::{OperatorMap, QubitMapper, QubitOperator, QubitOperatorMap};
use tracing::{debug, instrument};

use super::qubit_operators;
use crate::error::{SolveError, SolveResult, SolverResult};
use crate::problem::Problem;
use crate::result::EigenstateResult;
use crate::solver::{
    BoundSolver, Eigensolver, EigensolverFactory, ExcitedSolverBinding, SolverBinding,
};

/// Finds the ground and excited states of a problem with an eigensolver.
pub struct ExcitedStatesEigensolver {
    mapper: Arc<dyn QubitMapper>,
    solver: BoundSolver<dyn Eigensolver, dyn EigensolverFactory>,
}

impl std::fmt::Debug for ExcitedStatesEigensolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExcitedStatesEigensolver")
            .field("family", &self.mapper.family())
            .field("solver", &self.solver.snapshot())
            .finish()
    }
}

impl ExcitedStatesEigensolver {
    pub fn new(mapper: Arc<dyn QubitMapper>, solver: Arc<dyn Eigensolver>) -> Self {
        Self::from_binding(mapper, SolverBinding::Ready(solver))
    }

    /// Pipeline whose solver is built by `factory` on the first solve.
    ///
    /// Unlike the ground-state factory, this one only sees the problem.
    pub fn with_factory(mapper: Arc<dyn QubitMapper>, factory: Arc<dyn EigensolverFactory>) -> Self {
        Self::from_binding(mapper, SolverBinding::Factory(factory))
    }

    pub fn from_binding(mapper: Arc<dyn QubitMapper>, binding: ExcitedSolverBinding) -> Self {
        Self {
            mapper,
            solver: BoundSolver::new(binding),
        }
    }

    pub fn mapper(&self) -> &Arc<dyn QubitMapper> {
        &self.mapper
    }

    pub fn binding(&self) -> ExcitedSolverBinding {
        self.solver.snapshot()
    }

    pub fn is_resolved(&self) -> bool {
        self.solver.is_resolved()
    }

    /// Resolve the binding to a concrete solver, calling the factory at most once.
    pub fn resolve(&self, problem: &dyn Problem) -> SolverResult<Arc<dyn Eigensolver>> {
        self.solver.resolve_with(|factory| {
            debug!("resolving eigensolver from factory");
            factory.get_solver(problem)
        })
    }

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
    ) -> SolveResult<(QubitOperator, Option<QubitOperatorMap>, Arc<dyn Eigensolver>)> {
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

    /// Compute and interpret the lowest eigenstates of `problem`.
    #[instrument(skip_all)]
    pub async fn solve(
        &self,
        problem: &dyn Problem,
        aux_operators: Option<&OperatorMap>,
    ) -> SolveResult<EigenstateResult> {
        let (main_operator, aux, solver) = self.prepare(problem, aux_operators)?;
        let raw = solver
            .compute_eigenvalues(&main_operator, aux.as_ref())
            .await
            .map_err(SolveError::Solver)?;
        debug!(num_states = raw.eigenvalues.len(), "eigenvalues computed");

        problem
            .interpret(EigenstateResult::from_eigensolver(raw))
            .map_err(SolveError::Interpretation)
    }
}
