//! Solver and factory capabilities, and the binding that resolves one into the other.

use std::sync::{Arc, Mutex, PoisonError};

use arvak_qmap::{QubitMapper, QubitOperator, QubitOperatorMap};
use async_trait::async_trait;

use crate::error::SolverResult;
use crate::problem::Problem;
use crate::result::{EigensolverResult, MinimumEigensolverResult};

/// Computes the lowest eigenvalue of a qubit operator.
#[async_trait]
pub trait MinimumEigensolver: Send + Sync {
    /// Whether auxiliary operators are evaluated alongside the eigenvalue.
    fn supports_aux_operators(&self) -> bool;

    /// Compute the lowest eigenvalue, evaluating `aux_operators` in its eigenstate.
    async fn compute_minimum_eigenvalue(
        &self,
        operator: &QubitOperator,
        aux_operators: Option<&QubitOperatorMap>,
    ) -> SolverResult<MinimumEigensolverResult>;
}

/// Computes several eigenvalues of a qubit operator, lowest first.
#[async_trait]
pub trait Eigensolver: Send + Sync {
    /// Whether auxiliary operators are evaluated alongside the eigenvalues.
    fn supports_aux_operators(&self) -> bool;

    /// Compute the lowest eigenvalues, evaluating `aux_operators` in each eigenstate.
    async fn compute_eigenvalues(
        &self,
        operator: &QubitOperator,
        aux_operators: Option<&QubitOperatorMap>,
    ) -> SolverResult<EigensolverResult>;
}

/// Builds a [`MinimumEigensolver`] once the problem and mapper are known.
pub trait MinimumEigensolverFactory: Send + Sync {
    /// Whether solvers built by this factory support auxiliary operators.
    fn supports_aux_operators(&self) -> bool;

    /// Build a solver for `problem` under `mapper`.
    fn get_solver(
        &self,
        problem: &dyn Problem,
        mapper: &dyn QubitMapper,
    ) -> SolverResult<Arc<dyn MinimumEigensolver>>;
}

/// Builds an [`Eigensolver`] once the problem is known.
pub trait EigensolverFactory: Send + Sync {
    /// Whether solvers built by this factory support auxiliary operators.
    fn supports_aux_operators(&self) -> bool;

    /// Build a solver for `problem`.
    fn get_solver(&self, problem: &dyn Problem) -> SolverResult<Arc<dyn Eigensolver>>;
}

/// A solver that is either ready to use or still to be built by a factory.
pub enum SolverBinding<S: ?Sized, F: ?Sized> {
    /// Concrete solver.
    Ready(Arc<S>),
    /// Factory called on first resolution.
    Factory(Arc<F>),
}

impl<S: ?Sized, F: ?Sized> Clone for SolverBinding<S, F> {
    fn clone(&self) -> Self {
        match self {
            SolverBinding::Ready(solver) => SolverBinding::Ready(Arc::clone(solver)),
            SolverBinding::Factory(factory) => SolverBinding::Factory(Arc::clone(factory)),
        }
    }
}

impl<S: ?Sized, F: ?Sized> std::fmt::Debug for SolverBinding<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverBinding::Ready(_) => f.write_str("SolverBinding::Ready"),
            SolverBinding::Factory(_) => f.write_str("SolverBinding::Factory"),
        }
    }
}

/// Binding for the ground-state pipeline.
pub type MinimumSolverBinding = SolverBinding<dyn MinimumEigensolver, dyn MinimumEigensolverFactory>;

/// Binding for the excited-states pipeline.
pub type ExcitedSolverBinding = SolverBinding<dyn Eigensolver, dyn EigensolverFactory>;

/// A binding that turns into a ready solver at most once.
///
/// The factory call happens under the lock, so concurrent resolvers all
/// observe the single solver it produced.
pub(crate) struct BoundSolver<S: ?Sized, F: ?Sized> {
    binding: Mutex<SolverBinding<S, F>>,
}

impl<S: ?Sized, F: ?Sized> BoundSolver<S, F> {
    pub(crate) fn new(binding: SolverBinding<S, F>) -> Self {
        Self {
            binding: Mutex::new(binding),
        }
    }

    pub(crate) fn snapshot(&self) -> SolverBinding<S, F> {
        self.binding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn is_resolved(&self) -> bool {
        matches!(self.snapshot(), SolverBinding::Ready(_))
    }

    /// Return the ready solver, calling `build` on the factory if needed.
    ///
    /// A failed build leaves the factory in place.
    pub(crate) fn resolve_with(
        &self,
        build: impl FnOnce(&F) -> SolverResult<Arc<S>>,
    ) -> SolverResult<Arc<S>> {
        let mut binding = self.binding.lock().unwrap_or_else(PoisonError::into_inner);
        let factory = match &*binding {
            SolverBinding::Ready(solver) => return Ok(Arc::clone(solver)),
            SolverBinding::Factory(factory) => Arc::clone(factory),
        };
        let solver = build(&factory)?;
        *binding = SolverBinding::Ready(Arc::clone(&solver));
        Ok(solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    struct Fixed(&'static str);

    impl Named for Fixed {
        fn name(&self) -> &str {
            self.0
        }
    }

    struct Maker {
        calls: AtomicUsize,
    }

    fn bound() -> (Arc<Maker>, BoundSolver<dyn Named, Maker>) {
        let maker = Arc::new(Maker {
            calls: AtomicUsize::new(0),
        });
        let bound = BoundSolver::new(SolverBinding::Factory(Arc::clone(&maker)));
        (maker, bound)
    }

    fn build(maker: &Maker) -> SolverResult<Arc<dyn Named>> {
        maker.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Fixed("built")))
    }

    #[test]
    fn test_resolves_once() {
        let (maker, bound) = bound();
        assert!(!bound.is_resolved());
        let first = bound.resolve_with(build).unwrap();
        let second = bound.resolve_with(build).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(maker.calls.load(Ordering::SeqCst), 1);
        assert!(bound.is_resolved());
    }

    #[test]
    fn test_resolves_once_across_threads() {
        let (maker, bound) = bound();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| bound.resolve_with(build).unwrap());
            }
        });
        assert_eq!(maker.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_build_keeps_factory() {
        let (maker, bound) = bound();
        let result = bound.resolve_with(|_| Err(SolverError::Backend("offline".into())));
        assert!(result.is_err());
        assert!(!bound.is_resolved());
        assert_eq!(bound.resolve_with(build).unwrap().name(), "built");
        assert_eq!(maker.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ready_binding_skips_factory() {
        let bound: BoundSolver<dyn Named, Maker> =
            BoundSolver::new(SolverBinding::Ready(Arc::new(Fixed("ready"))));
        let solver = bound
            .resolve_with(|_| unreachable!("already resolved"))
            .unwrap();
        assert_eq!(solver.name(), "ready");
    }
}
