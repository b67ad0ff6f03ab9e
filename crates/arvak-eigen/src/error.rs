//! Error types for the eigensolver pipelines.

use arvak_qmap::MappingError;
use thiserror::Error;

/// Boxed error returned by problem collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by eigensolvers and their factories.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SolverError {
    /// The operator has a significant anti-Hermitian part.
    #[error("Operator is not Hermitian (deviation {deviation:e})")]
    NotHermitian { deviation: f64 },

    /// The operator is too large for dense diagonalization.
    #[error("Operator acts on {num_qubits} qubits but the solver supports at most {max_qubits}")]
    TooLarge { num_qubits: usize, max_qubits: usize },

    /// Requested number of eigenstates is invalid.
    #[error("Invalid number of eigenstates: {0}")]
    InvalidK(usize),

    /// An auxiliary operator does not act on the main operator's register.
    #[error("Auxiliary operator '{name}' acts on {found} qubits, expected {expected}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// The filter criterion rejected every eigenstate.
    #[error("No eigenstate satisfies the filter criterion")]
    NoEigenstateMatched,

    /// Any other solver-side failure.
    #[error("Solver backend error: {0}")]
    Backend(String),
}

/// Result type for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;

/// Errors surfaced by a pipeline `solve`, tagged with the failing stage.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SolveError {
    /// Mapping the main or auxiliary operators failed.
    #[error("Mapping stage failed: {0}")]
    Mapping(#[from] MappingError),

    /// The solver factory could not build a solver.
    #[error("Solver resolution failed: {0}")]
    Resolution(#[source] SolverError),

    /// Eigenvalue computation failed.
    #[error("Solver stage failed: {0}")]
    Solver(#[source] SolverError),

    /// The problem could not interpret the raw spectrum.
    #[error("Interpretation stage failed: {0}")]
    Interpretation(#[source] BoxError),
}

impl SolveError {
    /// Name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            SolveError::Mapping(_) => "mapping",
            SolveError::Resolution(_) => "resolution",
            SolveError::Solver(_) => "solving",
            SolveError::Interpretation(_) => "interpretation",
        }
    }
}

/// Result type for pipeline operations.
pub type SolveResult<T> = Result<T, SolveError>;
