//! `arvak-eigen`: ground-state and excited-state eigensolver pipelines.
//!
//! A pipeline takes a [`Problem`] that describes itself with second-quantized
//! operators, maps them to qubit operators with an
//! [`arvak_qmap::QubitMapper`], hands them to an eigensolver and lets the
//! problem interpret the spectrum.
//!
//! # Features
//!
//! - **Two pipelines**: [`GroundStateEigensolver`] (minimum eigensolver) and
//!   [`ExcitedStatesEigensolver`] (lowest `k` eigenstates)
//! - **Lazy solvers**: bind a ready solver or a factory that is resolved
//!   once, on the first solve
//! - **Auxiliary operators**: problem defaults merged with caller operators
//!   and evaluated in every returned eigenstate
//! - **Exact reference solvers**: dense diagonalization for small registers
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use arvak_eigen::{
//!     BoxError, EigenstateResult, ExactMinimumEigensolverFactory, GroundStateEigensolver, Problem,
//! };
//! use arvak_qmap::{FermionicOp, JordanWignerMapper, OperatorMap, SecondQuantizedOp};
//! use num_complex::Complex64;
//!
//! /// A single particle hopping between two modes.
//! struct Hopping;
//!
//! impl Problem for Hopping {
//!     fn second_q_ops(&self) -> (SecondQuantizedOp, OperatorMap) {
//!         let t = Complex64::new(-1.0, 0.0);
//!         let hop = FermionicOp::from_labels([("+_0 -_1", t), ("+_1 -_0", t)], 2)
//!             .expect("valid labels");
//!         (hop.into(), OperatorMap::new())
//!     }
//!
//!     fn interpret(&self, raw: EigenstateResult) -> Result<EigenstateResult, BoxError> {
//!         Ok(raw)
//!     }
//! }
//!
//! let pipeline = GroundStateEigensolver::with_factory(
//!     Arc::new(JordanWignerMapper::new()),
//!     Arc::new(ExactMinimumEigensolverFactory::new()),
//! );
//! let runtime = tokio::runtime::Runtime::new()?;
//! let result = runtime.block_on(pipeline.solve(&Hopping, None))?;
//! assert!((result.groundenergy().unwrap() + 1.0).abs() < 1e-10);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod exact;
mod linalg;
pub mod pipeline;
pub mod problem;
pub mod result;
pub mod solver;

pub use error::{BoxError, SolveError, SolveResult, SolverError, SolverResult};
pub use exact::{
    ExactEigensolver, ExactEigensolverFactory, ExactMinimumEigensolver,
    ExactMinimumEigensolverFactory, ExactSolverConfig, FilterCriterion,
};
pub use pipeline::{ExcitedStatesEigensolver, GroundStateEigensolver, merge_aux_operators};
pub use problem::Problem;
pub use result::{AuxValues, EigenstateResult, EigensolverResult, MinimumEigensolverResult};
pub use solver::{
    Eigensolver, EigensolverFactory, ExcitedSolverBinding, MinimumEigensolver,
    MinimumEigensolverFactory, MinimumSolverBinding, SolverBinding,
};
