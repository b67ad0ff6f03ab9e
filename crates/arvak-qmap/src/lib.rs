//! `arvak-qmap`: second-quantized operator to qubit operator mapping.
//!
//! Converts fermionic and vibrational operators, written as sparse ladder
//! labels, into weighted sums of Pauli strings using:
//!
//! - **Jordan-Wigner**, **Parity** and **Bravyi-Kitaev** encodings (fermionic)
//! - **Direct** encoding (vibrational, one qubit per modal)
//!
//! and optionally shrinks the register with two-qubit reduction and Z2
//! symmetry tapering through [`QubitConverter`].
//!
//! # Quick start
//!
//! ```rust
//! use arvak_qmap::mapper::{JordanWignerMapper, QubitMapper};
//! use arvak_qmap::second_q::{FermionicOp, SecondQuantizedOp};
//! use num_complex::Complex64;
//!
//! // Hopping between two modes: -(a†_0 a_1 + a†_1 a_0)
//! let hop = FermionicOp::from_labels(
//!     [("+_0 -_1", Complex64::new(-1.0, 0.0)), ("+_1 -_0", Complex64::new(-1.0, 0.0))],
//!     2,
//! )
//! .unwrap();
//!
//! let qubit_op = JordanWignerMapper::new()
//!     .map(&SecondQuantizedOp::from(hop))
//!     .unwrap();
//! // -½ (XX + YY)
//! assert_eq!(qubit_op.num_qubits(), 2);
//! assert_eq!(qubit_op.len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod index_sets;
pub mod mapper;
pub mod pauli;
pub mod qubit_op;
pub mod second_q;
pub mod symmetry;

pub use config::{ConfigError, ConverterConfig, MapperKind};
pub use error::{MappingError, MappingResult};
pub use mapper::{
    AuxOperator, BravyiKitaevMapper, DirectMapper, JordanWignerMapper, MappedOperators,
    OperatorMap, ParityMapper, PauliTable, PauliTableCache, QubitMapper, QubitOperatorMap, ReductionHints, SectorLocator,
};
pub use pauli::{PauliOp, PauliString};
pub use qubit_op::QubitOperator;
pub use second_q::{FermionicOp, LadderAction, OperatorFamily, SecondQuantizedOp, VibrationalOp};
pub use symmetry::{QubitConverter, TwoQubitReduction, Z2Reduction, Z2Symmetries};
