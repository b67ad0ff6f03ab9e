//! Error types for the qmap crate.

use thiserror::Error;

use crate::second_q::OperatorFamily;

/// Errors produced while building or mapping operators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MappingError {
    /// The operator belongs to a family the mapper does not accept.
    #[error("mapper accepts {expected} operators, got a {found} operator")]
    TypeMismatch {
        /// Family accepted by the mapper.
        expected: OperatorFamily,
        /// Family of the offending operator.
        found: OperatorFamily,
    },

    /// Operators in one batch disagree on their register length.
    #[error("register length mismatch: expected {expected}, got {found}")]
    RegisterLengthMismatch {
        /// Register length established by the first operator.
        expected: usize,
        /// Register length of the offending operator.
        found: usize,
    },

    /// A reduction cannot be applied to a register of this length.
    #[error("register of {num_qubits} qubits is not supported: {reason}")]
    UnsupportedRegister {
        /// Register length of the operator.
        num_qubits: usize,
        /// What the reduction requires.
        reason: &'static str,
    },

    /// A sparse operator label could not be parsed.
    #[error("invalid operator label '{label}': {reason}")]
    InvalidLabel {
        /// The label as given.
        label: String,
        /// What went wrong.
        reason: String,
    },

    /// A label references a mode or qubit outside the register.
    #[error("index {index} out of range for register of length {register_length}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Register length of the operator.
        register_length: usize,
    },

    /// No symmetry sector could be determined for Z2 tapering.
    #[error("symmetry sector could not be resolved: {0}")]
    SectorResolution(String),

    /// An operator does not commute with the detected Z2 symmetries.
    #[error("operator '{name}' does not commute with the detected Z2 symmetries")]
    SectorAssignment {
        /// Name of the operator that could not be projected.
        name: String,
    },

    /// A sector does not match the detected symmetries.
    #[error("invalid symmetry sector: expected {expected} entries of ±1, got {found:?}")]
    InvalidSector {
        /// Number of detected symmetry generators.
        expected: usize,
        /// The rejected sector.
        found: Vec<i8>,
    },
}

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;
