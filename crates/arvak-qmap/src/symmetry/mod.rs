//! Qubit-count reductions applied on top of a base mapper.

mod converter;
mod two_qubit;
mod z2;

pub use converter::{QubitConverter, Z2Reduction};
pub use two_qubit::TwoQubitReduction;
pub use z2::Z2Symmetries;
