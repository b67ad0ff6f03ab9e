//! Symplectic Pauli strings.
//!
//! A Pauli string on `n` qubits is stored as two bit vectors `(x, z)` plus a
//! phase exponent `k`:
//!
//!   P = i^k · σ_0 ⊗ σ_1 ⊗ … ⊗ σ_{n-1}
//!
//! where each single-qubit factor is chosen from its bits:
//! `(0,0) → I`, `(1,0) → X`, `(1,1) → Y`, `(0,1) → Z`.
//!
//! # Example
//!
//! ```rust
//! use arvak_qmap::pauli::{PauliOp, PauliString};
//!
//! let x = PauliString::single(1, 0, PauliOp::X);
//! let y = PauliString::single(1, 0, PauliOp::Y);
//! // X·Y = iZ
//! let xy = x.compose(&y);
//! assert_eq!(xy.op(0), PauliOp::Z);
//! assert_eq!(xy.phase(), 1);
//! ```

use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, MappingResult};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauliOp {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl PauliOp {
    /// Decode from symplectic bits.
    pub fn from_bits(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => PauliOp::I,
            (true, false) => PauliOp::X,
            (true, true) => PauliOp::Y,
            (false, true) => PauliOp::Z,
        }
    }

    /// Symplectic `(x, z)` bits.
    pub fn bits(self) -> (bool, bool) {
        match self {
            PauliOp::I => (false, false),
            PauliOp::X => (true, false),
            PauliOp::Y => (true, true),
            PauliOp::Z => (false, true),
        }
    }

    /// Label character.
    pub fn symbol(self) -> char {
        match self {
            PauliOp::I => 'I',
            PauliOp::X => 'X',
            PauliOp::Y => 'Y',
            PauliOp::Z => 'Z',
        }
    }
}

/// A tensor product of Pauli operators over a fixed-length register,
/// with a global phase `i^phase`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PauliString {
    x: Vec<bool>,
    z: Vec<bool>,
    /// Exponent of `i`, always in `0..4`.
    phase: u8,
}

impl PauliString {
    /// The identity on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            x: vec![false; num_qubits],
            z: vec![false; num_qubits],
            phase: 0,
        }
    }

    /// Construct from symplectic bit vectors with zero phase.
    ///
    /// # Panics
    ///
    /// Panics if `x` and `z` differ in length.
    pub fn from_bits(x: Vec<bool>, z: Vec<bool>) -> Self {
        assert_eq!(x.len(), z.len(), "x and z parts must have equal length");
        Self { x, z, phase: 0 }
    }

    /// Construct from `(qubit, op)` pairs; unlisted qubits are identity.
    ///
    /// # Panics
    ///
    /// Panics if a qubit index is `>= num_qubits`.
    pub fn from_ops(num_qubits: usize, ops: impl IntoIterator<Item = (usize, PauliOp)>) -> Self {
        let mut out = Self::identity(num_qubits);
        for (qubit, op) in ops {
            out.set_op(qubit, op);
        }
        out
    }

    /// A single non-identity operator on `qubit`.
    pub fn single(num_qubits: usize, qubit: usize, op: PauliOp) -> Self {
        Self::from_ops(num_qubits, [(qubit, op)])
    }

    /// Parse a little-endian label: the right-most character acts on qubit 0.
    pub fn from_label(label: &str) -> MappingResult<Self> {
        let n = label.chars().count();
        let mut out = Self::identity(n);
        for (pos, ch) in label.chars().enumerate() {
            let op = match ch {
                'I' => PauliOp::I,
                'X' => PauliOp::X,
                'Y' => PauliOp::Y,
                'Z' => PauliOp::Z,
                other => {
                    return Err(MappingError::InvalidLabel {
                        label: label.to_string(),
                        reason: format!("unexpected character '{other}'"),
                    });
                }
            };
            out.set_op(n - 1 - pos, op);
        }
        Ok(out)
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.x.len()
    }

    /// X part.
    pub fn x(&self) -> &[bool] {
        &self.x
    }

    /// Z part.
    pub fn z(&self) -> &[bool] {
        &self.z
    }

    /// Phase exponent `k` in `i^k`.
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Return a copy with the phase exponent replaced.
    #[must_use]
    pub fn with_phase(mut self, phase: u8) -> Self {
        self.phase = phase % 4;
        self
    }

    /// The phase as a complex scalar.
    pub fn phase_factor(&self) -> Complex64 {
        i_pow(self.phase)
    }

    /// The single-qubit operator acting on `qubit`.
    pub fn op(&self, qubit: usize) -> PauliOp {
        PauliOp::from_bits(self.x[qubit], self.z[qubit])
    }

    /// Overwrite the operator on `qubit`.
    pub fn set_op(&mut self, qubit: usize, op: PauliOp) {
        let (x, z) = op.bits();
        self.x[qubit] = x;
        self.z[qubit] = z;
    }

    /// True if every factor is the identity (the phase is ignored).
    pub fn is_identity(&self) -> bool {
        !self.x.iter().chain(self.z.iter()).any(|&b| b)
    }

    /// Qubits carrying a non-identity factor.
    pub fn support(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_qubits()).filter(|&q| self.x[q] || self.z[q])
    }

    /// Operator product `self · other`, tracking the phase exactly.
    ///
    /// # Panics
    ///
    /// Panics if the registers differ in length.
    pub fn compose(&self, other: &PauliString) -> PauliString {
        assert_eq!(
            self.num_qubits(),
            other.num_qubits(),
            "cannot compose Pauli strings of different lengths"
        );
        let mut exponent = i32::from(self.phase) + i32::from(other.phase);
        let mut x = Vec::with_capacity(self.num_qubits());
        let mut z = Vec::with_capacity(self.num_qubits());
        for q in 0..self.num_qubits() {
            exponent += product_exponent(self.x[q], self.z[q], other.x[q], other.z[q]);
            x.push(self.x[q] ^ other.x[q]);
            z.push(self.z[q] ^ other.z[q]);
        }
        PauliString {
            x,
            z,
            phase: exponent.rem_euclid(4) as u8,
        }
    }

    /// True if the two strings commute.
    pub fn commutes_with(&self, other: &PauliString) -> bool {
        let anticommuting = (0..self.num_qubits())
            .filter(|&q| (self.x[q] && other.z[q]) ^ (self.z[q] && other.x[q]))
            .count();
        anticommuting % 2 == 0
    }

    /// Drop the listed qubits, keeping the phase.
    pub fn remove_qubits(&self, qubits: &[usize]) -> PauliString {
        let keep = |q: &usize| !qubits.contains(q);
        let x = (0..self.num_qubits())
            .filter(keep)
            .map(|q| self.x[q])
            .collect();
        let z = (0..self.num_qubits())
            .filter(keep)
            .map(|q| self.z[q])
            .collect();
        PauliString {
            x,
            z,
            phase: self.phase,
        }
    }

    /// Action on a computational basis state: `P|b⟩ = factor · |target⟩`.
    ///
    /// Qubit `q` corresponds to bit `q` of the basis index.
    pub(crate) fn apply_to_basis(&self, basis: usize) -> (Complex64, usize) {
        let mut target = basis;
        let mut exponent = i32::from(self.phase);
        for q in 0..self.num_qubits() {
            let bit = (basis >> q) & 1 == 1;
            if self.x[q] {
                target ^= 1 << q;
            }
            match (self.x[q], self.z[q]) {
                // Y|0⟩ = i|1⟩, Y|1⟩ = -i|0⟩
                (true, true) => exponent += if bit { 3 } else { 1 },
                (false, true) if bit => exponent += 2,
                _ => {}
            }
        }
        (i_pow(exponent.rem_euclid(4) as u8), target)
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.phase {
            1 => "i",
            2 => "-",
            3 => "-i",
            _ => "",
        };
        write!(f, "{prefix}")?;
        for q in (0..self.num_qubits()).rev() {
            write!(f, "{}", self.op(q).symbol())?;
        }
        Ok(())
    }
}

/// Exponent of `i` picked up when multiplying `σ(x1,z1) · σ(x2,z2)`.
fn product_exponent(x1: bool, z1: bool, x2: bool, z2: bool) -> i32 {
    let (x2, z2) = (i32::from(x2), i32::from(z2));
    match (x1, z1) {
        (false, false) => 0,
        (true, true) => z2 - x2,
        (true, false) => z2 * (2 * x2 - 1),
        (false, true) => x2 * (1 - 2 * z2),
    }
}

pub(crate) fn i_pow(k: u8) -> Complex64 {
    match k % 4 {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}
