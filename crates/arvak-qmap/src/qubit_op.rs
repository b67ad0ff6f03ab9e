//! Weighted sums of Pauli strings.
//!
//! A qubit operator is
//!
//!   H = Σ_k  c_k · P_k
//!
//! over a fixed register of `num_qubits` qubits, with complex `c_k`.
//! Stored Pauli strings always carry phase 0; any phase produced by
//! composition is folded into the coefficient on insertion.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, MappingResult};
use crate::pauli::PauliString;

/// Coefficients at or below this magnitude are dropped by [`QubitOperator::simplify`].
pub const DEFAULT_ATOL: f64 = 1e-12;

/// A sum of weighted Pauli strings over a fixed register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QubitOperator {
    num_qubits: usize,
    terms: Vec<(PauliString, Complex64)>,
}

impl QubitOperator {
    /// The operator with no terms.
    pub fn zero(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            terms: Vec::new(),
        }
    }

    /// The identity with unit coefficient.
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            terms: vec![(PauliString::identity(num_qubits), Complex64::new(1.0, 0.0))],
        }
    }

    /// Build from `(pauli, coeff)` pairs, checking every string's length.
    pub fn from_terms(
        num_qubits: usize,
        terms: impl IntoIterator<Item = (PauliString, Complex64)>,
    ) -> MappingResult<Self> {
        let mut out = Self::zero(num_qubits);
        for (pauli, coeff) in terms {
            if pauli.num_qubits() != num_qubits {
                return Err(MappingError::RegisterLengthMismatch {
                    expected: num_qubits,
                    found: pauli.num_qubits(),
                });
            }
            out.push(pauli, coeff);
        }
        Ok(out)
    }

    /// Build from little-endian labels such as `"IZXY"`.
    ///
    /// The register length is taken from the first label; an empty input
    /// yields a zero operator on zero qubits.
    pub fn from_labels<S: AsRef<str>>(
        terms: impl IntoIterator<Item = (S, Complex64)>,
    ) -> MappingResult<Self> {
        let parsed = terms
            .into_iter()
            .map(|(label, coeff)| Ok((PauliString::from_label(label.as_ref())?, coeff)))
            .collect::<MappingResult<Vec<_>>>()?;
        let num_qubits = parsed.first().map_or(0, |(p, _)| p.num_qubits());
        Self::from_terms(num_qubits, parsed)
    }

    pub(crate) fn push(&mut self, pauli: PauliString, coeff: Complex64) {
        debug_assert_eq!(pauli.num_qubits(), self.num_qubits);
        let coeff = coeff * pauli.phase_factor();
        self.terms.push((pauli.with_phase(0), coeff));
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// All terms, in insertion order.
    pub fn terms(&self) -> &[(PauliString, Complex64)] {
        &self.terms
    }

    /// Number of stored terms (duplicates included until simplified).
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if there are no stored terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Multiply every coefficient by `factor`.
    #[must_use]
    pub fn scale(&self, factor: Complex64) -> Self {
        Self {
            num_qubits: self.num_qubits,
            terms: self
                .terms
                .iter()
                .map(|(p, c)| (p.clone(), c * factor))
                .collect(),
        }
    }

    /// Hermitian adjoint.
    #[must_use]
    pub fn adjoint(&self) -> Self {
        Self {
            num_qubits: self.num_qubits,
            terms: self.terms.iter().map(|(p, c)| (p.clone(), c.conj())).collect(),
        }
    }

    /// Operator product `self · other`. The result is not simplified.
    ///
    /// # Panics
    ///
    /// Panics if the registers differ in length.
    #[must_use]
    pub fn compose(&self, other: &QubitOperator) -> Self {
        assert_eq!(
            self.num_qubits, other.num_qubits,
            "cannot compose qubit operators of different lengths"
        );
        let mut out = Self::zero(self.num_qubits);
        out.terms.reserve(self.terms.len() * other.terms.len());
        for (p1, c1) in &self.terms {
            for (p2, c2) in &other.terms {
                out.push(p1.compose(p2), c1 * c2);
            }
        }
        out
    }

    /// Combine duplicate strings and drop coefficients with `|c| <= DEFAULT_ATOL`.
    #[must_use]
    pub fn simplify(&self) -> Self {
        self.simplify_with(DEFAULT_ATOL)
    }

    /// Combine duplicate strings and drop coefficients with `|c| <= atol`.
    ///
    /// First-seen order of the surviving strings is kept.
    #[must_use]
    pub fn simplify_with(&self, atol: f64) -> Self {
        let mut index: FxHashMap<&PauliString, usize> = FxHashMap::default();
        let mut combined: Vec<(PauliString, Complex64)> = Vec::new();
        for (pauli, coeff) in &self.terms {
            if let Some(&i) = index.get(pauli) {
                combined[i].1 += *coeff;
            } else {
                index.insert(pauli, combined.len());
                combined.push((pauli.clone(), *coeff));
            }
        }
        combined.retain(|(_, c)| c.norm() > atol);
        Self {
            num_qubits: self.num_qubits,
            terms: combined,
        }
    }

    /// True if `self` and `other` are the same operator up to `atol`,
    /// regardless of term order or duplicate strings.
    pub fn equiv(&self, other: &QubitOperator, atol: f64) -> bool {
        self.num_qubits == other.num_qubits && (self - other).simplify_with(atol).is_empty()
    }

    /// True if every coefficient is real after combining duplicates.
    pub fn is_hermitian(&self, atol: f64) -> bool {
        self.simplify_with(atol)
            .terms
            .iter()
            .all(|(_, c)| c.im.abs() <= atol)
    }

    /// True if every term commutes with `pauli`.
    pub fn commutes_with(&self, pauli: &PauliString) -> bool {
        self.terms.iter().all(|(p, _)| p.commutes_with(pauli))
    }

    /// Coefficient of the identity string, after combining duplicates.
    pub fn identity_coefficient(&self) -> Complex64 {
        self.terms
            .iter()
            .filter(|(p, _)| p.is_identity())
            .map(|(_, c)| *c)
            .sum()
    }

    /// Dense matrix in the computational basis (qubit 0 is the least
    /// significant bit of the row/column index).
    pub fn to_matrix(&self) -> Array2<Complex64> {
        let dim = 1usize << self.num_qubits;
        let mut matrix = Array2::<Complex64>::zeros((dim, dim));
        for (pauli, coeff) in &self.terms {
            for col in 0..dim {
                let (factor, row) = pauli.apply_to_basis(col);
                matrix[[row, col]] += coeff * factor;
            }
        }
        matrix
    }

    /// `⟨ψ|H|ψ⟩` for a state vector of length `2^num_qubits`.
    ///
    /// # Panics
    ///
    /// Panics if the state has the wrong dimension.
    pub fn expectation(&self, state: &Array1<Complex64>) -> Complex64 {
        let dim = 1usize << self.num_qubits;
        assert_eq!(state.len(), dim, "state dimension does not match register");
        let mut total = Complex64::new(0.0, 0.0);
        for (pauli, coeff) in &self.terms {
            let mut value = Complex64::new(0.0, 0.0);
            for basis in 0..dim {
                let (factor, target) = pauli.apply_to_basis(basis);
                value += state[target].conj() * factor * state[basis];
            }
            total += coeff * value;
        }
        total
    }

    /// Drop the listed qubits from every string.
    #[must_use]
    pub fn remove_qubits(&self, qubits: &[usize]) -> Self {
        let num_qubits = self.num_qubits - qubits.iter().filter(|&&q| q < self.num_qubits).count();
        Self {
            num_qubits,
            terms: self
                .terms
                .iter()
                .map(|(p, c)| (p.remove_qubits(qubits), *c))
                .collect(),
        }
    }
}

impl Add<&QubitOperator> for &QubitOperator {
    type Output = QubitOperator;

    /// # Panics
    ///
    /// Panics if the registers differ in length.
    fn add(self, rhs: &QubitOperator) -> QubitOperator {
        assert_eq!(
            self.num_qubits, rhs.num_qubits,
            "cannot add qubit operators of different lengths"
        );
        let mut out = self.clone();
        out.terms.extend(rhs.terms.iter().cloned());
        out
    }
}

impl Add for QubitOperator {
    type Output = QubitOperator;

    fn add(self, rhs: QubitOperator) -> QubitOperator {
        &self + &rhs
    }
}

impl Sub<&QubitOperator> for &QubitOperator {
    type Output = QubitOperator;

    fn sub(self, rhs: &QubitOperator) -> QubitOperator {
        self + &(-rhs)
    }
}

impl Neg for &QubitOperator {
    type Output = QubitOperator;

    fn neg(self) -> QubitOperator {
        self.scale(Complex64::new(-1.0, 0.0))
    }
}

impl Mul<Complex64> for &QubitOperator {
    type Output = QubitOperator;

    fn mul(self, rhs: Complex64) -> QubitOperator {
        self.scale(rhs)
    }
}

impl fmt::Display for QubitOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "QubitOperator ({} terms, {} qubits):",
            self.terms.len(),
            self.num_qubits
        )?;
        for (pauli, coeff) in &self.terms {
            writeln!(f, "  ({:+.6}{:+.6}i) {}", coeff.re, coeff.im, pauli)?;
        }
        Ok(())
    }
}
