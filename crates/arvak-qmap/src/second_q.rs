//! Second-quantized operators.
//!
//! An operator is a map from a label, an ordered product of per-mode
//! ladder factors, to a complex coefficient:
//!
//!   O = Σ_l  c_l · f_{l,0} f_{l,1} … f_{l,k}
//!
//! Labels are written in sparse form, e.g. `"+_0 -_1"` for a†_0 a_1 or
//! `"N_2"` for the occupation number of mode 2. The factors multiply
//! left to right, so the right-most factor acts first on a state.
//!
//! # Example
//!
//! ```rust
//! use arvak_qmap::second_q::FermionicOp;
//! use num_complex::Complex64;
//!
//! let hop = FermionicOp::from_labels(
//!     [("+_0 -_1", Complex64::new(-1.0, 0.0)), ("+_1 -_0", Complex64::new(-1.0, 0.0))],
//!     2,
//! )
//! .unwrap();
//! assert_eq!(hop.len(), 2);
//! assert_eq!(hop.register_length(), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, MappingResult};

/// Algebraic family of a second-quantized operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorFamily {
    /// Fermionic creation/annihilation algebra.
    Fermionic,
    /// Vibrational (modal) creation/annihilation algebra.
    Vibrational,
}

impl fmt::Display for OperatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorFamily::Fermionic => write!(f, "fermionic"),
            OperatorFamily::Vibrational => write!(f, "vibrational"),
        }
    }
}

/// A single per-mode ladder factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LadderAction {
    /// Creation `+`.
    Create,
    /// Annihilation `-`.
    Annihilate,
    /// Occupation number `N = + -`.
    Number,
    /// Vacancy `E = - +`.
    Empty,
}

impl LadderAction {
    /// Label character.
    pub fn symbol(self) -> char {
        match self {
            LadderAction::Create => '+',
            LadderAction::Annihilate => '-',
            LadderAction::Number => 'N',
            LadderAction::Empty => 'E',
        }
    }

    fn parse(ch: &str) -> Option<Self> {
        match ch {
            "+" => Some(LadderAction::Create),
            "-" => Some(LadderAction::Annihilate),
            "N" => Some(LadderAction::Number),
            "E" => Some(LadderAction::Empty),
            _ => None,
        }
    }
}

/// Ordered ladder factors of one fermionic term.
pub type FermionicLabel = Vec<(LadderAction, usize)>;

/// Fermionic second-quantized operator over a fixed number of modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FermionicOp {
    register_length: usize,
    terms: BTreeMap<FermionicLabel, Complex64>,
}

impl FermionicOp {
    /// The operator with no terms.
    pub fn zero(register_length: usize) -> Self {
        Self {
            register_length,
            terms: BTreeMap::new(),
        }
    }

    /// The identity (empty label) with unit coefficient.
    pub fn one(register_length: usize) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(Vec::new(), Complex64::new(1.0, 0.0));
        Self {
            register_length,
            terms,
        }
    }

    /// Build from parsed labels. Duplicate labels are summed.
    pub fn from_terms(
        terms: impl IntoIterator<Item = (FermionicLabel, Complex64)>,
        register_length: usize,
    ) -> MappingResult<Self> {
        let mut out = Self::zero(register_length);
        for (label, coeff) in terms {
            if let Some(&(_, index)) = label.iter().find(|(_, i)| *i >= register_length) {
                return Err(MappingError::IndexOutOfRange {
                    index,
                    register_length,
                });
            }
            *out.terms.entry(label).or_default() += coeff;
        }
        Ok(out)
    }

    /// Build from sparse labels such as `"+_0 -_1"` or `"N_3"`.
    pub fn from_labels<S: AsRef<str>>(
        terms: impl IntoIterator<Item = (S, Complex64)>,
        register_length: usize,
    ) -> MappingResult<Self> {
        let parsed = terms
            .into_iter()
            .map(|(label, coeff)| Ok((parse_fermionic_label(label.as_ref())?, coeff)))
            .collect::<MappingResult<Vec<_>>>()?;
        Self::from_terms(parsed, register_length)
    }

    /// Total particle-number operator `Σ_j N_j`.
    pub fn particle_number(register_length: usize) -> Self {
        let terms = (0..register_length)
            .map(|j| (vec![(LadderAction::Number, j)], Complex64::new(1.0, 0.0)))
            .collect();
        Self {
            register_length,
            terms,
        }
    }

    /// Number of modes.
    pub fn register_length(&self) -> usize {
        self.register_length
    }

    /// Iterate over `(label, coeff)` pairs in label order.
    pub fn terms(&self) -> impl Iterator<Item = (&[(LadderAction, usize)], Complex64)> + '_ {
        self.terms.iter().map(|(l, c)| (l.as_slice(), *c))
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if there are no labels.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Multiply every coefficient by `factor`.
    #[must_use]
    pub fn scale(&self, factor: Complex64) -> Self {
        Self {
            register_length: self.register_length,
            terms: self.terms.iter().map(|(l, c)| (l.clone(), c * factor)).collect(),
        }
    }
}

impl Add<&FermionicOp> for &FermionicOp {
    type Output = FermionicOp;

    /// The sum acts on the larger of the two registers.
    fn add(self, rhs: &FermionicOp) -> FermionicOp {
        let mut out = self.clone();
        out.register_length = self.register_length.max(rhs.register_length);
        for (label, coeff) in &rhs.terms {
            *out.terms.entry(label.clone()).or_default() += coeff;
        }
        out
    }
}

impl fmt::Display for FermionicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "FermionicOp ({} terms, {} modes):",
            self.terms.len(),
            self.register_length
        )?;
        for (label, coeff) in &self.terms {
            let rendered: Vec<String> = label
                .iter()
                .map(|(a, i)| format!("{}_{}", a.symbol(), i))
                .collect();
            writeln!(f, "  ({:+.6}{:+.6}i) {}", coeff.re, coeff.im, rendered.join(" "))?;
        }
        Ok(())
    }
}

/// One vibrational ladder factor: `(action, mode, modal)`.
pub type VibrationalFactor = (LadderAction, usize, usize);

/// Vibrational second-quantized operator.
///
/// Each mode `m` owns `num_modals[m]` modals; the flattened register index
/// of `(m, k)` is `Σ_{m' < m} num_modals[m'] + k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibrationalOp {
    num_modals: Vec<usize>,
    terms: BTreeMap<Vec<VibrationalFactor>, Complex64>,
}

impl VibrationalOp {
    /// Build from sparse labels such as `"+_0_1 -_0_0"` (action, mode, modal).
    pub fn from_labels<S: AsRef<str>>(
        terms: impl IntoIterator<Item = (S, Complex64)>,
        num_modals: Vec<usize>,
    ) -> MappingResult<Self> {
        let register_length: usize = num_modals.iter().sum();
        let mut out = Self {
            num_modals,
            terms: BTreeMap::new(),
        };
        for (label, coeff) in terms {
            let label = label.as_ref();
            let factors = parse_vibrational_label(label)?;
            for &(_, mode, modal) in &factors {
                if mode >= out.num_modals.len() || modal >= out.num_modals[mode] {
                    return Err(MappingError::InvalidLabel {
                        label: label.to_string(),
                        reason: format!("mode {mode} / modal {modal} outside {:?}", out.num_modals),
                    });
                }
            }
            debug_assert!(factors.iter().all(|&(_, m, k)| out.flat_index(m, k) < register_length));
            *out.terms.entry(factors).or_default() += coeff;
        }
        Ok(out)
    }

    /// Modal count per mode.
    pub fn num_modals(&self) -> &[usize] {
        &self.num_modals
    }

    /// Total number of modals (qubits under direct mapping).
    pub fn register_length(&self) -> usize {
        self.num_modals.iter().sum()
    }

    /// Flattened register index of `(mode, modal)`.
    pub fn flat_index(&self, mode: usize, modal: usize) -> usize {
        self.num_modals[..mode].iter().sum::<usize>() + modal
    }

    /// Iterate over `(label, coeff)` pairs in label order.
    pub fn terms(&self) -> impl Iterator<Item = (&[VibrationalFactor], Complex64)> + '_ {
        self.terms.iter().map(|(l, c)| (l.as_slice(), *c))
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if there are no labels.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Multiply every coefficient by `factor`.
    #[must_use]
    pub fn scale(&self, factor: Complex64) -> Self {
        Self {
            num_modals: self.num_modals.clone(),
            terms: self.terms.iter().map(|(l, c)| (l.clone(), c * factor)).collect(),
        }
    }
}

/// A second-quantized operator of any supported family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SecondQuantizedOp {
    /// Fermionic operator.
    Fermionic(FermionicOp),
    /// Vibrational operator.
    Vibrational(VibrationalOp),
}

impl SecondQuantizedOp {
    /// Algebraic family.
    pub fn family(&self) -> OperatorFamily {
        match self {
            SecondQuantizedOp::Fermionic(_) => OperatorFamily::Fermionic,
            SecondQuantizedOp::Vibrational(_) => OperatorFamily::Vibrational,
        }
    }

    /// Register length (modes for fermions, total modals for vibrations).
    pub fn register_length(&self) -> usize {
        match self {
            SecondQuantizedOp::Fermionic(op) => op.register_length(),
            SecondQuantizedOp::Vibrational(op) => op.register_length(),
        }
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        match self {
            SecondQuantizedOp::Fermionic(op) => op.len(),
            SecondQuantizedOp::Vibrational(op) => op.len(),
        }
    }

    /// True if there are no labels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Terms with every factor resolved to a flat register index.
    pub fn ladder_terms(&self) -> Vec<(FermionicLabel, Complex64)> {
        match self {
            SecondQuantizedOp::Fermionic(op) => {
                op.terms().map(|(l, c)| (l.to_vec(), c)).collect()
            }
            SecondQuantizedOp::Vibrational(op) => op
                .terms()
                .map(|(l, c)| {
                    let flat = l
                        .iter()
                        .map(|&(action, mode, modal)| (action, op.flat_index(mode, modal)))
                        .collect();
                    (flat, c)
                })
                .collect(),
        }
    }
}

impl From<FermionicOp> for SecondQuantizedOp {
    fn from(op: FermionicOp) -> Self {
        SecondQuantizedOp::Fermionic(op)
    }
}

impl From<VibrationalOp> for SecondQuantizedOp {
    fn from(op: VibrationalOp) -> Self {
        SecondQuantizedOp::Vibrational(op)
    }
}

fn invalid(label: &str, reason: impl Into<String>) -> MappingError {
    MappingError::InvalidLabel {
        label: label.to_string(),
        reason: reason.into(),
    }
}

fn parse_index(label: &str, text: &str) -> MappingResult<usize> {
    text.parse()
        .map_err(|_| invalid(label, format!("'{text}' is not a mode index")))
}

/// Parse a sparse fermionic label; the empty label is the identity.
pub fn parse_fermionic_label(label: &str) -> MappingResult<FermionicLabel> {
    label
        .split_whitespace()
        .map(|token| {
            let (action, index) = token
                .split_once('_')
                .ok_or_else(|| invalid(label, format!("token '{token}' is not of the form <op>_<index>")))?;
            let action = LadderAction::parse(action)
                .ok_or_else(|| invalid(label, format!("unknown ladder operator '{action}'")))?;
            Ok((action, parse_index(label, index)?))
        })
        .collect()
}

fn parse_vibrational_label(label: &str) -> MappingResult<Vec<VibrationalFactor>> {
    label
        .split_whitespace()
        .map(|token| {
            let mut parts = token.split('_');
            let (Some(action), Some(mode), Some(modal), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return Err(invalid(
                    label,
                    format!("token '{token}' is not of the form <op>_<mode>_<modal>"),
                ));
            };
            let action = match LadderAction::parse(action) {
                Some(a @ (LadderAction::Create | LadderAction::Annihilate)) => a,
                _ => return Err(invalid(label, format!("unknown ladder operator '{action}'"))),
            };
            Ok((action, parse_index(label, mode)?, parse_index(label, modal)?))
        })
        .collect()
}
