//! Z2 symmetry detection and qubit tapering.
//!
//! A Z2 symmetry of `H` is a Pauli string `τ` commuting with every term of
//! `H`. Given mutually commuting generators `τ_i`, each is paired with a
//! single-qubit Pauli `σ_i` on qubit `q_i` that anticommutes with `τ_i` and
//! commutes with every other generator. The Clifford
//!
//!   U_i = (σ_i + τ_i) / √2
//!
//! maps `τ_i` to `σ_i`, after which `H` acts on `q_i` only through `I` or
//! `σ_i` and the qubit can be replaced by the sector eigenvalue `±1`.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MappingError, MappingResult};
use crate::pauli::{PauliOp, PauliString};
use crate::qubit_op::QubitOperator;

/// Detected symmetry generators and their tapering data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Z2Symmetries {
    symmetries: Vec<PauliString>,
    sq_paulis: Vec<PauliString>,
    sq_list: Vec<usize>,
    tapering_values: Option<Vec<i8>>,
}

impl Z2Symmetries {
    /// Assemble from explicit parts.
    ///
    /// # Panics
    ///
    /// Panics if the three lists differ in length.
    pub fn new(
        symmetries: Vec<PauliString>,
        sq_paulis: Vec<PauliString>,
        sq_list: Vec<usize>,
    ) -> Self {
        assert!(
            symmetries.len() == sq_paulis.len() && sq_paulis.len() == sq_list.len(),
            "symmetries, single-qubit Paulis and tapered qubits must pair up"
        );
        Self {
            symmetries,
            sq_paulis,
            sq_list,
            tapering_values: None,
        }
    }

    /// Find a set of commuting Z2 generators of `op`.
    ///
    /// Returns an empty set for operators without non-identity terms.
    pub fn find(op: &QubitOperator) -> Self {
        let n = op.num_qubits();
        // rows are [z | x] so that row · v is the symplectic product with v = [x | z]
        let rows: Vec<Vec<bool>> = op
            .simplify()
            .terms()
            .iter()
            .filter(|(p, _)| !p.is_identity())
            .map(|(p, _)| p.z().iter().chain(p.x().iter()).copied().collect())
            .collect();
        if rows.is_empty() {
            debug!("no non-identity terms, no Z2 symmetries");
            return Self::default();
        }

        let commutant = kernel(rows, 2 * n);
        let mut generators = isotropic_part(commutant, n);
        rref(&mut generators);

        let mut symmetries = Vec::new();
        let mut sq_paulis = Vec::new();
        let mut sq_list = Vec::new();
        let as_pauli =
            |v: &[bool]| PauliString::from_bits(v[..n].to_vec(), v[n..].to_vec());
        let all: Vec<PauliString> = generators.iter().map(|v| as_pauli(v.as_slice())).collect();
        for (i, tau) in all.iter().enumerate() {
            let others: Vec<&PauliString> = all
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, p)| p)
                .collect();
            match pick_single_qubit(tau, &others, &sq_list, &generators[i], n) {
                Some((qubit, sigma)) => {
                    symmetries.push(tau.clone());
                    sq_paulis.push(PauliString::single(n, qubit, sigma));
                    sq_list.push(qubit);
                }
                None => debug!(generator = %tau, "no free qubit for generator, dropping it"),
            }
        }
        debug!(
            generators = symmetries.len(),
            tapered_qubits = ?sq_list,
            "detected Z2 symmetries"
        );
        Self::new(symmetries, sq_paulis, sq_list)
    }

    /// True if no generators were found.
    pub fn is_empty(&self) -> bool {
        self.symmetries.is_empty()
    }

    /// Number of generators.
    pub fn len(&self) -> usize {
        self.symmetries.len()
    }

    /// Generators `τ_i`.
    pub fn symmetries(&self) -> &[PauliString] {
        &self.symmetries
    }

    /// Paired single-qubit Paulis `σ_i`.
    pub fn sq_paulis(&self) -> &[PauliString] {
        &self.sq_paulis
    }

    /// Tapered qubits `q_i`.
    pub fn sq_list(&self) -> &[usize] {
        &self.sq_list
    }

    /// Chosen sector, if any.
    pub fn tapering_values(&self) -> Option<&[i8]> {
        self.tapering_values.as_deref()
    }

    /// Fix the sector. Every value must be `±1`, one per generator.
    pub fn with_tapering_values(mut self, values: Vec<i8>) -> MappingResult<Self> {
        if values.len() != self.symmetries.len() || values.iter().any(|v| !matches!(v, 1 | -1)) {
            return Err(MappingError::InvalidSector {
                expected: self.symmetries.len(),
                found: values,
            });
        }
        self.tapering_values = Some(values);
        Ok(self)
    }

    /// The Cliffords `U_i = (σ_i + τ_i)/√2`.
    pub fn cliffords(&self) -> Vec<QubitOperator> {
        let w = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        self.symmetries
            .iter()
            .zip(&self.sq_paulis)
            .map(|(tau, sigma)| {
                let mut u = QubitOperator::zero(tau.num_qubits());
                u.push(sigma.clone(), w);
                u.push(tau.clone(), w);
                u
            })
            .collect()
    }

    /// `Π U_i · op · Π U_i`.
    pub fn convert_clifford(&self, op: &QubitOperator) -> QubitOperator {
        self.cliffords()
            .iter()
            .fold(op.clone(), |acc, u| u.compose(&acc).compose(u).simplify())
    }

    /// Replace every tapered qubit by its sector value and drop it.
    ///
    /// `op` must already act on each `q_i` only through `I` or `σ_i`.
    pub fn taper_clifford(&self, op: &QubitOperator) -> MappingResult<QubitOperator> {
        let values = self.tapering_values.as_ref().ok_or_else(|| {
            MappingError::SectorResolution("tapering values have not been set".into())
        })?;
        let mut out = QubitOperator::zero(op.num_qubits());
        for (pauli, coeff) in op.terms() {
            let sign: i32 = self
                .sq_list
                .iter()
                .zip(values)
                .filter(|&(&q, _)| pauli.op(q) != PauliOp::I)
                .map(|(_, &v)| i32::from(v))
                .product();
            out.push(pauli.clone(), *coeff * f64::from(sign));
        }
        Ok(out.remove_qubits(&self.sq_list).simplify())
    }

    /// True if `op` commutes with every generator.
    pub fn commutes(&self, op: &QubitOperator) -> bool {
        self.symmetries.iter().all(|tau| op.commutes_with(tau))
    }

    /// Project `op` onto the chosen sector.
    ///
    /// Returns `Ok(None)` if `op` does not commute with the generators,
    /// and an error if no sector has been fixed.
    pub fn taper(&self, op: &QubitOperator) -> MappingResult<Option<QubitOperator>> {
        if self.is_empty() {
            return Ok(Some(op.clone()));
        }
        if self.tapering_values.is_none() {
            return Err(MappingError::SectorResolution(
                "tapering values have not been set".into(),
            ));
        }
        if !self.commutes(op) {
            return Ok(None);
        }
        self.taper_clifford(&self.convert_clifford(op)).map(Some)
    }

    /// Project `op` onto every sector, in binary order of the sign pattern.
    pub fn taper_all_sectors(
        &self,
        op: &QubitOperator,
    ) -> MappingResult<Vec<(Vec<i8>, QubitOperator)>> {
        let converted = self.convert_clifford(op);
        (0..1usize << self.len())
            .map(|bits| {
                let values: Vec<i8> = (0..self.len())
                    .map(|i| if (bits >> i) & 1 == 1 { -1 } else { 1 })
                    .collect();
                let sector = self.clone().with_tapering_values(values.clone())?;
                Ok((values, sector.taper_clifford(&converted)?))
            })
            .collect()
    }
}

/// Row-reduce over GF(2) in place, returning the pivot column of each
/// remaining row. Zero rows are removed.
fn rref(rows: &mut Vec<Vec<bool>>) -> Vec<usize> {
    let ncols = rows.first().map_or(0, Vec::len);
    let mut pivots = Vec::new();
    let mut r = 0;
    for col in 0..ncols {
        let Some(found) = (r..rows.len()).find(|&i| rows[i][col]) else {
            continue;
        };
        rows.swap(r, found);
        let pivot_row = rows[r].clone();
        for (i, row) in rows.iter_mut().enumerate() {
            if i != r && row[col] {
                for (a, b) in row.iter_mut().zip(&pivot_row) {
                    *a ^= *b;
                }
            }
        }
        pivots.push(col);
        r += 1;
        if r == rows.len() {
            break;
        }
    }
    rows.truncate(r);
    pivots
}

/// Basis of `{v : rows · v = 0}` over GF(2).
fn kernel(mut rows: Vec<Vec<bool>>, ncols: usize) -> Vec<Vec<bool>> {
    let pivots = rref(&mut rows);
    (0..ncols)
        .filter(|c| !pivots.contains(c))
        .map(|free| {
            let mut v = vec![false; ncols];
            v[free] = true;
            for (row, &p) in rows.iter().zip(&pivots) {
                v[p] = row[free];
            }
            v
        })
        .collect()
}

/// Symplectic product of `[x | z]` vectors over `n` qubits.
fn symplectic(a: &[bool], b: &[bool], n: usize) -> bool {
    (0..n).fold(false, |acc, q| acc ^ (a[q] & b[n + q]) ^ (a[n + q] & b[q]))
}

/// Split a span into hyperbolic pairs and keep the commuting remainder.
fn isotropic_part(mut pool: Vec<Vec<bool>>, n: usize) -> Vec<Vec<bool>> {
    let mut isotropic = Vec::new();
    while let Some(v) = pool.pop() {
        let Some(pos) = pool.iter().position(|w| symplectic(&v, w, n)) else {
            isotropic.push(v);
            continue;
        };
        let w = pool.remove(pos);
        for u in &mut pool {
            let with_w = symplectic(u, &w, n);
            let with_v = symplectic(u, &v, n);
            if with_w {
                u.iter_mut().zip(&v).for_each(|(a, b)| *a ^= *b);
            }
            if with_v {
                u.iter_mut().zip(&w).for_each(|(a, b)| *a ^= *b);
            }
        }
    }
    isotropic
}

/// Choose `(q, σ)` anticommuting with `tau` and commuting with `others`,
/// on a qubit not yet used. The pivot of the reduced row is tried first.
fn pick_single_qubit(
    tau: &PauliString,
    others: &[&PauliString],
    used: &[usize],
    row: &[bool],
    n: usize,
) -> Option<(usize, PauliOp)> {
    let fits = |q: usize, sigma: PauliOp| {
        let t = tau.op(q);
        !used.contains(&q)
            && t != PauliOp::I
            && t != sigma
            && others.iter().all(|o| matches!(o.op(q), PauliOp::I) || o.op(q) == sigma)
    };
    let pivot = row.iter().position(|&b| b).map(|c| {
        if c < n {
            (c, PauliOp::Z)
        } else {
            (c - n, PauliOp::X)
        }
    });
    pivot
        .into_iter()
        .chain((0..n).flat_map(|q| [PauliOp::Z, PauliOp::X, PauliOp::Y].map(|s| (q, s))))
        .find(|&(q, sigma)| fits(q, sigma))
}
