//! Bravyi-Kitaev index sets.
//!
//! For a register padded to `2^b` modes, mode `j` has three sets:
//!
//! - **update** `U(j)`: qubits whose stored value includes the occupation of `j`,
//! - **parity** `P(j)`: qubits whose values sum to the parity of modes `< j`,
//! - **flip** `F(j)`: qubits that decide whether qubit `j` stores the same
//!   parity as mode `j` or its complement.
//!
//! The **remainder** set is `R(j) = P(j) \ F(j)`.

use std::collections::BTreeSet;

/// Smallest `b >= 1` with `2^b >= num_modes`.
pub fn binary_superset_size(num_modes: usize) -> u32 {
    let mut bin_sup = 1;
    while num_modes > (1usize << bin_sup) {
        bin_sup += 1;
    }
    bin_sup
}

/// Qubits whose value must change when mode `index` is toggled.
pub fn update_set(index: usize, bin_sup: u32) -> Vec<usize> {
    if bin_sup == 0 {
        return Vec::new();
    }
    let half = 1usize << (bin_sup - 1);
    if index < half {
        let mut out = vec![(1usize << bin_sup) - 1];
        out.extend(update_set(index, bin_sup - 1));
        out
    } else {
        update_set(index - half, bin_sup - 1)
            .into_iter()
            .map(|i| i + half)
            .collect()
    }
}

/// Qubits whose values sum to the parity of all modes below `index`.
pub fn parity_set(index: usize, bin_sup: u32) -> Vec<usize> {
    if bin_sup == 0 {
        return Vec::new();
    }
    let half = 1usize << (bin_sup - 1);
    if index < half {
        parity_set(index, bin_sup - 1)
    } else {
        let mut out = vec![half - 1];
        out.extend(parity_set(index - half, bin_sup - 1).into_iter().map(|i| i + half));
        out
    }
}

/// Qubits that determine whether qubit `index` stores mode `index`'s
/// occupation or its complement.
pub fn flip_set(index: usize, bin_sup: u32) -> Vec<usize> {
    if bin_sup == 0 {
        return Vec::new();
    }
    let half = 1usize << (bin_sup - 1);
    if index < half {
        flip_set(index, bin_sup - 1)
    } else {
        let mut out: Vec<usize> = flip_set(index - half, bin_sup - 1)
            .into_iter()
            .map(|i| i + half)
            .collect();
        if index == (1usize << bin_sup) - 1 {
            out.push(half - 1);
        }
        out
    }
}

/// All index sets of one mode, sorted and restricted to the register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeIndexSets {
    /// Update set.
    pub update: Vec<usize>,
    /// Parity set.
    pub parity: Vec<usize>,
    /// Flip set.
    pub flip: Vec<usize>,
    /// Parity set minus flip set.
    pub remainder: Vec<usize>,
}

impl ModeIndexSets {
    /// Compute the sets of mode `index` in a register of `num_modes` modes.
    pub fn new(index: usize, num_modes: usize) -> Self {
        let bin_sup = binary_superset_size(num_modes);
        let restrict = |set: Vec<usize>| -> BTreeSet<usize> {
            set.into_iter().filter(|&i| i < num_modes).collect()
        };
        let update = restrict(update_set(index, bin_sup));
        let parity = restrict(parity_set(index, bin_sup));
        let flip = restrict(flip_set(index, bin_sup));
        let remainder = parity.difference(&flip).copied().collect();
        Self {
            update: update.into_iter().collect(),
            parity: parity.into_iter().collect(),
            flip: flip.into_iter().collect(),
            remainder,
        }
    }
}
