//! Rank/permutation sorting.
//!
//! The n-element input is projected into two n²-slot encodings: *expanded*
//! (each value repeated n times contiguously) and *tiled* (the whole vector
//! repeated n times). Slot (i, j) of their difference is then the pairwise
//! comparison a_i − a_j, from which every element's normalized rank, an
//! optional stable tie-break offset and finally an approximately one-hot
//! permutation matrix are computed.

use fhe_core::{FheEngine, FheError};

use crate::params::{PermutationParams, SHARPEN_DEGREE, SHARPEN_SCALING};

/// Expanded encoding: `[a, a, .., a, b, b, .., b, ..]`, each of the n values
/// repeated n times.
pub fn expanded_layout(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    values
        .iter()
        .flat_map(|&v| std::iter::repeat_n(v, n))
        .collect()
}

/// Tiled encoding: `[a, b, c, .., a, b, c, ..]`, the whole vector repeated
/// n times.
pub fn tiled_layout(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut tiled = Vec::with_capacity(n * n);
    for _ in 0..n {
        tiled.extend_from_slice(values);
    }
    tiled
}

/// sin(πt)/(πt) with the removable singularity filled in.
fn sinc(t: f64) -> f64 {
    if t == 0.0 {
        1.0
    } else {
        (std::f64::consts::PI * t).sin() / (std::f64::consts::PI * t)
    }
}

/// Target-position grid: block i holds the constant i/n, the normalized
/// position that row of the permutation matrix selects for.
fn target_positions(n: usize) -> Vec<f64> {
    let mut grid = Vec::with_capacity(n * n);
    for i in 0..n {
        grid.extend(std::iter::repeat_n(i as f64 / n as f64, n));
    }
    grid
}

/// Tie-ordering matrix: 1/n on slots whose tile index exceeds their block
/// index, zero elsewhere. Multiplying the equality grid by it and summing
/// over blocks counts, for each element, the ties with a strictly smaller
/// original index.
fn tie_order_matrix(n: usize) -> Vec<f64> {
    let mut matrix = Vec::with_capacity(n * n);
    for block in 0..n {
        for tile in 0..n {
            matrix.push(if tile > block { 1.0 / n as f64 } else { 0.0 });
        }
    }
    matrix
}

/// Sorts by computing normalized ranks from pairwise comparisons and
/// selecting each element into its rank position through an approximately
/// one-hot permutation matrix.
pub struct RankPermutationSorter<'a, E> {
    engine: &'a E,
    params: PermutationParams,
}

impl<'a, E: FheEngine + Sync> RankPermutationSorter<'a, E> {
    /// Creates a sorter over a shared engine handle.
    pub fn new(engine: &'a E, params: PermutationParams) -> Self {
        Self { engine, params }
    }

    /// Sorts the encrypted vector ascending. The result carries the i-th
    /// smallest element in slot i·n.
    ///
    /// When tie-breaking is enabled, the rank and tie-offset branches are
    /// pure functions of the same two inputs and are evaluated concurrently;
    /// the join merges them by addition.
    pub fn sort(
        &self,
        expanded: &E::Ciphertext,
        tiled: &E::Ciphertext,
    ) -> Result<E::Ciphertext, FheError> {
        let rank = if self.params.tie_break {
            let (rank, offset) = rayon::join(
                || self.compute_rank(expanded, tiled),
                || self.compute_tie_offset(expanded, tiled),
            );
            self.engine.add(&rank?, &offset?)
        } else {
            self.compute_rank(expanded, tiled)?
        };
        tracing::debug!("ranks computed");
        self.apply_permutation(&rank, tiled)
    }

    /// Normalized rank of every element: the count of strictly smaller
    /// elements, scaled by 1/n.
    ///
    /// The step comparator is a sharpened falling sigmoid of the pairwise
    /// difference, already scaled by 1/n, so the rotate-sum over the n
    /// blocks directly yields count/n. Subtracting 0.5/n removes the
    /// self-comparison, which sits exactly on the step.
    fn compute_rank(
        &self,
        expanded: &E::Ciphertext,
        tiled: &E::Ciphertext,
    ) -> Result<E::Ciphertext, FheError> {
        let e = self.engine;
        let n = self.params.n;
        let nf = n as f64;
        let scaling = self.params.sigmoid_scaling;

        let diff = e.sub(expanded, tiled);
        let cmp = e.approximate(
            &diff,
            &move |x| 1.0 / (nf + nf * (scaling * x).exp()),
            (-1.0, 1.0),
            self.params.sigmoid_degree,
        )?;
        let counts = e.rotate_sum(&cmp, n, n.ilog2());
        Ok(e.add_scalar(&counts, -0.5 / nf))
    }

    /// Stable tie-break offset: nudges elements closer than δ apart into
    /// distinct rank positions that preserve their original order.
    ///
    /// `eq` flags near-equal pairs through a sinc whose central lobe width
    /// matches δ. `sx` is half the full tie count of each element (self
    /// included); `dx` counts only ties with a strictly smaller original
    /// index. `dx − sx + 0.5/n` is zero for untied elements and spreads a
    /// tied group of g elements over g consecutive rank slots in index
    /// order.
    fn compute_tie_offset(
        &self,
        expanded: &E::Ciphertext,
        tiled: &E::Ciphertext,
    ) -> Result<E::Ciphertext, FheError> {
        let e = self.engine;
        let n = self.params.n;
        let nf = n as f64;
        let period = 1.0 / self.params.delta;

        let diff = e.sub(expanded, tiled);
        let eq = e.approximate(
            &diff,
            &move |x| sinc(x * period),
            (-1.0, 1.0),
            self.params.tie_degree,
        )?;

        let steps = n.ilog2();
        let sx = e.mul_scalar(&e.rotate_sum(&eq, n, steps), 0.5 / nf)?;

        let order = e.encode(&tie_order_matrix(n), e.level(&eq));
        let dx = e.rotate_sum(&e.mul_plain(&eq, &order)?, n, steps);

        Ok(e.add_scalar(&e.sub(&dx, &sx), 0.5 / nf))
    }

    /// Builds the permutation matrix from the ranks and collapses each row
    /// of weighted candidates into its selected element.
    fn apply_permutation(
        &self,
        rank: &E::Ciphertext,
        tiled: &E::Ciphertext,
    ) -> Result<E::Ciphertext, FheError> {
        let e = self.engine;
        let n = self.params.n;
        let nf = n as f64;

        let targets = e.encode(&target_positions(n), e.level(rank));
        let delta = e.sub_plain(rank, &targets);
        let mut matrix = e.approximate(
            &delta,
            &move |x| sinc(x * nf),
            (-1.0, 1.0),
            self.params.sinc_degree,
        )?;
        // The sinc side-lobes grow with n; squash them towards {0, 1}
        // before the matrix touches the data.
        for _ in 0..self.params.sharpen_passes {
            matrix = e.approximate(
                &matrix,
                &|x| 1.0 / (1.0 + (-SHARPEN_SCALING * (x - 0.5)).exp()),
                (-1.0, 1.0),
                SHARPEN_DEGREE,
            )?;
        }
        let weighted = e.mul(tiled, &matrix)?;
        Ok(e.rotate_sum(&weighted, 1, n.ilog2()))
    }
}
