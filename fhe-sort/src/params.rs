//! Table-driven parameter selection.
//!
//! The approximation degrees, scaling constants and depth contributions are
//! keyed by the required precision δ (the smallest gap the circuit must
//! resolve) and, for the rank/permutation circuit, by the vector length n.
//! Both keys are sorted breakpoint tables, so the monotonic-precision law
//! (a tighter δ never selects a smaller degree or a shallower circuit) is a
//! property of the table itself.

use fhe_core::{FheError, chebyshev};

/// Degree of the steep cleanup polynomial applied to the permutation matrix
/// when side-lobe suppression is enabled.
pub const SHARPEN_DEGREE: usize = 59;

/// Sharpness of the cleanup polynomial's transition at 1/2.
pub const SHARPEN_SCALING: f64 = 64.0;

/// Levels kept in reserve on top of the computed permutation circuit depth.
const DEPTH_MARGIN: usize = 2;

/// Parameter-selection errors, reported before any cryptographic context is
/// created.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    /// δ is below the smallest supported bracket.
    #[error("minimum gap {0} is below the smallest supported precision bracket (1e-4)")]
    DeltaTooSmall(f64),
    /// n is outside the tuned range of the rank/permutation circuit.
    #[error("vector length {0} is not supported by the rank/permutation circuit (power of two up to 128)")]
    UnsupportedLength(usize),
}

struct DeltaRow {
    min_delta: f64,
    precision_digits: usize,
    relu_degree: usize,
    sigmoid_scaling: f64,
    sigmoid_degree: usize,
    tie_degree: usize,
}

/// δ brackets, coarsest first. Lookup picks the first row whose bracket
/// contains the requested δ.
const DELTA_TABLE: &[DeltaRow] = &[
    DeltaRow {
        min_delta: 1e-1,
        precision_digits: 1,
        relu_degree: 119,
        sigmoid_scaling: 650.0,
        sigmoid_degree: 1006,
        tie_degree: 247,
    },
    DeltaRow {
        min_delta: 1e-2,
        precision_digits: 2,
        relu_degree: 495,
        sigmoid_scaling: 650.0,
        sigmoid_degree: 1006,
        tie_degree: 495,
    },
    DeltaRow {
        min_delta: 1e-3,
        precision_digits: 3,
        relu_degree: 495,
        sigmoid_scaling: 9170.0,
        sigmoid_degree: 16000,
        tie_degree: 1007,
    },
    DeltaRow {
        min_delta: 1e-4,
        precision_digits: 4,
        relu_degree: 495,
        sigmoid_scaling: 16000.0,
        sigmoid_degree: 32000,
        tie_degree: 4007,
    },
];

struct SizeRow {
    max_n: usize,
    sinc_degree: usize,
    sharpen_passes: usize,
}

/// n brackets for the rank/permutation circuit. The sinc side-lobes grow
/// with n, so larger vectors get a higher one-hot degree and extra cleanup
/// passes on the permutation matrix.
const SIZE_TABLE: &[SizeRow] = &[
    SizeRow {
        max_n: 16,
        sinc_degree: 59,
        sharpen_passes: 0,
    },
    SizeRow {
        max_n: 32,
        sinc_degree: 119,
        sharpen_passes: 1,
    },
    SizeRow {
        max_n: 64,
        sinc_degree: 247,
        sharpen_passes: 1,
    },
    SizeRow {
        max_n: 128,
        sinc_degree: 495,
        sharpen_passes: 2,
    },
];

fn delta_row(delta: f64) -> Result<&'static DeltaRow, ParamError> {
    DELTA_TABLE
        .iter()
        .find(|row| delta >= row.min_delta)
        .ok_or(ParamError::DeltaTooSmall(delta))
}

fn size_row(n: usize) -> Result<&'static SizeRow, ParamError> {
    if !n.is_power_of_two() {
        return Err(ParamError::UnsupportedLength(n));
    }
    SIZE_TABLE
        .iter()
        .find(|row| n <= row.max_n)
        .ok_or(ParamError::UnsupportedLength(n))
}

/// Parameters of the comparison-network circuit.
#[derive(Clone, Debug)]
pub struct NetworkParams {
    /// Degree of the ReLU Chebyshev approximation used by compare-exchange.
    pub relu_degree: usize,
    /// Clear-side prescale keeping all intermediate differences inside the
    /// approximation domain.
    pub input_scale: f64,
    /// Decimal digits the selected bracket is expected to resolve.
    pub precision_digits: usize,
}

impl NetworkParams {
    /// Selects network parameters for the required minimum gap.
    pub fn select(delta: f64) -> Result<Self, ParamError> {
        let row = delta_row(delta)?;
        Ok(Self {
            relu_degree: row.relu_degree,
            input_scale: 0.95,
            precision_digits: row.precision_digits,
        })
    }

    /// Levels one compare-exchange layer consumes: the ReLU evaluation plus
    /// the final masking multiplication.
    pub fn layer_depth(&self) -> Result<usize, FheError> {
        Ok(chebyshev::evaluation_depth(self.relu_degree)? + 1)
    }
}

/// Parameters of the rank/permutation circuit.
#[derive(Clone, Debug)]
pub struct PermutationParams {
    /// Vector length (the ciphertext carries n² slots).
    pub n: usize,
    /// Minimum gap the comparison must resolve.
    pub delta: f64,
    /// Transition sharpness of the step-function sigmoid.
    pub sigmoid_scaling: f64,
    /// Degree of the step-function approximation.
    pub sigmoid_degree: usize,
    /// Degree of the one-hot sinc approximation.
    pub sinc_degree: usize,
    /// Degree of the tie-break equality indicator.
    pub tie_degree: usize,
    /// Whether the stable tie-break offset is computed and merged.
    pub tie_break: bool,
    /// Cleanup passes applied to the permutation matrix before the final
    /// multiplication.
    pub sharpen_passes: usize,
    /// Decimal digits the selected bracket is expected to resolve.
    pub precision_digits: usize,
}

impl PermutationParams {
    /// Selects permutation parameters for the required minimum gap and
    /// vector length.
    pub fn select(delta: f64, n: usize, tie_break: bool) -> Result<Self, ParamError> {
        let delta_row = delta_row(delta)?;
        let size_row = size_row(n)?;
        Ok(Self {
            n,
            delta,
            sigmoid_scaling: delta_row.sigmoid_scaling,
            sigmoid_degree: delta_row.sigmoid_degree,
            sinc_degree: size_row.sinc_degree,
            tie_degree: delta_row.tie_degree,
            tie_break,
            sharpen_passes: size_row.sharpen_passes,
            precision_digits: delta_row.precision_digits,
        })
    }

    /// Exact level consumption of the circuit: the deeper of the rank and
    /// tie-offset branches (the tie branch pays one extra level for its
    /// triangular multiplication), the one-hot evaluation, the cleanup
    /// passes and the final permutation multiplication.
    pub fn circuit_depth(&self) -> Result<usize, FheError> {
        let rank = chebyshev::evaluation_depth(self.sigmoid_degree)?;
        let branch = if self.tie_break {
            rank.max(chebyshev::evaluation_depth(self.tie_degree)? + 1)
        } else {
            rank
        };
        let mut depth = branch + chebyshev::evaluation_depth(self.sinc_degree)? + 1;
        if self.sharpen_passes > 0 {
            depth += self.sharpen_passes * chebyshev::evaluation_depth(SHARPEN_DEGREE)?;
        }
        Ok(depth)
    }

    /// Depth to provision the context with, including the reserve margin.
    pub fn context_depth(&self) -> Result<usize, FheError> {
        Ok(self.circuit_depth()? + DEPTH_MARGIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_delta_below_last_bracket() {
        assert!(matches!(
            NetworkParams::select(1e-5),
            Err(ParamError::DeltaTooSmall(_))
        ));
        assert!(matches!(
            PermutationParams::select(5e-5, 8, false),
            Err(ParamError::DeltaTooSmall(_))
        ));
    }

    #[test]
    fn rejects_unsupported_lengths() {
        assert!(matches!(
            PermutationParams::select(0.05, 12, false),
            Err(ParamError::UnsupportedLength(12))
        ));
        assert!(matches!(
            PermutationParams::select(0.05, 256, false),
            Err(ParamError::UnsupportedLength(256))
        ));
    }

    #[test]
    fn monotonic_precision_law() {
        // Tighter δ must never select a smaller degree or shallower circuit,
        // for every supported n.
        let deltas = [0.5, 0.1, 0.05, 0.01, 0.005, 0.001, 0.0005, 0.0001];
        for n in [4, 8, 16, 32, 64, 128] {
            let mut last_depth = 0;
            let mut last_sigmoid = 0;
            let mut last_tie = 0;
            let mut last_relu = 0;
            for delta in deltas {
                let p = PermutationParams::select(delta, n, true).unwrap();
                let depth = p.circuit_depth().unwrap();
                assert!(p.sigmoid_degree >= last_sigmoid);
                assert!(p.tie_degree >= last_tie);
                assert!(depth >= last_depth);
                last_sigmoid = p.sigmoid_degree;
                last_tie = p.tie_degree;
                last_depth = depth;

                let net = NetworkParams::select(delta).unwrap();
                assert!(net.relu_degree >= last_relu);
                last_relu = net.relu_degree;
            }
        }
    }

    #[test]
    fn depth_matches_component_costs() {
        // δ = 0.05, n = 4, tie-break on: sigmoid 1006 costs 10, tie branch
        // 495 + triangular mult costs 10, sinc 59 costs 6, final mult 1.
        let p = PermutationParams::select(0.05, 4, true).unwrap();
        assert_eq!(p.circuit_depth().unwrap(), 17);
        let without_ties = PermutationParams::select(0.05, 4, false).unwrap();
        assert_eq!(without_ties.circuit_depth().unwrap(), 17);

        let net = NetworkParams::select(0.05).unwrap();
        assert_eq!(net.layer_depth().unwrap(), 10);
    }

    #[test]
    fn sharpening_enabled_for_large_vectors() {
        assert_eq!(PermutationParams::select(0.1, 16, false).unwrap().sharpen_passes, 0);
        assert_eq!(PermutationParams::select(0.1, 32, false).unwrap().sharpen_passes, 1);
        assert_eq!(PermutationParams::select(0.1, 128, false).unwrap().sharpen_passes, 2);
    }
}
