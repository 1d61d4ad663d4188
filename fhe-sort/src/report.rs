//! Accuracy evaluation of a decrypted sort result.
//!
//! Approximation loss is not an error condition; it is an expected,
//! quantifiable output of the circuit, so the pipeline ends by measuring it
//! against the clear-sorted input.

/// Comparison of a decrypted result against the clear-domain sort.
#[derive(Clone, Debug)]
pub struct SortReport {
    /// The input, sorted in the clear.
    pub expected: Vec<f64>,
    /// The decrypted (descaled) circuit output.
    pub obtained: Vec<f64>,
    /// Positions within δ of the expected value.
    pub corrects: usize,
    /// Largest per-position deviation.
    pub infinity_norm: f64,
    /// −log2 of the infinity norm: the bits of precision achieved.
    pub precision_bits: f64,
}

impl SortReport {
    /// Measures `obtained` against the sorted `input`, counting positions
    /// that landed within `delta`.
    pub fn evaluate(input: &[f64], obtained: &[f64], delta: f64) -> Self {
        let mut expected = input.to_vec();
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let infinity_norm = expected
            .iter()
            .zip(obtained)
            .map(|(e, o)| (e - o).abs())
            .fold(0.0, f64::max);
        let corrects = expected
            .iter()
            .zip(obtained)
            .filter(|(e, o)| (*e - *o).abs() < delta)
            .count();
        Self {
            expected,
            obtained: obtained.to_vec(),
            corrects,
            infinity_norm,
            precision_bits: -infinity_norm.log2(),
        }
    }
}

/// Extracts every `stride`-th slot of a decrypted n²-slot grid, the layout
/// the rank/permutation circuit leaves its result in.
pub fn strided(decoded: &[f64], stride: usize) -> Vec<f64> {
    decoded.iter().step_by(stride).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_positions_within_delta() {
        let report = SortReport::evaluate(
            &[0.4, 0.1, 0.3, 0.2],
            &[0.11, 0.19, 0.36, 0.41],
            0.05,
        );
        assert_eq!(report.expected, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(report.corrects, 3);
        assert!((report.infinity_norm - 0.06).abs() < 1e-12);
    }

    #[test]
    fn precision_bits_reflect_the_worst_slot() {
        let report = SortReport::evaluate(&[0.1, 0.2], &[0.1, 0.2 + 0.25], 0.5);
        assert!((report.precision_bits - 2.0).abs() < 1e-9);
    }

    #[test]
    fn strided_extraction() {
        let grid = [1.0, 0.0, 2.0, 0.0, 3.0, 0.0];
        assert_eq!(strided(&grid, 2), vec![1.0, 2.0, 3.0]);
    }
}
