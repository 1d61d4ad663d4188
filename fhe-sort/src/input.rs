//! Input-vector parsing, validation and generation.

use itertools::Itertools;
use rand::Rng;
use rand::seq::SliceRandom;

/// Fallback δ when the input carries no usable gap (fewer than two distinct
/// values and no explicit override).
pub const DEFAULT_DELTA: f64 = 0.01;

/// Errors in the cleartext input, detected before any cryptographic work.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The input held no values.
    #[error("the input vector is empty")]
    Empty,
    /// The input length must be a power of two.
    #[error("the number of values must be a power of two, got {0}")]
    NotPowerOfTwo(usize),
    /// A token did not parse as a real number.
    #[error("could not parse {0:?} as a number")]
    Malformed(String),
}

/// Parses a whitespace- and/or comma-separated list of reals, with optional
/// surrounding brackets.
pub fn parse_vector(text: &str) -> Result<Vec<f64>, InputError> {
    let values = text
        .split(|c: char| c.is_whitespace() || c == ',' || c == '[' || c == ']')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| InputError::Malformed(token.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(values)
}

/// Checks that `len` is a power of two and returns its log2.
pub fn validate_length(len: usize) -> Result<u32, InputError> {
    if len == 0 {
        Err(InputError::Empty)
    } else if !len.is_power_of_two() {
        Err(InputError::NotPowerOfTwo(len))
    } else {
        Ok(len.ilog2())
    }
}

/// Generates `n` values in [0, 1) spaced `delta` apart, shuffled. When
/// n·delta exceeds one the grid is too small and the vector will contain
/// duplicates, which is exactly what exercises the tie-break path.
pub fn generate_spaced(n: usize, delta: f64, rng: &mut impl Rng) -> Vec<f64> {
    let mut values: Vec<f64> = Vec::new();
    let mut x = 0.0;
    while x < 1.0 && values.len() < n {
        values.push(x);
        x += delta;
    }
    while values.len() < n {
        let duplicate = values[rng.gen_range(0..values.len())];
        values.push(duplicate);
    }
    values.shuffle(rng);
    values.truncate(n);
    values
}

/// The smallest positive pairwise gap of the input, the δ a sort of this
/// vector has to resolve. Falls back to [`DEFAULT_DELTA`] when every value
/// is identical.
pub fn min_gap(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let gap = sorted
        .iter()
        .tuple_windows()
        .map(|(a, b)| b - a)
        .filter(|gap| *gap > 0.0)
        .fold(f64::INFINITY, f64::min);
    if gap.is_finite() { gap.min(1.0) } else { DEFAULT_DELTA }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn parses_separators_and_brackets() {
        assert_eq!(
            parse_vector("[1.2, 3.4, 2.1, 4.0]").unwrap(),
            vec![1.2, 3.4, 2.1, 4.0]
        );
        assert_eq!(parse_vector("0.5 0.25\n0.75").unwrap(), vec![0.5, 0.25, 0.75]);
        assert!(matches!(parse_vector("1.0, x"), Err(InputError::Malformed(_))));
        assert!(matches!(parse_vector("  "), Err(InputError::Empty)));
    }

    #[test]
    fn rejects_non_power_of_two_lengths() {
        assert!(matches!(validate_length(12), Err(InputError::NotPowerOfTwo(12))));
        assert_eq!(validate_length(16).unwrap(), 4);
    }

    #[test]
    fn spaced_generation_covers_the_unit_interval() {
        let mut rng = StdRng::seed_from_u64(3);
        let values = generate_spaced(8, 0.1, &mut rng);
        assert_eq!(values.len(), 8);
        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn spaced_generation_duplicates_when_grid_is_small() {
        let mut rng = StdRng::seed_from_u64(3);
        let values = generate_spaced(8, 0.25, &mut rng);
        let mut unique = values.clone();
        unique.sort_by(|a, b| a.partial_cmp(b).unwrap());
        unique.dedup();
        assert!(unique.len() < values.len());
    }

    #[test]
    fn min_gap_ignores_duplicates() {
        assert!((min_gap(&[0.2, 0.1, 0.2, 0.5]) - 0.1).abs() < 1e-12);
        assert_eq!(min_gap(&[0.3, 0.3, 0.3]), DEFAULT_DELTA);
    }
}
