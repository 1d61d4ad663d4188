//! Chebyshev-basis polynomial approximation.
//!
//! Coefficients are obtained by projection at the cosine nodes of the target
//! interval, the same construction CKKS libraries use for their function
//! evaluation, so the reference engine reproduces the approximation error a
//! real backend would exhibit.

use crate::FheError;

/// Paterson-Stockmeyer evaluation cost: largest supported degree per bracket
/// and the multiplicative levels its evaluation consumes.
const EVAL_COST: &[(usize, usize)] = &[
    (6, 3),
    (14, 4),
    (28, 5),
    (60, 6),
    (120, 7),
    (248, 8),
    (496, 9),
    (1008, 10),
    (2032, 11),
];

/// Multiplicative levels consumed by evaluating a degree-`degree` Chebyshev
/// polynomial with the Paterson-Stockmeyer algorithm.
pub fn evaluation_depth(degree: usize) -> Result<usize, FheError> {
    if degree == 0 {
        return Err(FheError::InvalidDegree(degree));
    }
    for &(max_degree, cost) in EVAL_COST {
        if degree <= max_degree {
            return Ok(cost);
        }
    }
    // Beyond the tabulated brackets the cost keeps growing by one level per
    // doubling of the degree.
    Ok(degree.ilog2() as usize + 1)
}

/// Chebyshev coefficients of `f` over `[a, b]`, by projection at the
/// `degree + 1` cosine nodes. The first coefficient carries the conventional
/// factor two and is halved again at evaluation time.
pub fn coefficients(f: &dyn Fn(f64) -> f64, a: f64, b: f64, degree: usize) -> Vec<f64> {
    let count = degree + 1;
    let half_width = 0.5 * (b - a);
    let center = 0.5 * (b + a);
    let pi_by_deg = std::f64::consts::PI / count as f64;

    let nodes: Vec<f64> = (0..count)
        .map(|i| f((pi_by_deg * (i as f64 + 0.5)).cos() * half_width + center))
        .collect();

    let factor = 2.0 / count as f64;
    (0..count)
        .map(|i| {
            let acc: f64 = nodes
                .iter()
                .enumerate()
                .map(|(j, value)| value * (pi_by_deg * i as f64 * (j as f64 + 0.5)).cos())
                .sum();
            acc * factor
        })
        .collect()
}

/// Evaluates a Chebyshev series at `x` with the Clenshaw recurrence, after
/// mapping `[a, b]` onto `[-1, 1]`.
pub fn evaluate(coeffs: &[f64], a: f64, b: f64, x: f64) -> f64 {
    let y = (2.0 * x - a - b) / (b - a);
    let two_y = 2.0 * y;
    let mut b1 = 0.0;
    let mut b2 = 0.0;
    for &c in coeffs.iter().skip(1).rev() {
        let next = two_y * b1 - b2 + c;
        b2 = b1;
        b1 = next;
    }
    y * b1 - b2 + 0.5 * coeffs[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_low_degree_polynomials() {
        let f = |x: f64| 3.0 * x * x - 0.5 * x + 1.0;
        let coeffs = coefficients(&f, -1.0, 1.0, 8);
        for i in 0..=20 {
            let x = -1.0 + 0.1 * i as f64;
            assert!((evaluate(&coeffs, -1.0, 1.0, x) - f(x)).abs() < 1e-12);
        }
    }

    #[test]
    fn relu_approximation_error_is_small() {
        let relu = |x: f64| x.max(0.0);
        let coeffs = coefficients(&relu, -1.0, 1.0, 495);
        let mut worst: f64 = 0.0;
        for i in 0..=1000 {
            let x = -1.0 + 0.002 * i as f64;
            worst = worst.max((evaluate(&coeffs, -1.0, 1.0, x) - relu(x)).abs());
        }
        assert!(worst < 5e-3, "worst error {worst}");
    }

    #[test]
    fn shifted_domain() {
        let f = |x: f64| x.sin();
        let coeffs = coefficients(&f, 0.0, 2.0, 31);
        assert!((evaluate(&coeffs, 0.0, 2.0, 1.3) - 1.3f64.sin()).abs() < 1e-9);
    }

    #[test]
    fn evaluation_depth_brackets() {
        assert_eq!(evaluation_depth(5).unwrap(), 3);
        assert_eq!(evaluation_depth(59).unwrap(), 6);
        assert_eq!(evaluation_depth(119).unwrap(), 7);
        assert_eq!(evaluation_depth(247).unwrap(), 8);
        assert_eq!(evaluation_depth(495).unwrap(), 9);
        assert_eq!(evaluation_depth(1006).unwrap(), 10);
        assert_eq!(evaluation_depth(16000).unwrap(), 14);
        assert_eq!(evaluation_depth(32000).unwrap(), 15);
        assert!(evaluation_depth(0).is_err());
    }

    #[test]
    fn evaluation_depth_is_monotone() {
        let mut last = 0;
        for degree in 1..4096 {
            let cost = evaluation_depth(degree).unwrap();
            assert!(cost >= last, "cost dropped at degree {degree}");
            last = cost;
        }
    }
}
