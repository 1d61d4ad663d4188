use crate::ciphertext::{EncryptedVector, Plaintext};
use crate::engine::FheEngine;
use crate::{FheError, chebyshev};

/// Security profile of a context. The plain reference engine only carries
/// this as metadata (ring dimension, log output); a real backend derives its
/// lattice parameters from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityProfile {
    /// Reduced-security parameters for fast iteration.
    Toy,
    /// 128-bit classical security.
    Secure128,
}

/// Levels consumed by one simulated noise refresh, standing in for the
/// bootstrapping budget a CKKS context reserves on top of the user circuit.
const BOOTSTRAP_DEPTH: usize = 13;

/// Effectively unlimited depth, for the exact evaluation mode used by
/// clear-domain tests.
const UNBOUNDED: usize = usize::MAX / 2;

/// Cleartext reference implementation of [`FheEngine`].
///
/// Slot arithmetic is exact, but polynomial approximation and depth
/// accounting are real: `approximate` evaluates an actual Chebyshev
/// projection of the requested degree, and every multiplication consumes a
/// level of the provisioned budget, failing with
/// [`FheError::DepthExhausted`] when the circuit outgrows its context. In
/// [`PlainEngine::exact`] mode the target function is applied directly and
/// depth is unlimited, which is what the clear-domain correctness tests run
/// against.
pub struct PlainEngine {
    slot_count: usize,
    depth: usize,
    refresh_level: usize,
    bootstrapping: bool,
    exact: bool,
}

impl PlainEngine {
    /// Context for a circuit evaluated in one pass, without noise refresh.
    pub fn setup(slot_count: usize, depth: usize, profile: SecurityProfile) -> Self {
        tracing::info!(
            slot_count,
            depth,
            ring_dim = ring_dimension(profile, slot_count),
            ?profile,
            "generated evaluation context"
        );
        Self {
            slot_count,
            depth,
            refresh_level: 0,
            bootstrapping: false,
            exact: false,
        }
    }

    /// Context for an iterated circuit that refreshes noise between passes.
    /// `pass_levels` is the depth one pass consumes; the total provisioned
    /// depth additionally covers the refresh itself, and
    /// [`FheEngine::bootstrap`] restores a ciphertext to the level where the
    /// full pass budget is available again.
    pub fn setup_with_bootstrap(
        slot_count: usize,
        pass_levels: usize,
        profile: SecurityProfile,
    ) -> Self {
        let depth = pass_levels + 1 + BOOTSTRAP_DEPTH;
        tracing::info!(
            slot_count,
            depth,
            pass_levels,
            ring_dim = ring_dimension(profile, slot_count),
            ?profile,
            "generated evaluation context with bootstrapping"
        );
        Self {
            slot_count,
            depth,
            refresh_level: BOOTSTRAP_DEPTH,
            bootstrapping: true,
            exact: false,
        }
    }

    /// Context that evaluates nonlinear functions exactly instead of through
    /// polynomial approximation, with unlimited depth.
    pub fn exact(slot_count: usize) -> Self {
        Self {
            slot_count,
            depth: UNBOUNDED,
            refresh_level: 0,
            bootstrapping: true,
            exact: true,
        }
    }

    /// The level fresh ciphertexts of an iterated circuit start at, equal to
    /// the level a noise refresh restores.
    pub fn refresh_level(&self) -> usize {
        self.refresh_level
    }

    fn lift(&self, slots: Vec<f64>, level: usize) -> Result<EncryptedVector, FheError> {
        if level > self.depth {
            return Err(FheError::DepthExhausted {
                required: level,
                available: self.depth,
            });
        }
        Ok(EncryptedVector { slots, level })
    }

    fn pack(&self, values: &[f64]) -> Vec<f64> {
        let mut slots = values.to_vec();
        slots.resize(self.slot_count, 0.0);
        slots
    }
}

fn ring_dimension(profile: SecurityProfile, slot_count: usize) -> usize {
    match profile {
        SecurityProfile::Toy => (2 * slot_count).next_power_of_two().max(1 << 12),
        SecurityProfile::Secure128 => 1 << 16,
    }
}

impl FheEngine for PlainEngine {
    type Ciphertext = EncryptedVector;
    type Plaintext = Plaintext;

    fn slot_count(&self) -> usize {
        self.slot_count
    }

    fn circuit_depth(&self) -> usize {
        self.depth
    }

    fn encode(&self, values: &[f64], level: usize) -> Plaintext {
        Plaintext {
            slots: self.pack(values),
            level,
        }
    }

    fn encode_repeated(&self, value: f64, level: usize) -> Plaintext {
        Plaintext {
            slots: vec![value; self.slot_count],
            level,
        }
    }

    fn encrypt(&self, values: &[f64], level: usize) -> EncryptedVector {
        EncryptedVector {
            slots: self.pack(values),
            level,
        }
    }

    fn decrypt(&self, ct: &EncryptedVector) -> Vec<f64> {
        ct.slots.clone()
    }

    fn level(&self, ct: &EncryptedVector) -> usize {
        ct.level
    }

    fn add(&self, a: &EncryptedVector, b: &EncryptedVector) -> EncryptedVector {
        assert_eq!(a.slots.len(), b.slots.len());
        EncryptedVector {
            slots: a.slots.iter().zip(&b.slots).map(|(x, y)| x + y).collect(),
            level: a.level.max(b.level),
        }
    }

    fn add_plain(&self, a: &EncryptedVector, p: &Plaintext) -> EncryptedVector {
        assert_eq!(a.slots.len(), p.slots.len());
        EncryptedVector {
            slots: a.slots.iter().zip(&p.slots).map(|(x, y)| x + y).collect(),
            level: a.level.max(p.level),
        }
    }

    fn add_scalar(&self, a: &EncryptedVector, value: f64) -> EncryptedVector {
        EncryptedVector {
            slots: a.slots.iter().map(|x| x + value).collect(),
            level: a.level,
        }
    }

    fn add_tree(&self, terms: &[EncryptedVector]) -> EncryptedVector {
        assert!(!terms.is_empty());
        let mut layer = terms.to_vec();
        while layer.len() > 1 {
            layer = layer
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => self.add(a, b),
                    [a] => a.clone(),
                    _ => unreachable!(),
                })
                .collect();
        }
        layer.pop().expect("at least one term")
    }

    fn sub(&self, a: &EncryptedVector, b: &EncryptedVector) -> EncryptedVector {
        assert_eq!(a.slots.len(), b.slots.len());
        EncryptedVector {
            slots: a.slots.iter().zip(&b.slots).map(|(x, y)| x - y).collect(),
            level: a.level.max(b.level),
        }
    }

    fn sub_plain(&self, a: &EncryptedVector, p: &Plaintext) -> EncryptedVector {
        assert_eq!(a.slots.len(), p.slots.len());
        EncryptedVector {
            slots: a.slots.iter().zip(&p.slots).map(|(x, y)| x - y).collect(),
            level: a.level.max(p.level),
        }
    }

    fn mul(&self, a: &EncryptedVector, b: &EncryptedVector) -> Result<EncryptedVector, FheError> {
        assert_eq!(a.slots.len(), b.slots.len());
        let slots = a.slots.iter().zip(&b.slots).map(|(x, y)| x * y).collect();
        self.lift(slots, a.level.max(b.level) + 1)
    }

    fn mul_plain(&self, a: &EncryptedVector, p: &Plaintext) -> Result<EncryptedVector, FheError> {
        assert_eq!(a.slots.len(), p.slots.len());
        let slots = a.slots.iter().zip(&p.slots).map(|(x, y)| x * y).collect();
        self.lift(slots, a.level.max(p.level) + 1)
    }

    fn mul_scalar(&self, a: &EncryptedVector, value: f64) -> Result<EncryptedVector, FheError> {
        let slots = a.slots.iter().map(|x| x * value).collect();
        self.lift(slots, a.level + 1)
    }

    fn rotate(&self, a: &EncryptedVector, offset: i64) -> EncryptedVector {
        let len = a.slots.len() as i64;
        let slots = (0..len)
            .map(|i| a.slots[(i + offset).rem_euclid(len) as usize])
            .collect();
        EncryptedVector {
            slots,
            level: a.level,
        }
    }

    fn bootstrap(&self, a: &EncryptedVector) -> Result<EncryptedVector, FheError> {
        if !self.bootstrapping {
            return Err(FheError::BootstrapUnavailable);
        }
        Ok(EncryptedVector {
            slots: a.slots.clone(),
            level: self.refresh_level,
        })
    }

    fn approximate(
        &self,
        a: &EncryptedVector,
        f: &dyn Fn(f64) -> f64,
        domain: (f64, f64),
        degree: usize,
    ) -> Result<EncryptedVector, FheError> {
        if self.exact {
            return Ok(EncryptedVector {
                slots: a.slots.iter().map(|&x| f(x)).collect(),
                level: a.level,
            });
        }
        let cost = chebyshev::evaluation_depth(degree)?;
        let coeffs = chebyshev::coefficients(f, domain.0, domain.1, degree);
        let slots = a
            .slots
            .iter()
            .map(|&x| chebyshev::evaluate(&coeffs, domain.0, domain.1, x))
            .collect();
        self.lift(slots, a.level + cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_pads_and_truncates() {
        let engine = PlainEngine::setup(4, 8, SecurityProfile::Toy);
        assert_eq!(engine.encode(&[1.0, 2.0], 0).slots, vec![1.0, 2.0, 0.0, 0.0]);
        let long = engine.encode(&[1.0, 2.0, 3.0, 4.0, 5.0], 0);
        assert_eq!(long.slots, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn rotate_wraps_in_both_directions() {
        let engine = PlainEngine::setup(4, 8, SecurityProfile::Toy);
        let ct = engine.encrypt(&[1.0, 2.0, 3.0, 4.0], 0);
        assert_eq!(engine.rotate(&ct, 1).slots, vec![2.0, 3.0, 4.0, 1.0]);
        assert_eq!(engine.rotate(&ct, -1).slots, vec![4.0, 1.0, 2.0, 3.0]);
        assert_eq!(engine.rotate(&ct, 5).slots, vec![2.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn multiplication_consumes_depth_until_exhaustion() {
        let engine = PlainEngine::setup(2, 2, SecurityProfile::Toy);
        let ct = engine.encrypt(&[1.0, 2.0], 0);
        let ct = engine.mul(&ct, &ct).unwrap();
        let ct = engine.mul(&ct, &ct).unwrap();
        assert_eq!(ct.level(), 2);
        assert!(matches!(
            engine.mul(&ct, &ct),
            Err(FheError::DepthExhausted { required: 3, available: 2 })
        ));
    }

    #[test]
    fn bootstrap_restores_refresh_level() {
        let engine = PlainEngine::setup_with_bootstrap(2, 5, SecurityProfile::Toy);
        let ct = engine.encrypt(&[1.0, 2.0], engine.refresh_level());
        let ct = engine.mul(&ct, &ct).unwrap();
        assert_eq!(ct.level(), engine.refresh_level() + 1);
        let ct = engine.bootstrap(&ct).unwrap();
        assert_eq!(ct.level(), engine.refresh_level());
        assert_eq!(ct.slots, vec![1.0, 4.0]);
    }

    #[test]
    fn bootstrap_requires_capable_context() {
        let engine = PlainEngine::setup(2, 4, SecurityProfile::Toy);
        let ct = engine.encrypt(&[1.0, 2.0], 0);
        assert!(matches!(
            engine.bootstrap(&ct),
            Err(FheError::BootstrapUnavailable)
        ));
    }

    #[test]
    fn approximate_charges_the_degree_cost() {
        let engine = PlainEngine::setup(4, 10, SecurityProfile::Toy);
        let ct = engine.encrypt(&[-0.5, -0.1, 0.1, 0.5], 0);
        let relu = engine
            .approximate(&ct, &|x| x.max(0.0), (-1.0, 1.0), 59)
            .unwrap();
        assert_eq!(relu.level(), 6);
        for (got, want) in relu.slots.iter().zip([0.0, 0.0, 0.1, 0.5]) {
            assert!((got - want).abs() < 0.05);
        }
    }

    #[test]
    fn exact_mode_applies_the_function_directly() {
        let engine = PlainEngine::exact(4);
        let ct = engine.encrypt(&[-1.0, -0.25, 0.25, 1.0], 0);
        let step = engine
            .approximate(&ct, &|x| if x > 0.0 { 1.0 } else { 0.0 }, (-1.0, 1.0), 1)
            .unwrap();
        assert_eq!(step.slots, vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(step.level(), 0);
    }

    #[test]
    fn rotate_sum_collapses_strided_blocks() {
        let engine = PlainEngine::setup(8, 4, SecurityProfile::Toy);
        let ct = engine.encrypt(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 0);
        // distance 2, two doubling steps: every slot ends up holding the sum
        // of the four slots at stride 2 starting from it.
        let summed = engine.rotate_sum(&ct, 2, 2);
        assert_eq!(summed.slots[0], 1.0 + 3.0 + 5.0 + 7.0);
        assert_eq!(summed.slots[1], 2.0 + 4.0 + 6.0 + 8.0);
    }

    #[test]
    fn add_tree_matches_sequential_sum() {
        let engine = PlainEngine::setup(2, 4, SecurityProfile::Toy);
        let terms: Vec<_> = (1..=5)
            .map(|i| engine.encrypt(&[i as f64, 2.0 * i as f64], 0))
            .collect();
        let total = engine.add_tree(&terms);
        assert_eq!(total.slots, vec![15.0, 30.0]);
    }
}
