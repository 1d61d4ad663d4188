/// A SIMD-packed ciphertext: a fixed number of slots, each holding one
/// approximate real, together with the number of multiplicative levels
/// consumed so far.
///
/// Instances are never mutated in place; every arithmetic operation on the
/// engine produces a fresh vector. The slot data is only observable through
/// [`crate::FheEngine::decrypt`].
#[derive(Clone, Debug)]
pub struct EncryptedVector {
    pub(crate) slots: Vec<f64>,
    pub(crate) level: usize,
}

impl EncryptedVector {
    /// Number of SIMD slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Multiplicative levels consumed since encryption or the last refresh.
    pub fn level(&self) -> usize {
        self.level
    }
}

/// An encoded, unencrypted slot vector, used for masks and constant grids.
#[derive(Clone, Debug)]
pub struct Plaintext {
    pub(crate) slots: Vec<f64>,
    pub(crate) level: usize,
}

impl Plaintext {
    /// Number of SIMD slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Encoding level, matched to the ciphertext it will be combined with.
    pub fn level(&self) -> usize {
        self.level
    }
}
