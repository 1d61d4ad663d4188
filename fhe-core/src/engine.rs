use crate::FheError;

/// The capability set of an approximate homomorphic-arithmetic backend.
///
/// All methods take `&self`: an engine is a shared, read-only handle to the
/// evaluation context and its key material, injected into each circuit
/// component at construction and never duplicated or mutated after setup.
/// Operands of binary operations must share the engine's slot count;
/// mismatched levels are reconciled by the backend.
pub trait FheEngine {
    /// The opaque ciphertext type of the backend.
    type Ciphertext: Clone + Send + Sync;
    /// The encoded-but-unencrypted slot vector type of the backend.
    type Plaintext: Clone;

    /// Number of SIMD slots every ciphertext of this context carries.
    fn slot_count(&self) -> usize;

    /// Total multiplicative levels provisioned at context setup.
    fn circuit_depth(&self) -> usize;

    /// Packs a sequence of reals into a plaintext at the given level. The
    /// input is zero-padded or truncated to the slot count.
    fn encode(&self, values: &[f64], level: usize) -> Self::Plaintext;

    /// Encodes a single value repeated across all slots.
    fn encode_repeated(&self, value: f64, level: usize) -> Self::Plaintext;

    /// Encrypts a sequence of reals at the given level.
    fn encrypt(&self, values: &[f64], level: usize) -> Self::Ciphertext;

    /// Recovers the approximate slot values. Requires the secret key.
    fn decrypt(&self, ct: &Self::Ciphertext) -> Vec<f64>;

    /// Multiplicative levels the ciphertext has consumed.
    fn level(&self, ct: &Self::Ciphertext) -> usize;

    /// Pointwise sum of two ciphertexts.
    fn add(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Self::Ciphertext;

    /// Pointwise sum of a ciphertext and a plaintext.
    fn add_plain(&self, a: &Self::Ciphertext, p: &Self::Plaintext) -> Self::Ciphertext;

    /// Adds a scalar to every slot.
    fn add_scalar(&self, a: &Self::Ciphertext, value: f64) -> Self::Ciphertext;

    /// Sums several ciphertexts in a balanced tree.
    fn add_tree(&self, terms: &[Self::Ciphertext]) -> Self::Ciphertext;

    /// Pointwise difference of two ciphertexts.
    fn sub(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Self::Ciphertext;

    /// Pointwise difference of a ciphertext and a plaintext.
    fn sub_plain(&self, a: &Self::Ciphertext, p: &Self::Plaintext) -> Self::Ciphertext;

    /// Pointwise product of two ciphertexts. Consumes one level.
    fn mul(
        &self,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, FheError>;

    /// Pointwise product of a ciphertext and a plaintext. Consumes one level.
    fn mul_plain(
        &self,
        a: &Self::Ciphertext,
        p: &Self::Plaintext,
    ) -> Result<Self::Ciphertext, FheError>;

    /// Multiplies every slot by a scalar. Consumes one level.
    fn mul_scalar(&self, a: &Self::Ciphertext, value: f64) -> Result<Self::Ciphertext, FheError>;

    /// Cyclic shift of slot contents: slot `i` of the result holds slot
    /// `(i + offset) mod slot_count` of the input. Negative offsets wrap.
    fn rotate(&self, a: &Self::Ciphertext, offset: i64) -> Self::Ciphertext;

    /// Noise refresh: restores the ciphertext to the post-refresh level
    /// configured at setup, making the full per-layer budget available
    /// again.
    fn bootstrap(&self, a: &Self::Ciphertext) -> Result<Self::Ciphertext, FheError>;

    /// Evaluates a bounded-degree Chebyshev approximation of `f` over the
    /// closed `domain`, consuming depth proportional to the degree.
    fn approximate(
        &self,
        a: &Self::Ciphertext,
        f: &dyn Fn(f64) -> f64,
        domain: (f64, f64),
        degree: usize,
    ) -> Result<Self::Ciphertext, FheError>;

    /// Doubling rotate-and-add: after `steps` iterations every slot holds
    /// the sum of `2^steps` consecutive slots spaced `distance` apart.
    fn rotate_sum(&self, ct: &Self::Ciphertext, distance: usize, steps: u32) -> Self::Ciphertext {
        let mut acc = ct.clone();
        for step in 0..steps {
            let rotated = self.rotate(&acc, (distance << step) as i64);
            acc = self.add(&acc, &rotated);
        }
        acc
    }
}
