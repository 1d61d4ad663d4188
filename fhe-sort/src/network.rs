//! Bitonic comparison-network sorting.

use fhe_core::{FheEngine, FheError};

use crate::masks::layer_masks;
use crate::params::NetworkParams;

/// Evaluates a bitonic sorting network homomorphically on an n-slot
/// ciphertext, n = 2^k, as k(k+1)/2 compare-exchange layers with a noise
/// refresh after every layer except the last.
pub struct ComparisonNetworkSorter<'a, E> {
    engine: &'a E,
    params: NetworkParams,
}

impl<'a, E: FheEngine> ComparisonNetworkSorter<'a, E> {
    /// Creates a sorter over a shared engine handle.
    pub fn new(engine: &'a E, params: NetworkParams) -> Self {
        Self { engine, params }
    }

    /// Sorts the encrypted vector ascending.
    ///
    /// Layer (stage i, round j) compares slots at distance 2^(i-j). Depth
    /// exhaustion inside a layer is propagated: it means the context was
    /// provisioned for a different schedule and nothing can be salvaged
    /// mid-circuit.
    pub fn sort(&self, input: &E::Ciphertext) -> Result<E::Ciphertext, FheError> {
        let n = self.engine.slot_count();
        debug_assert!(n.is_power_of_two());
        let k = n.ilog2();
        let total_layers = (k * (k + 1) / 2) as usize;

        let mut current = input.clone();
        let mut layer = 1usize;
        for stage in 0..k {
            for round in 0..=stage {
                current = self.compare_exchange(&current, stage, round)?;
                if layer < total_layers {
                    current = self.engine.bootstrap(&current)?;
                }
                tracing::debug!(layer, total_layers, stage, round, "layer evaluated");
                layer += 1;
            }
        }
        Ok(current)
    }

    /// One SIMD compare-exchange layer.
    ///
    /// A single ReLU evaluation yields the pairwise minimum m1; the
    /// complementary maximum and the two candidates aligned with the
    /// opposite rotation follow algebraically. The four layer masks then
    /// route, per slot, whichever candidate the bitonic wiring selects.
    fn compare_exchange(
        &self,
        input: &E::Ciphertext,
        stage: u32,
        round: u32,
    ) -> Result<E::Ciphertext, FheError> {
        let e = self.engine;
        let distance = 1i64 << (stage - round);

        let rot_pos = e.rotate(input, distance);
        let rot_neg = e.rotate(input, -distance);

        // min(x, y) = x - relu(x - y)
        let relu = e.approximate(
            &e.sub(input, &rot_pos),
            &|x| x.max(0.0),
            (-1.0, 1.0),
            self.params.relu_degree,
        )?;
        let m1 = e.sub(input, &relu);
        let m3 = e.sub(&e.add(input, &rot_pos), &m1);
        let m4 = e.rotate(&m1, -distance);
        let m2 = e.sub(&e.add(input, &rot_neg), &m4);

        let level = e.level(&m1);
        let masks = layer_masks(e.slot_count(), stage, round, 1.0);
        let terms = [m1, m2, m3, m4]
            .into_iter()
            .zip(masks)
            .map(|(candidate, mask)| e.mul_plain(&candidate, &e.encode(&mask, level)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(e.add_tree(&terms))
    }
}
