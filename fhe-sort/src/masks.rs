//! Plaintext selector masks for the bitonic network.
//!
//! A compare-exchange layer produces four candidate vectors m1..m4; the
//! layer's wiring decides, per slot, which candidate carries the value that
//! belongs there. That routing is a set of four plaintext 0/`mask_value`
//! vectors which partition the slots: pairwise disjoint, summing to the
//! all-ones vector.

/// The four selector masks of layer (`stage`, `round`) of a bitonic network
/// over `slot_count` slots, with `stage` in `0..k` and `round` in
/// `0..=stage`.
///
/// Slots alternate in sub-blocks of `2^(stage - round)` (the compared
/// distance of this layer), repeated `2^round` times; ascending regions pick
/// from m1/m2, descending regions from m3/m4.
pub fn layer_masks(
    slot_count: usize,
    stage: u32,
    round: u32,
    mask_value: f64,
) -> [Vec<f64>; 4] {
    debug_assert!(round <= stage);
    let sub = 1usize << (stage - round);
    let reps = 1usize << round;
    let half = 2 * sub * reps;

    let mut masks: [Vec<f64>; 4] = std::array::from_fn(|_| Vec::with_capacity(slot_count));
    let mut block = 0;
    loop {
        for _ in 0..reps {
            extend(&mut masks, 0, sub, mask_value);
            extend(&mut masks, 1, sub, mask_value);
        }
        if (block + 1) * half >= slot_count {
            break;
        }
        for _ in 0..reps {
            extend(&mut masks, 2, sub, mask_value);
            extend(&mut masks, 3, sub, mask_value);
        }
        if (block + 1) * 2 * half >= slot_count {
            break;
        }
        block += 1;
    }
    debug_assert!(masks.iter().all(|m| m.len() == slot_count));
    masks
}

fn extend(masks: &mut [Vec<f64>; 4], selected: usize, len: usize, mask_value: f64) {
    for (index, mask) in masks.iter_mut().enumerate() {
        let value = if index == selected { mask_value } else { 0.0 };
        mask.extend(std::iter::repeat_n(value, len));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_partition_the_slots() {
        // Disjoint with element-wise sum one, for every layer of every
        // network size in the tested range.
        for k in 2..=6u32 {
            let n = 1usize << k;
            for stage in 0..k {
                for round in 0..=stage {
                    let masks = layer_masks(n, stage, round, 1.0);
                    for slot in 0..n {
                        let selected: Vec<_> =
                            masks.iter().filter(|m| m[slot] != 0.0).collect();
                        assert_eq!(
                            selected.len(),
                            1,
                            "slot {slot} of layer ({stage},{round}) at n={n}"
                        );
                        let sum: f64 = masks.iter().map(|m| m[slot]).sum();
                        assert_eq!(sum, 1.0);
                    }
                }
            }
        }
    }

    #[test]
    fn mask_value_is_applied() {
        let masks = layer_masks(8, 1, 0, 0.5);
        for mask in &masks {
            assert!(mask.iter().all(|&v| v == 0.0 || v == 0.5));
        }
    }

    #[test]
    fn first_layer_alternates_all_four_masks() {
        let [m1, m2, m3, m4] = layer_masks(4, 0, 0, 1.0);
        assert_eq!(m1, vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(m2, vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(m3, vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(m4, vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn final_round_uses_only_the_ascending_masks() {
        // The last stage's merge compares the whole vector in one direction,
        // so m3/m4 never select.
        let [m1, m2, m3, m4] = layer_masks(4, 1, 0, 1.0);
        assert_eq!(m1, vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(m2, vec![0.0, 0.0, 1.0, 1.0]);
        assert!(m3.iter().all(|&v| v == 0.0));
        assert!(m4.iter().all(|&v| v == 0.0));
    }
}
