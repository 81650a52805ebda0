//! Inverted dropout: mask sampling and the rescale shared by the forward
//! and backward passes.

use ndarray::prelude::*;
use rand::Rng;

/// Draw a 0/1 keep mask, elementwise Bernoulli(keep_prob).
///
/// The raw draw is what gets cached, so the paired backward call replays
/// exactly the mask the forward pass applied; the 1/keep_prob rescale lives
/// in [`apply`].
pub(crate) fn sample_mask<R: Rng + ?Sized>(
    dim: (usize, usize),
    keep_prob: f64,
    rng: &mut R,
) -> Array2<f64> {
    Array2::from_shape_fn(dim, |_| if rng.gen_bool(keep_prob) { 1.0 } else { 0.0 })
}

/// Zero the dropped units and rescale survivors by 1/keep_prob, in place.
pub(crate) fn apply(values: &mut Array2<f64>, mask: &Array2<f64>, keep_prob: f64) {
    *values *= mask;
    *values /= keep_prob;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn mask_entries_are_zero_or_one() {
        let mut rng = StdRng::seed_from_u64(11);
        let mask = sample_mask((20, 20), 0.7, &mut rng);
        assert!(mask.iter().all(|&v| v == 0.0 || v == 1.0));
        let kept = mask.sum();
        // 400 draws at p = 0.7; anything far outside this band means the
        // sampler is not Bernoulli(keep_prob)
        assert!((200.0..360.0).contains(&kept), "kept {kept} of 400");
    }

    #[test]
    fn apply_rescales_survivors() {
        let mut v = array![[2.0, 4.0], [6.0, 8.0]];
        let mask = array![[1.0, 0.0], [0.0, 1.0]];
        apply(&mut v, &mask, 0.5);
        assert_eq!(v, array![[4.0, 0.0], [0.0, 16.0]]);
    }
}
