//! The forward pass engine.

use ndarray::prelude::*;
use rand::{Rng, RngCore};

use crate::activation::Activation;
use crate::dropout;
use crate::error::{check_keep_prob, Error, Result};
use crate::params::Parameters;

/// Everything one forward pass computed, kept for the paired backward pass.
///
/// `activation(0)` is the raw input batch; `activation(l)` is layer l's
/// output *after* dropout, so the chain stored here is exactly the chain the
/// linear steps consumed. A cache belongs to a single iteration: build it,
/// hand it to `model_backward`, drop it.
#[derive(Debug)]
pub struct ForwardCache {
    pub(crate) a: Vec<Array2<f64>>,
    pub(crate) z: Vec<Array2<f64>>,
    pub(crate) masks: Vec<Option<Array2<f64>>>,
}

impl ForwardCache {
    /// A_l for l in 0..=L.
    pub fn activation(&self, l: usize) -> &Array2<f64> {
        &self.a[l]
    }

    /// Z_l for l in 1..=L.
    pub fn pre_activation(&self, l: usize) -> &Array2<f64> {
        assert!(l >= 1, "the input layer has no pre-activation");
        &self.z[l - 1]
    }

    /// The realized dropout mask of hidden layer l (1..L), if one was drawn.
    pub fn mask(&self, l: usize) -> Option<&Array2<f64>> {
        assert!(
            l >= 1 && l <= self.masks.len(),
            "no hidden layer {l} in this cache"
        );
        self.masks[l - 1].as_ref()
    }

    /// Number of cached activation entries, input batch included.
    pub fn num_activations(&self) -> usize {
        self.a.len()
    }
}

/// Run the network on `x` with no dropout. This is also the predict path.
///
/// Returns the output-layer activations A_L together with the cache of every
/// intermediate value.
pub fn model_forward(
    params: &Parameters,
    x: &Array2<f64>,
) -> Result<(Array2<f64>, ForwardCache)> {
    forward_impl(params, x, 1.0, None)
}

/// Run the network on `x`, dropping hidden units with probability
/// 1 − keep_prob (inverted dropout: survivors are rescaled by 1/keep_prob so
/// the expected magnitude is unchanged). The output layer is never dropped.
///
/// `keep_prob` must lie in (0, 1]. A value of 1 draws nothing from `rng`,
/// stores no masks, and is bit-identical to [`model_forward`].
pub fn model_forward_dropout<R: Rng>(
    params: &Parameters,
    x: &Array2<f64>,
    keep_prob: f64,
    rng: &mut R,
) -> Result<(Array2<f64>, ForwardCache)> {
    check_keep_prob(keep_prob)?;
    forward_impl(params, x, keep_prob, Some(rng))
}

fn forward_impl(
    params: &Parameters,
    x: &Array2<f64>,
    keep_prob: f64,
    mut rng: Option<&mut dyn RngCore>,
) -> Result<(Array2<f64>, ForwardCache)> {
    let depth = params.depth();
    let (n0, m) = x.dim();
    if n0 != params.input_size() {
        return Err(Error::shape(format!(
            "input has {n0} features but layer 1 expects {}",
            params.input_size()
        )));
    }
    if m == 0 {
        return Err(Error::shape("empty input batch"));
    }

    let mut a = Vec::with_capacity(depth + 1);
    let mut z_cache = Vec::with_capacity(depth);
    let mut masks = Vec::with_capacity(depth.saturating_sub(1));
    a.push(x.clone());

    for l in 1..=depth {
        let layer = params.layer(l);
        let z = linear_forward(&a[l - 1], &layer.w, &layer.b);
        if l < depth {
            let mut out = Activation::Relu.apply(&z);
            let mut mask = None;
            if keep_prob < 1.0 {
                if let Some(ref mut r) = rng {
                    let drawn = dropout::sample_mask(out.dim(), keep_prob, &mut **r);
                    dropout::apply(&mut out, &drawn, keep_prob);
                    mask = Some(drawn);
                }
            }
            masks.push(mask);
            a.push(out);
        } else {
            a.push(Activation::Sigmoid.apply(&z));
        }
        z_cache.push(z);
    }

    let al = a[depth].clone();
    Ok((
        al,
        ForwardCache {
            a,
            z: z_cache,
            masks,
        },
    ))
}

/// Z = W·A_prev + b, the bias column broadcast across the batch.
fn linear_forward(a_prev: &Array2<f64>, w: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    w.dot(a_prev) + b
}
