//! The backward pass engine: hand-derived gradients, layer by layer.

use ndarray::prelude::*;
use ndarray::Zip;

use crate::activation::Activation;
use crate::dropout;
use crate::error::{check_alpha, check_keep_prob, Error, Result};
use crate::forward::ForwardCache;
use crate::params::Parameters;

/// Gradients of one layer. `da` is ∂cost/∂A_l exactly as propagated from the
/// layer above (the loss derivative for the top layer), before any dropout
/// rescale; `dw`/`db` match the layer's parameter shapes.
#[derive(Debug)]
pub struct LayerGradients {
    pub da: Array2<f64>,
    pub dw: Array2<f64>,
    pub db: Array2<f64>,
}

/// Gradient store for one iteration, indexed 1..=L like [`Parameters`].
#[derive(Debug)]
pub struct Gradients {
    pub(crate) layers: Vec<LayerGradients>,
}

impl Gradients {
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// The gradients of layer `l`, 1-based.
    ///
    /// Panics if `l` is 0 or greater than [`Gradients::depth`].
    pub fn layer(&self, l: usize) -> &LayerGradients {
        assert!(l >= 1 && l <= self.depth(), "layer index {l} out of range");
        &self.layers[l - 1]
    }
}

/// Backpropagate the binary cross-entropy gradient through every layer.
///
/// `al` is the forward output, `y` the 0/1 labels, `cache` the cache built
/// by the paired forward call of this same iteration. Masks stored in the
/// cache are replayed, never redrawn, so gradient flows only through the
/// units the forward pass kept. `alpha` adds the L2 term (alpha/m)·W_l to
/// every dW_l.
///
/// With `alpha` = 0 and no cached masks this is exactly the unregularized,
/// dropout-free gradient. An output saturated at exactly 0 or 1 makes the
/// top-layer gradient non-finite and fails with
/// [`Error::NumericalInstability`] rather than propagating NaN.
pub fn model_backward(
    al: &Array2<f64>,
    y: &Array2<f64>,
    params: &Parameters,
    cache: &ForwardCache,
    alpha: f64,
    keep_prob: f64,
) -> Result<Gradients> {
    check_alpha(alpha)?;
    check_keep_prob(keep_prob)?;
    let depth = params.depth();
    if y.dim() != al.dim() {
        return Err(Error::shape(format!(
            "labels are {:?} but the network output is {:?}",
            y.dim(),
            al.dim()
        )));
    }
    if cache.num_activations() != depth + 1 {
        return Err(Error::shape(format!(
            "cache has {} activations for a depth-{depth} network",
            cache.num_activations()
        )));
    }
    if al.is_empty() {
        return Err(Error::shape("empty output batch"));
    }
    let m = al.ncols() as f64;

    // dA_L = −(Y/AL − (1−Y)/(1−AL)), from the output as handed to us;
    // the derivative factor A⊙(1−A) comes from the cached top activation.
    let da_top = Zip::from(y)
        .and(al)
        .map_collect(|&y, &a| (1.0 - y) / (1.0 - a) - y / a);
    let mut dz = Activation::Sigmoid.backward(
        &da_top,
        cache.pre_activation(depth),
        cache.activation(depth),
    );
    if dz.iter().any(|v| !v.is_finite()) {
        return Err(Error::NumericalInstability(
            "output saturated at 0 or 1, top-layer gradient is not finite",
        ));
    }

    let mut rev = Vec::with_capacity(depth);
    let mut da_incoming = da_top;
    for l in (1..=depth).rev() {
        let layer = params.layer(l);
        let a_prev = cache.activation(l - 1);

        let mut dw = dz.dot(&a_prev.t()) / m;
        if alpha > 0.0 {
            dw.scaled_add(alpha / m, &layer.w);
        }
        let db = dz.sum_axis(Axis(1)).insert_axis(Axis(1)) / m;
        let da_prev = layer.w.t().dot(&dz);

        rev.push(LayerGradients {
            da: da_incoming,
            dw,
            db,
        });
        da_incoming = da_prev;

        if l > 1 {
            // entering hidden layer l-1: replay its dropout mask on the
            // incoming gradient, then the ReLU gate
            let mut gated = da_incoming.clone();
            if let Some(mask) = cache.mask(l - 1) {
                dropout::apply(&mut gated, mask, keep_prob);
            }
            dz = Activation::Relu.backward(
                &gated,
                cache.pre_activation(l - 1),
                cache.activation(l - 1),
            );
        }
    }
    rev.reverse();
    Ok(Gradients { layers: rev })
}
