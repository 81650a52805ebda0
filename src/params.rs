//! The per-layer parameter store.

use ndarray::prelude::*;
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::Rng;

use crate::backward::Gradients;
use crate::error::{Error, Result};

/// Weights and bias of one layer: `w` is `[n_l, n_{l-1}]`, `b` is `[n_l, 1]`.
#[derive(Debug, Clone)]
pub struct LayerParams {
    pub w: Array2<f64>,
    pub b: Array2<f64>,
}

/// Parameter store for all L layers, indexed 1..=L like the math.
///
/// Built once by [`Parameters::init`] or [`Parameters::from_layers`], then
/// mutated only by [`Parameters::update`], once per iteration. Everything
/// else reads it.
#[derive(Debug, Clone)]
pub struct Parameters {
    layers: Vec<LayerParams>,
}

impl Parameters {
    /// Random initialization for the given unit counts `[n_0, ..., n_L]`:
    /// W_l ~ N(0,1) × 0.01 drawn from `rng`, b_l = 0.
    pub fn init<R: Rng + ?Sized>(layer_dims: &[usize], rng: &mut R) -> Result<Self> {
        if layer_dims.len() < 2 {
            return Err(Error::shape(format!(
                "a network needs an input and an output layer, got dims {layer_dims:?}"
            )));
        }
        if layer_dims.iter().any(|&n| n == 0) {
            return Err(Error::shape(format!(
                "zero-width layer in dims {layer_dims:?}"
            )));
        }
        let layers = layer_dims
            .windows(2)
            .map(|pair| LayerParams {
                w: 0.01 * Array::random_using((pair[1], pair[0]), StandardNormal, rng),
                b: Array2::zeros((pair[1], 1)),
            })
            .collect();
        Ok(Parameters { layers })
    }

    /// Build from explicit per-layer values, validating the whole shape
    /// chain up front.
    pub fn from_layers(layers: Vec<LayerParams>) -> Result<Self> {
        if layers.is_empty() {
            return Err(Error::shape("a network needs at least one layer"));
        }
        for (i, layer) in layers.iter().enumerate() {
            let (n, n_prev) = layer.w.dim();
            if n == 0 || n_prev == 0 {
                return Err(Error::shape(format!("layer {}: empty weight matrix", i + 1)));
            }
            if layer.b.dim() != (n, 1) {
                return Err(Error::shape(format!(
                    "layer {}: bias is {:?}, want [{n}, 1]",
                    i + 1,
                    layer.b.dim()
                )));
            }
            if i > 0 {
                let prev_out = layers[i - 1].w.nrows();
                if n_prev != prev_out {
                    return Err(Error::shape(format!(
                        "layer {} takes {n_prev} inputs but layer {i} has {prev_out} units",
                        i + 1
                    )));
                }
            }
        }
        Ok(Parameters { layers })
    }

    /// Network depth L, the number of parameterized layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Number of input features n_0.
    pub fn input_size(&self) -> usize {
        self.layers[0].w.ncols()
    }

    /// Number of output units n_L.
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].w.nrows()
    }

    /// The parameters of layer `l`, 1-based.
    ///
    /// Panics if `l` is 0 or greater than [`Parameters::depth`].
    pub fn layer(&self, l: usize) -> &LayerParams {
        assert!(l >= 1 && l <= self.depth(), "layer index {l} out of range");
        &self.layers[l - 1]
    }

    /// Σ_l ‖W_l‖_F², the quantity the L2 cost term scales. Biases are not
    /// included.
    pub fn squared_weight_norm(&self) -> f64 {
        self.layers
            .iter()
            .map(|p| p.w.fold(0.0, |acc, &w| acc + w * w))
            .sum()
    }

    /// Gradient-descent step: W_l ← W_l − rate·dW_l, b_l ← b_l − rate·db_l.
    ///
    /// This is the only method that writes the store.
    pub fn update(&mut self, grads: &Gradients, learning_rate: f64) {
        assert_eq!(
            grads.depth(),
            self.depth(),
            "gradients and parameters disagree on depth"
        );
        for (l, p) in self.layers.iter_mut().enumerate() {
            let g = grads.layer(l + 1);
            p.w.scaled_add(-learning_rate, &g.dw);
            p.b.scaled_add(-learning_rate, &g.db);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backward::LayerGradients;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn init_shapes_and_scale() {
        let mut rng = StdRng::seed_from_u64(1);
        let params = Parameters::init(&[5, 4, 3], &mut rng).unwrap();
        assert_eq!(params.depth(), 2);
        assert_eq!(params.layer(1).w.dim(), (4, 5));
        assert_eq!(params.layer(1).b.dim(), (4, 1));
        assert_eq!(params.layer(2).w.dim(), (3, 4));
        assert_eq!(params.layer(2).b.dim(), (3, 1));
        assert!(params.layer(1).b.iter().all(|&b| b == 0.0));
        assert!(params.layer(2).b.iter().all(|&b| b == 0.0));
        assert!(params.layer(1).w.iter().all(|&w| w != 0.0 && w.abs() < 0.1));
    }

    #[test]
    fn init_is_seed_deterministic() {
        let a = Parameters::init(&[3, 2, 1], &mut StdRng::seed_from_u64(7)).unwrap();
        let b = Parameters::init(&[3, 2, 1], &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a.layer(1).w, b.layer(1).w);
        assert_eq!(a.layer(2).w, b.layer(2).w);
    }

    #[test]
    fn init_rejects_bad_dims() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(Parameters::init(&[4], &mut rng).is_err());
        assert!(Parameters::init(&[4, 0, 1], &mut rng).is_err());
    }

    #[test]
    fn from_layers_rejects_broken_chain() {
        let good = |n: usize, n_prev: usize| LayerParams {
            w: Array2::zeros((n, n_prev)),
            b: Array2::zeros((n, 1)),
        };
        assert!(Parameters::from_layers(vec![good(3, 4), good(2, 3)]).is_ok());
        // layer 2 expects 5 inputs but layer 1 produces 3
        assert!(Parameters::from_layers(vec![good(3, 4), good(2, 5)]).is_err());
        // bias shaped like a row
        let bad_bias = LayerParams {
            w: Array2::zeros((3, 4)),
            b: Array2::zeros((1, 3)),
        };
        assert!(Parameters::from_layers(vec![bad_bias]).is_err());
    }

    #[test]
    fn update_applies_descent_step() {
        let w1 = Array2::<f64>::ones((3, 4));
        let b1 = Array2::<f64>::ones((3, 1));
        let w2 = Array2::<f64>::ones((1, 3));
        let b2 = Array2::<f64>::ones((1, 1));
        let mut params = Parameters::from_layers(vec![
            LayerParams { w: w1.clone(), b: b1.clone() },
            LayerParams { w: w2.clone(), b: b2.clone() },
        ])
        .unwrap();
        let grads = Gradients {
            layers: vec![
                LayerGradients {
                    da: Array2::zeros((3, 1)),
                    dw: 0.05 * &w1,
                    db: 0.05 * &b1,
                },
                LayerGradients {
                    da: Array2::zeros((1, 1)),
                    dw: 0.05 * &w2,
                    db: 0.05 * &b2,
                },
            ],
        };

        params.update(&grads, 1.0);

        assert_eq!(params.layer(1).w, 0.95 * &w1);
        assert_eq!(params.layer(1).b, 0.95 * &b1);
        assert_eq!(params.layer(2).w, 0.95 * &w2);
        assert_eq!(params.layer(2).b, 0.95 * &b2);
    }

    #[test]
    fn squared_weight_norm_sums_all_layers() {
        let params = Parameters::from_layers(vec![
            LayerParams {
                w: array![[1.0, 2.0], [3.0, 0.0]],
                b: Array2::ones((2, 1)),
            },
            LayerParams {
                w: array![[2.0, 2.0]],
                b: Array2::ones((1, 1)),
            },
        ])
        .unwrap();
        assert_eq!(params.squared_weight_norm(), 1.0 + 4.0 + 9.0 + 4.0 + 4.0);
    }
}
