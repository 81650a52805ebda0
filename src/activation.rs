//! The two activation kinds and their derivatives.

use ndarray::prelude::*;
use ndarray::Zip;

/// Activation applied by a layer.
///
/// The network only ever uses these two: `Relu` on hidden layers, `Sigmoid`
/// on the output layer. A closed enum keeps dispatch a two-way branch; there
/// is deliberately no trait to implement from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Sigmoid,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Activation {
    /// Apply elementwise to a pre-activation batch.
    pub fn apply(self, z: &Array2<f64>) -> Array2<f64> {
        let mut a = z.clone();
        match self {
            Activation::Relu => a.par_mapv_inplace(|v| v.max(0.0)),
            Activation::Sigmoid => a.par_mapv_inplace(sigmoid),
        }
        a
    }

    /// Convert a post-activation gradient dA into dZ, using the values the
    /// forward pass cached: Z for `Relu`, A for `Sigmoid`.
    ///
    /// The ReLU gate is strict: dZ = 0 where Z = 0, the same units the
    /// forward pass left at zero.
    pub fn backward(
        self,
        da: &Array2<f64>,
        z: &Array2<f64>,
        a: &Array2<f64>,
    ) -> Array2<f64> {
        match self {
            Activation::Relu => Zip::from(da)
                .and(z)
                .map_collect(|&da, &z| if z > 0.0 { da } else { 0.0 }),
            Activation::Sigmoid => Zip::from(da)
                .and(a)
                .map_collect(|&da, &a| da * a * (1.0 - a)),
        }
    }
}
