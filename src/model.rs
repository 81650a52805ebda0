//! The model driver: hyperparameters, the training loop, prediction.

use log::info;
use ndarray::prelude::*;
use ndarray::Zip;
use rand::Rng;

use crate::backward::model_backward;
use crate::error::{check_alpha, check_keep_prob, check_learning_rate, Error, Result};
use crate::forward::{model_forward, model_forward_dropout};
use crate::loss::cross_entropy;
use crate::params::Parameters;

/// Hyperparameters of one training run, validated before any iteration.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Gradient-descent step size, > 0.
    pub learning_rate: f64,
    /// L2 coefficient, ≥ 0; 0 disables the penalty.
    pub alpha: f64,
    /// Probability of keeping a hidden unit, in (0, 1]; 1 disables dropout.
    pub keep_prob: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: 0.0075,
            alpha: 0.0,
            keep_prob: 1.0,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        check_learning_rate(self.learning_rate)?;
        check_alpha(self.alpha)?;
        check_keep_prob(self.keep_prob)
    }
}

/// A binary classifier: L−1 ReLU hidden layers and one sigmoid output unit.
#[derive(Debug, Clone)]
pub struct Network {
    params: Parameters,
}

impl Network {
    /// Fresh network with randomly initialized parameters.
    ///
    /// `layer_dims` is `[n_0, ..., n_L]`; the output layer must be exactly
    /// one unit wide.
    pub fn new<R: Rng>(layer_dims: &[usize], rng: &mut R) -> Result<Self> {
        if layer_dims.last() != Some(&1) {
            return Err(Error::shape(format!(
                "a binary classifier needs one output unit, got dims {layer_dims:?}"
            )));
        }
        Ok(Network {
            params: Parameters::init(layer_dims, rng)?,
        })
    }

    /// Wrap already-built parameters.
    pub fn from_parameters(params: Parameters) -> Result<Self> {
        if params.output_size() != 1 {
            return Err(Error::shape(format!(
                "a binary classifier needs one output unit, got {}",
                params.output_size()
            )));
        }
        Ok(Network { params })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Run gradient descent for `iterations` full-batch passes.
    ///
    /// Each iteration is forward → cost → backward → update; the returned
    /// history holds the cost of every iteration as computed from that
    /// iteration's forward output, before the update step.
    pub fn fit<R: Rng>(
        &mut self,
        x: &Array2<f64>,
        y: &Array2<f64>,
        config: &TrainConfig,
        iterations: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        config.validate()?;
        let mut costs = Vec::with_capacity(iterations);
        for i in 0..iterations {
            let (al, cache) = model_forward_dropout(&self.params, x, config.keep_prob, rng)?;
            let cost = cross_entropy(&al, y, &self.params, config.alpha)?;
            let grads = model_backward(&al, y, &self.params, &cache, config.alpha, config.keep_prob)?;
            self.params.update(&grads, config.learning_rate);
            if i % 20 == 0 {
                info!("iteration {i}: cost {cost:.6}");
            }
            costs.push(cost);
        }
        Ok(costs)
    }

    /// Raw output-layer activations, no dropout.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (al, _cache) = model_forward(&self.params, x)?;
        Ok(al)
    }

    /// 0/1 labels: forward with no dropout, thresholded at 0.5.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    /// Fraction of examples whose thresholded prediction equals the label.
    pub fn accuracy(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<f64> {
        let p = self.predict(x)?;
        if y.dim() != p.dim() {
            return Err(Error::shape(format!(
                "labels are {:?} but predictions are {:?}",
                y.dim(),
                p.dim()
            )));
        }
        let mut good = 0usize;
        Zip::from(&p).and(y).for_each(|&p, &y| {
            if p == y {
                good += 1;
            }
        });
        Ok(good as f64 / p.ncols() as f64)
    }

    /// Cross-entropy of the network on a held-out set.
    pub fn evaluate(&self, x: &Array2<f64>, y: &Array2<f64>, alpha: f64) -> Result<f64> {
        let (al, _cache) = model_forward(&self.params, x)?;
        cross_entropy(&al, y, &self.params, alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn config_rejects_out_of_range_values() {
        let bad = [
            TrainConfig { learning_rate: 0.0, ..Default::default() },
            TrainConfig { learning_rate: -0.1, ..Default::default() },
            TrainConfig { alpha: -1.0, ..Default::default() },
            TrainConfig { keep_prob: 0.0, ..Default::default() },
            TrainConfig { keep_prob: 1.2, ..Default::default() },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(Error::InvalidHyperparameter(_))),
                "accepted {config:?}"
            );
        }
    }

    #[test]
    fn network_requires_single_output_unit() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Network::new(&[4, 3, 2], &mut rng),
            Err(Error::ShapeMismatch(_))
        ));
        assert!(Network::new(&[4, 3, 1], &mut rng).is_ok());
    }
}
