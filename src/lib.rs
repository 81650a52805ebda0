//! An L-layer feed-forward binary classifier trained by gradient descent.
//!
//! Hidden layers are ReLU, the output layer is a single sigmoid unit, the
//! loss is binary cross-entropy with optional L2 weight decay, and hidden
//! activations can be regularized with inverted dropout. Gradients are
//! hand-derived per layer; there is no general autodiff here.
//!
//! The pieces compose the way the math does: [`model_forward`] produces the
//! output and a [`ForwardCache`], [`loss::cross_entropy`] scores it,
//! [`model_backward`] turns output + labels + cache into [`Gradients`], and
//! [`Parameters::update`] takes the descent step. [`Network`] drives that
//! cycle for you.
//!
//! All randomness (initialization, dropout masks) comes from an rng the
//! caller passes in, so a fixed seed reproduces a training run exactly.

mod error;
pub use error::{Error, Result};

mod activation;
pub use activation::Activation;

mod dropout;

mod params;
pub use params::{LayerParams, Parameters};

mod forward;
pub use forward::{model_forward, model_forward_dropout, ForwardCache};

mod backward;
pub use backward::{model_backward, Gradients, LayerGradients};

pub mod loss;

mod model;
pub use model::{Network, TrainConfig};
