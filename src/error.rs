use thiserror::Error;

/// Errors from network configuration and the propagation engines.
///
/// None of these are retryable: each one signals a misconfigured network or
/// a numerically broken iteration, not a transient condition.
#[derive(Debug, Error)]
pub enum Error {
    /// Incompatible matrix dimensions somewhere in the layer chain, the
    /// input batch, or the labels.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A hyperparameter outside its legal range, rejected before any
    /// iteration runs.
    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),

    /// The cost or a gradient left the representable range.
    #[error("numerical instability: {0}")]
    NumericalInstability(&'static str),
}

impl Error {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Error::ShapeMismatch(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn check_keep_prob(keep_prob: f64) -> Result<()> {
    if !(keep_prob > 0.0 && keep_prob <= 1.0) {
        return Err(Error::InvalidHyperparameter(format!(
            "keep_prob must be in (0, 1], got {keep_prob}"
        )));
    }
    Ok(())
}

pub(crate) fn check_alpha(alpha: f64) -> Result<()> {
    if !(alpha >= 0.0) {
        return Err(Error::InvalidHyperparameter(format!(
            "alpha must be >= 0, got {alpha}"
        )));
    }
    Ok(())
}

pub(crate) fn check_learning_rate(learning_rate: f64) -> Result<()> {
    if !(learning_rate > 0.0) {
        return Err(Error::InvalidHyperparameter(format!(
            "learning_rate must be > 0, got {learning_rate}"
        )));
    }
    Ok(())
}
