//! Loss functions.

use ndarray::prelude::*;
use ndarray::Zip;

use crate::error::{check_alpha, Error, Result};
use crate::params::Parameters;

/// Probabilities this close to 0 or 1 are pulled back inside the open
/// interval before taking logarithms.
pub const CLAMP_EPSILON: f64 = 1e-15;

/// Binary cross-entropy of the network output against 0/1 labels, plus the
/// L2 penalty (alpha/(2m))·Σ_l ‖W_l‖_F².
///
/// `al` is clamped into [CLAMP_EPSILON, 1 − CLAMP_EPSILON], so a saturated
/// output yields a large finite cost instead of ±inf. The cost is a
/// per-iteration diagnostic; nothing downstream consumes it.
pub fn cross_entropy(
    al: &Array2<f64>,
    y: &Array2<f64>,
    params: &Parameters,
    alpha: f64,
) -> Result<f64> {
    check_alpha(alpha)?;
    if y.dim() != al.dim() {
        return Err(Error::shape(format!(
            "labels are {:?} but the network output is {:?}",
            y.dim(),
            al.dim()
        )));
    }
    if al.is_empty() {
        return Err(Error::shape("empty output batch"));
    }
    let m = al.ncols() as f64;

    let mut total = 0.0;
    Zip::from(y).and(al).for_each(|&y, &a| {
        let a = a.clamp(CLAMP_EPSILON, 1.0 - CLAMP_EPSILON);
        total -= y * a.ln() + (1.0 - y) * (1.0 - a).ln();
    });
    let mut cost = total / m;
    if alpha > 0.0 {
        cost += alpha / (2.0 * m) * params.squared_weight_norm();
    }
    if !cost.is_finite() {
        return Err(Error::NumericalInstability("cost is not finite"));
    }
    Ok(cost)
}
