//! Train the classifier on two seeded Gaussian-ish blobs and report how it
//! does on a held-out set. Run with `RUST_LOG=info` to watch the cost fall.

use ndarray::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mynn::{Network, TrainConfig};

fn make_blobs<R: Rng>(n_per_class: usize, rng: &mut R) -> (Array2<f64>, Array2<f64>) {
    let n = 2 * n_per_class;
    let mut x = Array2::zeros((2, n));
    let mut y = Array2::zeros((1, n));
    for j in 0..n {
        let label = (j % 2) as f64;
        let center = if label == 0.0 { (-1.5, -1.5) } else { (1.5, 1.5) };
        x[[0, j]] = center.0 + rng.gen_range(-1.0..1.0);
        x[[1, j]] = center.1 + rng.gen_range(-1.0..1.0);
        y[[0, j]] = label;
    }
    (x, y)
}

fn main() {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(42);
    let (x_train, y_train) = make_blobs(200, &mut rng);
    let (x_test, y_test) = make_blobs(50, &mut rng);

    let mut net = Network::new(&[2, 8, 4, 1], &mut rng).expect("valid layer dims");
    let config = TrainConfig {
        learning_rate: 0.3,
        alpha: 0.01,
        keep_prob: 0.9,
    };

    let costs = net
        .fit(&x_train, &y_train, &config, 1500, &mut rng)
        .expect("training run");
    println!(
        "cost: {:.6} -> {:.6} over {} iterations",
        costs.first().unwrap(),
        costs.last().unwrap(),
        costs.len()
    );

    let train_acc = net.accuracy(&x_train, &y_train).expect("train accuracy");
    let test_acc = net.accuracy(&x_test, &y_test).expect("test accuracy");
    let test_cost = net.evaluate(&x_test, &y_test, config.alpha).expect("test cost");
    println!("train accuracy: {:.1}%", 100.0 * train_acc);
    println!("test accuracy:  {:.1}%  (cost {test_cost:.6})", 100.0 * test_acc);
}
