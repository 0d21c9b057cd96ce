//! Example showing how the computation backend is selected.
//!
//! Run with `DEEPTIME_FRAMEWORK=pytorch` to switch adapters, or with an
//! unsupported value to see the configuration error.

use deeptime::{Framework, ScoreMethod, SUPPORTED_FRAMEWORKS};
use nalgebra::DMatrix;

fn main() {
    println!("Backend Selection Example");
    println!("=========================\n");
    println!("Supported frameworks: {:?}", SUPPORTED_FRAMEWORKS);
    println!("Default framework: {}\n", Framework::DEFAULT);

    let framework = match deeptime::init() {
        Ok(framework) => framework,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    println!("Resolved framework: {framework}");

    let x = DMatrix::from_fn(1_000, 4, |i, j| ((i + 2 * j) as f64 * 0.05).sin());
    let y = DMatrix::from_fn(1_000, 4, |i, j| ((i + 2 * j + 1) as f64 * 0.05).sin());

    for method in [ScoreMethod::Vamp1, ScoreMethod::Vamp2, ScoreMethod::VampE] {
        match deeptime::vamp_score(&x, &y, method, 1e-6) {
            Ok(score) => println!("  {method} score: {score:.6}"),
            Err(err) => println!("  {method} failed: {err}"),
        }
    }
}
