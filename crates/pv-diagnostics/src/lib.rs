//! Synthetic measurement sources for tests and benchmarks.
//!
//! Implicit single-diode sweeps with seeded Gaussian sensor noise.

pub mod synthetic;

pub use synthetic::{add_noise, NoiseModel, SingleDiodeCell};
