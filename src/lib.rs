//! Sliding-window 1D convolution benchmark with software and accelerator backends.

pub mod accel;
pub mod bench;
pub mod config;
pub mod conv;
pub mod error;
pub mod utils;

pub use config::BenchShape;
pub use error::{AcceleratorFault, BenchError, BenchResult, ConfigurationError};
