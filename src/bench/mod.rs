// Benchmark harness: configuration, drivers, timing, reporting

pub mod config;
pub mod driver;
pub mod report;
pub mod runner;
pub mod timing;

pub use driver::{AccelBases, AccelMode};
pub use report::{BackendKind, BackendRun, BenchReport};
pub use runner::run_benchmark;
pub use timing::{measure, Measurement, MeasurementWarning, TimingSample};
