use log::warn;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Clock anomalies that make a sample unusable as data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasurementWarning {
  /// Start and end timestamps are identical
  ZeroElapsed,
  /// End timestamp precedes the start timestamp
  NegativeElapsed,
}

/// Monotonic timestamps bracketing one full driver loop
#[derive(Debug, Clone, Copy)]
pub struct TimingSample {
  start: Instant,
  end: Instant,
}

impl TimingSample {
  pub fn new(start: Instant, end: Instant) -> Self {
    Self { start, end }
  }

  pub fn measurement(&self, iterations: usize) -> Measurement {
    // full instant difference; a reversed pair is reported, never wrapped
    let (total, warning) = match self.end.checked_duration_since(self.start) {
      Some(d) if d.is_zero() => (d, Some(MeasurementWarning::ZeroElapsed)),
      Some(d) => (d, None),
      None => (Duration::ZERO, Some(MeasurementWarning::NegativeElapsed)),
    };

    let mean_ns = if iterations == 0 {
      0.0
    } else {
      total.as_nanos() as f64 / iterations as f64
    };

    if let Some(w) = warning {
      warn!("measurement warning over {} iterations: {:?}", iterations, w);
    }

    Measurement {
      iterations,
      total,
      mean_ns,
      warning,
    }
  }
}

/// Statistics derived from a [`TimingSample`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
  pub iterations: usize,
  pub total: Duration,
  pub mean_ns: f64,
  pub warning: Option<MeasurementWarning>,
}

impl Measurement {
  pub fn total_ns(&self) -> u128 {
    self.total.as_nanos()
  }

  pub fn is_valid(&self) -> bool {
    self.warning.is_none()
  }
}

/// Time `body` with the monotonic clock, stamping immediately around it.
pub fn measure<T>(iterations: usize, body: impl FnOnce() -> T) -> (T, Measurement) {
  let start = Instant::now();
  let out = body();
  let end = Instant::now();
  (out, TimingSample::new(start, end).measurement(iterations))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mean_is_total_over_iterations() {
    let start = Instant::now();
    let sample = TimingSample::new(start, start + Duration::from_nanos(9_920));
    let m = sample.measurement(992);
    assert_eq!(m.total_ns(), 9_920);
    assert!((m.mean_ns - 10.0).abs() < 1e-9);
    assert!(m.is_valid());
  }

  #[test]
  fn test_span_across_second_boundary() {
    let start = Instant::now();
    let sample = TimingSample::new(start, start + Duration::new(1, 200));
    assert_eq!(sample.measurement(1).total_ns(), 1_000_000_200);
  }

  #[test]
  fn test_anomalies_are_flagged() {
    let t = Instant::now();
    assert_eq!(
      TimingSample::new(t, t).measurement(4).warning,
      Some(MeasurementWarning::ZeroElapsed)
    );

    let later = t + Duration::from_millis(1);
    let backwards = TimingSample::new(later, t).measurement(4);
    assert_eq!(backwards.warning, Some(MeasurementWarning::NegativeElapsed));
    assert_eq!(backwards.total, Duration::ZERO);
    assert!(!backwards.is_valid());
  }

  #[test]
  fn test_measure_returns_body_output() {
    let (value, m) = measure(10, || (0..1000u64).sum::<u64>());
    assert_eq!(value, 499_500);
    assert_eq!(m.iterations, 10);
    let expected = m.total_ns() as f64 / 10.0;
    assert!((m.mean_ns - expected).abs() < 1e-6);
  }
}
