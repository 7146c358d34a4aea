use super::driver::AccelMode;
use super::timing::{Measurement, MeasurementWarning};
use crate::config::BenchShape;
use crate::error::BenchResult;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
  Software,
  Accelerator,
}

/// Outcome of one backend's timed loop
#[derive(Debug, Clone, Serialize)]
pub struct BackendRun {
  pub backend: BackendKind,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub accel_mode: Option<AccelMode>,
  pub total_ns: u64,
  pub mean_ns: f64,
  /// Canary: last result of the loop
  pub last_result: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub warning: Option<MeasurementWarning>,
  /// Simulated device cycles spent inside the loop
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cycles: Option<u64>,
  /// Offsets that disagreed with the software reference
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mismatches: Option<usize>,
}

impl BackendRun {
  pub fn new(backend: BackendKind, measurement: &Measurement, results: &[u32]) -> Self {
    Self {
      backend,
      accel_mode: None,
      total_ns: u64::try_from(measurement.total_ns()).unwrap_or(u64::MAX),
      mean_ns: measurement.mean_ns,
      last_result: results.last().copied().unwrap_or(0),
      warning: measurement.warning,
      cycles: None,
      mismatches: None,
    }
  }

  fn title(&self) -> String {
    match (self.backend, self.accel_mode) {
      (BackendKind::Software, _) => "Software convolution benchmark".to_string(),
      (BackendKind::Accelerator, Some(AccelMode::Advance)) => "Accelerator convolution benchmark (advance)".to_string(),
      (BackendKind::Accelerator, _) => "Accelerator convolution benchmark (steady-state)".to_string(),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
  pub kernel_elems: usize,
  pub window_size: usize,
  pub iterations: usize,
  pub runs: Vec<BackendRun>,
  /// Software mean over accelerator mean, when both ran cleanly
  #[serde(skip_serializing_if = "Option::is_none")]
  pub speedup: Option<f64>,
}

impl BenchReport {
  pub fn new(shape: &BenchShape, runs: Vec<BackendRun>) -> Self {
    let mean_of = |kind: BackendKind| {
      runs
        .iter()
        .find(|r| r.backend == kind && r.warning.is_none())
        .map(|r| r.mean_ns)
    };
    let speedup = match (mean_of(BackendKind::Software), mean_of(BackendKind::Accelerator)) {
      (Some(sw), Some(hw)) if hw > 0.0 => Some(sw / hw),
      _ => None,
    };

    Self {
      kernel_elems: shape.kernel_elems(),
      window_size: shape.window_size(),
      iterations: shape.iterations(),
      runs,
      speedup,
    }
  }

  pub fn run(&self, kind: BackendKind) -> Option<&BackendRun> {
    self.runs.iter().find(|r| r.backend == kind)
  }

  pub fn render_text(&self) -> String {
    self.to_string()
  }

  pub fn to_json(&self) -> BenchResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}

impl fmt::Display for BenchReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for run in &self.runs {
      writeln!(f, "{}", run.title())?;
      writeln!(f, "Kernel elements : {}", self.kernel_elems)?;
      writeln!(f, "Window size     : {}", self.window_size)?;
      writeln!(f, "Iterations      : {}", self.iterations)?;
      match run.warning {
        Some(w) => writeln!(f, "Total time      : unavailable ({:?})", w)?,
        None => {
          writeln!(f, "Total time      : {} ns", run.total_ns)?;
          writeln!(f, "Avg per conv    : {:.3} ns", run.mean_ns)?;
        },
      }
      if let Some(cycles) = run.cycles {
        writeln!(f, "Device cycles   : {}", cycles)?;
      }
      if let Some(mismatches) = run.mismatches {
        writeln!(f, "Mismatches      : {}", mismatches)?;
      }
      writeln!(f, "Last result     : {}", run.last_result)?;
      writeln!(f)?;
    }
    if let Some(speedup) = self.speedup {
      writeln!(f, "Speedup         : {:.3}x", speedup)?;
    }
    Ok(())
  }
}
