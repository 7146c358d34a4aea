use super::config::config::{AccelDevice, AppConfig};
use super::driver::{drive_advance, drive_software, drive_steady, AccelBases, AccelMode};
use super::report::{BackendKind, BackendRun, BenchReport};
use super::timing::{measure, Measurement};
use crate::accel::{ConvInvoker, ConvUnit};
use crate::config::BenchShape;
use crate::error::{BenchResult, ConfigurationError};
use log::{info, warn};

/// Results and timing of one backend's loop
pub struct TimedRun {
  pub results: Vec<u32>,
  pub measurement: Measurement,
  pub cycles: Option<u64>,
}

/// Software baseline over every offset.
pub fn run_software(shape: &BenchShape, kernel: &[u32], window: &[u32]) -> BenchResult<TimedRun> {
  // allocated before the clock starts
  let mut results = vec![0u32; shape.iterations()];
  let (outcome, measurement) = measure(shape.iterations(), || drive_software(shape, kernel, window, &mut results));
  outcome?;

  Ok(TimedRun {
    results,
    measurement,
    cycles: None,
  })
}

/// Accelerator path on the simulated conv unit.
pub fn run_sim_accelerator(
  config: &AppConfig,
  shape: &BenchShape,
  kernel: &[u32],
  window: &[u32],
) -> BenchResult<TimedRun> {
  let mut unit = ConvUnit::new(config.accel.unit.clone());
  let bases = AccelBases {
    kernel: unit.load(kernel)?,
    window: unit.load(window)?,
  };
  let mut invoker = ConvInvoker::new(unit);
  let mut results = vec![0u32; shape.iterations()];

  let (outcome, measurement) = measure(shape.iterations(), || match config.bench.accel_mode {
    AccelMode::SteadyState => drive_steady(shape, &mut invoker, bases, &mut results),
    AccelMode::Advance => drive_advance(shape, &mut invoker, bases, window, &mut results),
  });
  outcome?;

  Ok(TimedRun {
    results,
    measurement,
    cycles: Some(invoker.device().cycles()),
  })
}

#[cfg(all(feature = "rocc", any(target_arch = "riscv32", target_arch = "riscv64")))]
fn run_rocc_accelerator(shape: &BenchShape, kernel: &[u32], window: &[u32]) -> BenchResult<TimedRun> {
  use crate::accel::rocc::RoccConv;
  use crate::accel::AccelAddr;

  let bases = AccelBases {
    kernel: AccelAddr::from_slice(kernel),
    window: AccelAddr::from_slice(window),
  };
  // SAFETY: the rocc device is only selected on cores that carry the conv unit
  let mut invoker = ConvInvoker::new(unsafe { RoccConv::new() });
  let mut results = vec![0u32; shape.iterations()];

  let (outcome, measurement) = measure(shape.iterations(), || drive_steady(shape, &mut invoker, bases, &mut results));
  outcome?;

  Ok(TimedRun {
    results,
    measurement,
    cycles: None,
  })
}

#[cfg(not(all(feature = "rocc", any(target_arch = "riscv32", target_arch = "riscv64"))))]
fn run_rocc_accelerator(_shape: &BenchShape, _kernel: &[u32], _window: &[u32]) -> BenchResult<TimedRun> {
  Err(ConfigurationError::Invalid("rocc device requires the `rocc` feature on a RISC-V target".to_string()).into())
}

/// Offsets where `hw` departs from what `mode` promises relative to `sw`.
///
/// Advance mode must reproduce the software sequence; steady-state mode
/// repeats the offset-0 result everywhere.
pub fn count_mismatches(mode: AccelMode, sw: &[u32], hw: &[u32]) -> usize {
  if sw.len() != hw.len() {
    return sw.len().max(hw.len());
  }
  match mode {
    AccelMode::Advance => sw.iter().zip(hw).filter(|(a, b)| a != b).count(),
    AccelMode::SteadyState => match sw.first() {
      Some(&first) => hw.iter().filter(|&&r| r != first).count(),
      None => 0,
    },
  }
}

/// Run every backend the configuration selects and collect the report.
pub fn run_benchmark(config: &AppConfig, shape: &BenchShape) -> BenchResult<BenchReport> {
  let kernel = shape.kernel_buffer();
  let window = shape.window_buffer();
  let backend = config.bench.backend;
  let mut runs = Vec::new();
  let mut software_results = None;

  if backend.runs_software() {
    let timed = run_software(shape, &kernel, &window)?;
    if timed.measurement.is_valid() {
      info!(
        "software: {} iterations in {} ns",
        shape.iterations(),
        timed.measurement.total_ns()
      );
    }
    runs.push(BackendRun::new(BackendKind::Software, &timed.measurement, &timed.results));
    software_results = Some(timed.results);
  }

  if backend.runs_accelerator() {
    let timed = match config.accel.device {
      AccelDevice::Sim => run_sim_accelerator(config, shape, &kernel, &window)?,
      AccelDevice::Rocc => run_rocc_accelerator(shape, &kernel, &window)?,
    };
    if timed.measurement.is_valid() {
      info!(
        "accelerator ({:?}): {} iterations in {} ns",
        config.bench.accel_mode,
        shape.iterations(),
        timed.measurement.total_ns()
      );
    }

    let mut run = BackendRun::new(BackendKind::Accelerator, &timed.measurement, &timed.results);
    run.accel_mode = Some(config.bench.accel_mode);
    run.cycles = timed.cycles;

    if config.bench.verify {
      let reference = match software_results.take() {
        Some(results) => results,
        None => {
          // untimed reference pass
          let mut results = vec![0u32; shape.iterations()];
          drive_software(shape, &kernel, &window, &mut results)?;
          results
        },
      };
      let mismatches = count_mismatches(config.bench.accel_mode, &reference, &timed.results);
      if mismatches > 0 {
        warn!("accelerator results differ from software at {} offsets", mismatches);
      }
      run.mismatches = Some(mismatches);
    }
    runs.push(run);
  }

  Ok(BenchReport::new(shape, runs))
}
