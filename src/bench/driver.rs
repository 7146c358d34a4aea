// Sliding-window driver: one convolution per offset

use crate::accel::{AccelAddr, ConvAccel, ConvInvoker, WindowFeed};
use crate::config::BenchShape;
use crate::conv::conv1d_at;
use crate::error::{BenchResult, ConfigurationError};
use serde::{Deserialize, Serialize};

/// How the accelerator path walks the window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccelMode {
  /// Every offset re-runs against the configured base. All results equal
  /// offset 0; measures the cost of a bare `run`.
  #[default]
  SteadyState,
  /// The window slice for each offset is staged into the accelerator's
  /// window region before its run. Results match the software backend.
  Advance,
}

/// Accelerator-visible location of the kernel and the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelBases {
  pub kernel: AccelAddr,
  pub window: AccelAddr,
}

fn check_results(shape: &BenchShape, results: &[u32]) -> Result<(), ConfigurationError> {
  if results.len() != shape.iterations() {
    return Err(ConfigurationError::ResultBufferSize {
      expected: shape.iterations(),
      got: results.len(),
    });
  }
  Ok(())
}

fn check_buffer(what: &str, expected: usize, got: usize) -> Result<(), ConfigurationError> {
  if expected != got {
    return Err(ConfigurationError::Invalid(format!("{what} holds {got} words, shape expects {expected}")));
  }
  Ok(())
}

fn device_sizes(shape: &BenchShape) -> Result<(u32, u32), ConfigurationError> {
  let to_u32 = |what: &str, n: usize| {
    u32::try_from(n).map_err(|_| ConfigurationError::Invalid(format!("{what} {n} does not fit a 32-bit register")))
  };
  Ok((to_u32("kernel size", shape.kernel_elems())?, to_u32("window size", shape.window_size())?))
}

/// Software backend over every offset.
pub fn drive_software(
  shape: &BenchShape,
  kernel: &[u32],
  window: &[u32],
  results: &mut [u32],
) -> Result<(), ConfigurationError> {
  check_results(shape, results)?;
  check_buffer("kernel", shape.kernel_elems(), kernel.len())?;
  check_buffer("window", shape.window_size(), window.len())?;

  for (offset, slot) in results.iter_mut().enumerate() {
    *slot = conv1d_at(kernel, window, offset)?;
  }
  Ok(())
}

/// Accelerator backend, steady-state interpretation.
///
/// Each offset issues an `invoke` with the offset-0 bases. Only the first
/// call reaches `set_base`/`set_size`.
pub fn drive_steady<A: ConvAccel>(
  shape: &BenchShape,
  invoker: &mut ConvInvoker<A>,
  bases: AccelBases,
  results: &mut [u32],
) -> BenchResult<()> {
  check_results(shape, results)?;
  let (kernel_size, window_size) = device_sizes(shape)?;

  for slot in results.iter_mut() {
    *slot = invoker.invoke(bases.kernel, bases.window, kernel_size, window_size)?;
  }
  Ok(())
}

/// Accelerator backend, advancing interpretation.
///
/// Once the invoker is configured, the kernel-length slice at each offset is
/// staged at the window base before its run, so the unchanged configuration
/// reads the right data. Only the very first run of a fresh invoker reads the
/// window as loaded, which is the offset-0 slice.
pub fn drive_advance<A: ConvAccel + WindowFeed>(
  shape: &BenchShape,
  invoker: &mut ConvInvoker<A>,
  bases: AccelBases,
  window: &[u32],
  results: &mut [u32],
) -> BenchResult<()> {
  check_results(shape, results)?;
  check_buffer("window", shape.window_size(), window.len())?;
  let (kernel_size, window_size) = device_sizes(shape)?;
  let k = shape.kernel_elems();

  for (offset, slot) in results.iter_mut().enumerate() {
    if invoker.is_configured() {
      invoker.stage_window(&window[offset..offset + k])?;
    }
    *slot = invoker.invoke(bases.kernel, bases.window, kernel_size, window_size)?;
  }
  Ok(())
}
