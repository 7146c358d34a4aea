/// Benchmark shape constants and derived sizes
use crate::error::ConfigurationError;
use serde::Serialize;

/// Side length of the square kernel; the kernel holds `KERNEL_SIDE²` elements.
pub const KERNEL_SIDE: usize = 3;

/// Default window length in `u32` words.
pub const WINDOW_SIZE: usize = 1000;

/// Upper bound on the window length the accelerator can address.
pub const MAX_WINDOW_SIZE: usize = 4096;

/// Derived benchmark shape
///
/// Only constructible through [`BenchShape::with_capacity`] or `Default`, so
/// `iterations >= 1` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BenchShape {
  kernel_side: usize,
  kernel_elems: usize,
  window_size: usize,
  iterations: usize,
}

impl BenchShape {
  pub fn new(kernel_side: usize, window_size: usize) -> Result<Self, ConfigurationError> {
    Self::with_capacity(kernel_side, window_size, MAX_WINDOW_SIZE)
  }

  pub fn with_capacity(kernel_side: usize, window_size: usize, capacity: usize) -> Result<Self, ConfigurationError> {
    if kernel_side == 0 {
      return Err(ConfigurationError::ZeroKernelSide);
    }
    // kernel element count comes first: every size below depends on it
    let kernel_elems = kernel_side
      .checked_mul(kernel_side)
      .ok_or(ConfigurationError::KernelSideOverflow { side: kernel_side })?;

    if window_size == 0 {
      return Err(ConfigurationError::ZeroWindow);
    }
    let capacity = capacity.min(MAX_WINDOW_SIZE);
    if window_size > capacity {
      return Err(ConfigurationError::WindowTooLarge { window_size, capacity });
    }
    if kernel_elems > window_size {
      return Err(ConfigurationError::KernelLargerThanWindow {
        kernel_elems,
        window_size,
      });
    }

    Ok(Self::derive(kernel_side, kernel_elems, window_size))
  }

  // caller guarantees 1 <= kernel_elems <= window_size
  const fn derive(kernel_side: usize, kernel_elems: usize, window_size: usize) -> Self {
    Self {
      kernel_side,
      kernel_elems,
      window_size,
      iterations: window_size - kernel_elems + 1,
    }
  }

  pub fn kernel_side(&self) -> usize {
    self.kernel_side
  }

  pub fn kernel_elems(&self) -> usize {
    self.kernel_elems
  }

  pub fn window_size(&self) -> usize {
    self.window_size
  }

  pub fn iterations(&self) -> usize {
    self.iterations
  }

  /// Kernel ramp: `kernel[i] = i`
  pub fn kernel_buffer(&self) -> Vec<u32> {
    (0..self.kernel_elems).map(|i| i as u32).collect()
  }

  /// Window ramp: `window[i] = i + 1`
  pub fn window_buffer(&self) -> Vec<u32> {
    (0..self.window_size).map(|i| (i as u32).wrapping_add(1)).collect()
  }
}

// same checks as `with_capacity`, evaluated at compile time
const _: () = assert!(
  KERNEL_SIDE > 0
    && KERNEL_SIDE * KERNEL_SIDE <= WINDOW_SIZE
    && WINDOW_SIZE <= MAX_WINDOW_SIZE
);

const DEFAULT_SHAPE: BenchShape = BenchShape::derive(KERNEL_SIDE, KERNEL_SIDE * KERNEL_SIDE, WINDOW_SIZE);

impl Default for BenchShape {
  fn default() -> Self {
    DEFAULT_SHAPE
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_shape_matches_constants() {
    let shape = BenchShape::default();
    assert_eq!(shape, BenchShape::new(KERNEL_SIDE, WINDOW_SIZE).unwrap());
    assert_eq!(shape.kernel_elems(), 9);
    assert_eq!(shape.iterations(), 992);
  }

  #[test]
  fn iterations_follow_window_minus_kernel() {
    let shape = BenchShape::new(9, 4096).unwrap();
    assert_eq!(shape.kernel_elems(), 81);
    assert_eq!(shape.iterations(), 4016);

    // kernel exactly fills the window: one offset
    let tight = BenchShape::new(4, 16).unwrap();
    assert_eq!(tight.iterations(), 1);
  }

  #[test]
  fn kernel_larger_than_window_is_rejected() {
    let err = BenchShape::new(9, 80).unwrap_err();
    assert_eq!(
      err,
      ConfigurationError::KernelLargerThanWindow {
        kernel_elems: 81,
        window_size: 80
      }
    );
  }

  #[test]
  fn degenerate_sizes_are_rejected() {
    assert_eq!(BenchShape::new(0, 10).unwrap_err(), ConfigurationError::ZeroKernelSide);
    assert_eq!(BenchShape::new(1, 0).unwrap_err(), ConfigurationError::ZeroWindow);
    assert!(matches!(
      BenchShape::new(1, MAX_WINDOW_SIZE + 1),
      Err(ConfigurationError::WindowTooLarge { .. })
    ));
    assert!(matches!(
      BenchShape::new(usize::MAX, 10),
      Err(ConfigurationError::KernelSideOverflow { .. })
    ));
  }

  #[test]
  fn capacity_is_capped_at_addressable_limit() {
    assert_eq!(
      BenchShape::with_capacity(3, 7000, 100_000).unwrap_err(),
      ConfigurationError::WindowTooLarge {
        window_size: 7000,
        capacity: MAX_WINDOW_SIZE
      }
    );
    assert!(BenchShape::with_capacity(3, 64, 32).is_err());
  }

  #[test]
  fn ramps_follow_fill_rule() {
    let shape = BenchShape::new(2, 6).unwrap();
    assert_eq!(shape.kernel_buffer(), vec![0, 1, 2, 3]);
    assert_eq!(shape.window_buffer(), vec![1, 2, 3, 4, 5, 6]);
  }
}
