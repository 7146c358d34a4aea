// Convolution accelerator: low-level capability, invocation protocol, devices

pub mod convunit;
pub mod invoke;
pub mod port;
#[cfg(all(feature = "rocc", any(target_arch = "riscv32", target_arch = "riscv64")))]
pub mod rocc;

pub use convunit::{ConvUnit, ConvUnitConfig};
pub use invoke::{ConvInvoker, ConvRegs, InvokerState};
pub use port::AccelPort;

use crate::error::AcceleratorFault;
use serde::Serialize;

// funct codes of the convolution instructions (custom-0 opcode space)
pub const CONV_SET_BASE_FUNCT: u64 = 40;
pub const CONV_SET_SIZE_FUNCT: u64 = 41;
pub const CONV_RUN_FUNCT: u64 = 42;

/// Address as seen by the accelerator.
///
/// Word index into device memory for the simulated unit, raw pointer value
/// for the RoCC device.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AccelAddr(pub u64);

impl AccelAddr {
  pub const fn raw(self) -> u64 {
    self.0
  }

  pub fn from_slice<T>(s: &[T]) -> Self {
    AccelAddr(s.as_ptr() as u64)
  }
}

/// The three operations a convolution accelerator exposes.
pub trait ConvAccel {
  /// Point the unit at the kernel and window buffers.
  fn set_base(&mut self, kernel: AccelAddr, window: AccelAddr) -> Result<(), AcceleratorFault>;

  /// Program the window and kernel lengths, in elements.
  fn set_size(&mut self, window_size: u32, kernel_size: u32) -> Result<(), AcceleratorFault>;

  /// Reduce the kernel against whatever the window base currently holds.
  fn run(&mut self) -> Result<u32, AcceleratorFault>;
}

/// Rewrites the window data an already configured accelerator reads.
///
/// Not part of the three-operation protocol: this is how a driver moves the
/// accelerator's view along the window without reprogramming base registers.
pub trait WindowFeed {
  fn stage_window(&mut self, words: &[u32]) -> Result<(), AcceleratorFault>;
}

impl<A: ConvAccel + ?Sized> ConvAccel for &mut A {
  fn set_base(&mut self, kernel: AccelAddr, window: AccelAddr) -> Result<(), AcceleratorFault> {
    (**self).set_base(kernel, window)
  }

  fn set_size(&mut self, window_size: u32, kernel_size: u32) -> Result<(), AcceleratorFault> {
    (**self).set_size(window_size, kernel_size)
  }

  fn run(&mut self) -> Result<u32, AcceleratorFault> {
    (**self).run()
  }
}

impl<A: WindowFeed + ?Sized> WindowFeed for &mut A {
  fn stage_window(&mut self, words: &[u32]) -> Result<(), AcceleratorFault> {
    (**self).stage_window(words)
  }
}
