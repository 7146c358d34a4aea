/// One-shot configuration protocol for the convolution accelerator
use super::{AccelAddr, ConvAccel, WindowFeed};
use crate::error::AcceleratorFault;
use log::{debug, trace};
use serde::Serialize;

/// Register values programmed by the first invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ConvRegs {
  pub kernel_base: AccelAddr,
  pub window_base: AccelAddr,
  pub window_size: u32,
  pub kernel_size: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvokerState {
  /// Base and size registers never written
  Uninitialized,
  /// Registers written once; sticky for the lifetime of the handle
  Configured(ConvRegs),
}

/// Sole owner of an accelerator and of its configuration state.
///
/// The first [`invoke`](ConvInvoker::invoke) issues `set_base`, `set_size`
/// and `run` in that order. Every later call issues only `run` and discards
/// its arguments; the accelerator keeps reading through the registers set the
/// first time. There is no way to reconfigure a handle: release the device
/// with [`into_inner`](ConvInvoker::into_inner) and build a new one.
pub struct ConvInvoker<A> {
  device: A,
  state: InvokerState,
  runs: u64,
}

impl<A: ConvAccel> ConvInvoker<A> {
  pub fn new(device: A) -> Self {
    Self {
      device,
      state: InvokerState::Uninitialized,
      runs: 0,
    }
  }

  pub fn invoke(
    &mut self,
    kernel: AccelAddr,
    window: AccelAddr,
    kernel_size: u32,
    window_size: u32,
  ) -> Result<u32, AcceleratorFault> {
    if let InvokerState::Configured(_) = self.state {
      trace!("conv invoke: run only, ignoring {:#x}/{:#x}", kernel.raw(), window.raw());
      return self.run();
    }

    // state only flips after all three operations succeed
    self.device.set_base(kernel, window)?;
    self.device.set_size(window_size, kernel_size)?;
    let result = self.run()?;

    let regs = ConvRegs {
      kernel_base: kernel,
      window_base: window,
      window_size,
      kernel_size,
    };
    debug!(
      "conv accelerator configured: kernel={:#x} window={:#x} window_size={} kernel_size={}",
      regs.kernel_base.raw(),
      regs.window_base.raw(),
      regs.window_size,
      regs.kernel_size
    );
    self.state = InvokerState::Configured(regs);
    Ok(result)
  }

  fn run(&mut self) -> Result<u32, AcceleratorFault> {
    let result = self.device.run()?;
    self.runs += 1;
    Ok(result)
  }
}

impl<A> ConvInvoker<A> {
  pub fn state(&self) -> InvokerState {
    self.state
  }

  pub fn is_configured(&self) -> bool {
    matches!(self.state, InvokerState::Configured(_))
  }

  pub fn config(&self) -> Option<ConvRegs> {
    match self.state {
      InvokerState::Configured(regs) => Some(regs),
      InvokerState::Uninitialized => None,
    }
  }

  /// Successful `run` operations issued through this handle
  pub fn runs(&self) -> u64 {
    self.runs
  }

  pub fn device(&self) -> &A {
    &self.device
  }

  pub fn into_inner(self) -> A {
    self.device
  }
}

impl<A: WindowFeed> WindowFeed for ConvInvoker<A> {
  fn stage_window(&mut self, words: &[u32]) -> Result<(), AcceleratorFault> {
    self.device.stage_window(words)
  }
}
