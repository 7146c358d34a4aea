//! Convolution instructions issued on a RISC-V core with the conv unit
//! attached to its RoCC port.
//!
//! Encoding: custom-0 major opcode, R-type, `funct7` selects the operation.
//! `funct3` carries the RoCC xd/xs1/xs2 bits.

use super::{AccelAddr, ConvAccel, CONV_RUN_FUNCT, CONV_SET_BASE_FUNCT, CONV_SET_SIZE_FUNCT};
use crate::error::AcceleratorFault;
use core::arch::asm;

const CUSTOM_0: u32 = 0x0b;
// xd=0 xs1=1 xs2=1
const FUNCT3_WRITE: u32 = 0b011;
// xd=1 xs1=0 xs2=0
const FUNCT3_READ: u32 = 0b100;

const SET_BASE: u32 = CONV_SET_BASE_FUNCT as u32;
const SET_SIZE: u32 = CONV_SET_SIZE_FUNCT as u32;
const RUN: u32 = CONV_RUN_FUNCT as u32;

/// The hardware convolution unit.
///
/// Addresses handed to [`ConvAccel::set_base`] are raw pointers; build them
/// with [`AccelAddr::from_slice`] over buffers that outlive every `run`.
pub struct RoccConv {
  _private: (),
}

impl RoccConv {
  /// # Safety
  ///
  /// The core must implement the convolution custom instructions; on any
  /// other core they trap as illegal instructions.
  pub unsafe fn new() -> Self {
    Self { _private: () }
  }
}

impl ConvAccel for RoccConv {
  fn set_base(&mut self, kernel: AccelAddr, window: AccelAddr) -> Result<(), AcceleratorFault> {
    let kernel = kernel.raw() as usize;
    let window = window.raw() as usize;
    unsafe {
      asm!(
        ".insn r {op}, {f3}, {f7}, x0, {rs1}, {rs2}",
        op = const CUSTOM_0,
        f3 = const FUNCT3_WRITE,
        f7 = const SET_BASE,
        rs1 = in(reg) kernel,
        rs2 = in(reg) window,
        options(nostack),
      );
    }
    Ok(())
  }

  fn set_size(&mut self, window_size: u32, kernel_size: u32) -> Result<(), AcceleratorFault> {
    let window_size = window_size as usize;
    let kernel_size = kernel_size as usize;
    unsafe {
      asm!(
        ".insn r {op}, {f3}, {f7}, x0, {rs1}, {rs2}",
        op = const CUSTOM_0,
        f3 = const FUNCT3_WRITE,
        f7 = const SET_SIZE,
        rs1 = in(reg) window_size,
        rs2 = in(reg) kernel_size,
        options(nostack),
      );
    }
    Ok(())
  }

  fn run(&mut self) -> Result<u32, AcceleratorFault> {
    let rd: usize;
    // no `nomem`: the unit reads kernel and window memory
    unsafe {
      asm!(
        ".insn r {op}, {f3}, {f7}, {rd}, x0, x0",
        op = const CUSTOM_0,
        f3 = const FUNCT3_READ,
        f7 = const RUN,
        rd = out(reg) rd,
        options(nostack),
      );
    }
    Ok(rd as u32)
  }
}
