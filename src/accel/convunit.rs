use super::{AccelAddr, ConvAccel, WindowFeed, CONV_RUN_FUNCT, CONV_SET_BASE_FUNCT, CONV_SET_SIZE_FUNCT};
use crate::conv::conv1d;
use crate::error::AcceleratorFault;
use log::trace;
use serde::{Deserialize, Serialize};

/// ConvUnit parameters
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConvUnitConfig {
  /// Device memory size (u32 words)
  #[serde(default = "default_mem_size")]
  pub mem_size: usize,
  /// Cycles charged per instruction issue
  #[serde(default = "default_issue_latency")]
  pub issue_latency: u64,
  /// Cycles charged per multiply-accumulate
  #[serde(default = "default_mac_latency")]
  pub mac_latency: u64,
}

fn default_mem_size() -> usize {
  8192
}

fn default_issue_latency() -> u64 {
  1
}

fn default_mac_latency() -> u64 {
  1
}

impl Default for ConvUnitConfig {
  fn default() -> Self {
    Self {
      mem_size: default_mem_size(),
      issue_latency: default_issue_latency(),
      mac_latency: default_mac_latency(),
    }
  }
}

#[derive(Clone, Copy, Debug, Default)]
struct ConvUnitRegs {
  kernel_base: Option<u64>,
  window_base: Option<u64>,
  window_size: Option<u32>,
  kernel_size: Option<u32>,
}

/// Simulated convolution unit.
///
/// Word-addressed local memory plus the base/size registers. Instructions
/// arrive as `(funct, xs1, xs2)` the way a RoCC port delivers them; a `run`
/// reads straight from memory, so rewriting memory between runs changes what
/// the next run sees.
pub struct ConvUnit {
  config: ConvUnitConfig,
  mem: Vec<u32>,
  // bump pointer for `load`
  next_free: usize,
  regs: ConvUnitRegs,
  cycles: u64,
}

impl ConvUnit {
  pub fn new(config: ConvUnitConfig) -> Self {
    Self {
      mem: vec![0; config.mem_size],
      next_free: 0,
      regs: ConvUnitRegs::default(),
      cycles: 0,
      config,
    }
  }

  pub fn with_mem_size(mem_size: usize) -> Self {
    Self::new(ConvUnitConfig {
      mem_size,
      ..ConvUnitConfig::default()
    })
  }

  /// Copy `words` into the next free region of device memory.
  pub fn load(&mut self, words: &[u32]) -> Result<AccelAddr, AcceleratorFault> {
    let base = self.next_free;
    let end = self.check_range("load", base as u64, words.len())?;
    self.mem[base..end].copy_from_slice(words);
    self.next_free = end;
    trace!("ConvUnit: loaded {} words at {:#x}", words.len(), base);
    Ok(AccelAddr(base as u64))
  }

  /// Decode and execute one instruction; returns the rd value.
  pub fn execute(&mut self, funct: u64, xs1: u64, xs2: u64) -> Result<u64, AcceleratorFault> {
    self.cycles += self.config.issue_latency;

    if funct == CONV_SET_BASE_FUNCT {
      trace!("ConvUnit: setbase kernel={:#x} window={:#x}", xs1, xs2);
      self.regs.kernel_base = Some(xs1);
      self.regs.window_base = Some(xs2);
      Ok(0)
    } else if funct == CONV_SET_SIZE_FUNCT {
      let window_size = u32::try_from(xs1).map_err(|_| AcceleratorFault::Device(format!("window size {xs1} exceeds 32 bits")))?;
      let kernel_size = u32::try_from(xs2).map_err(|_| AcceleratorFault::Device(format!("kernel size {xs2} exceeds 32 bits")))?;
      trace!("ConvUnit: setsize window={} kernel={}", window_size, kernel_size);
      self.regs.window_size = Some(window_size);
      self.regs.kernel_size = Some(kernel_size);
      Ok(0)
    } else if funct == CONV_RUN_FUNCT {
      self.conv_run().map(u64::from)
    } else {
      Err(AcceleratorFault::UnknownFunct(funct))
    }
  }

  fn conv_run(&mut self) -> Result<u32, AcceleratorFault> {
    let (kernel_base, window_base, window_size, kernel_size) = match self.regs {
      ConvUnitRegs {
        kernel_base: Some(kb),
        window_base: Some(wb),
        window_size: Some(ws),
        kernel_size: Some(ks),
      } => (kb, wb, ws as usize, ks as usize),
      _ => return Err(AcceleratorFault::NotConfigured),
    };

    let kernel = self.region("kernel", kernel_base, kernel_size)?;
    let window = self.region("window", window_base, window_size)?;
    let result = conv1d(kernel, window, kernel_size, window_size);

    self.cycles += kernel_size.min(window_size) as u64 * self.config.mac_latency;
    Ok(result)
  }

  fn region(&self, region: &'static str, addr: u64, len: usize) -> Result<&[u32], AcceleratorFault> {
    let end = self.check_range(region, addr, len)?;
    Ok(&self.mem[addr as usize..end])
  }

  fn check_range(&self, region: &'static str, addr: u64, len: usize) -> Result<usize, AcceleratorFault> {
    let fault = || AcceleratorFault::OutOfRange {
      region,
      addr,
      len,
      mem_size: self.mem.len(),
    };
    let base = usize::try_from(addr).map_err(|_| fault())?;
    match base.checked_add(len) {
      Some(end) if end <= self.mem.len() => Ok(end),
      _ => Err(fault()),
    }
  }

  /// Cycles consumed since construction
  pub fn cycles(&self) -> u64 {
    self.cycles
  }
}

impl ConvAccel for ConvUnit {
  fn set_base(&mut self, kernel: AccelAddr, window: AccelAddr) -> Result<(), AcceleratorFault> {
    self.execute(CONV_SET_BASE_FUNCT, kernel.raw(), window.raw()).map(|_| ())
  }

  fn set_size(&mut self, window_size: u32, kernel_size: u32) -> Result<(), AcceleratorFault> {
    self
      .execute(CONV_SET_SIZE_FUNCT, window_size as u64, kernel_size as u64)
      .map(|_| ())
  }

  fn run(&mut self) -> Result<u32, AcceleratorFault> {
    // rd carries a zero-extended u32
    self.execute(CONV_RUN_FUNCT, 0, 0).map(|rd| rd as u32)
  }
}

impl WindowFeed for ConvUnit {
  fn stage_window(&mut self, words: &[u32]) -> Result<(), AcceleratorFault> {
    let (base, size) = match (self.regs.window_base, self.regs.window_size) {
      (Some(base), Some(size)) => (base, size as usize),
      _ => return Err(AcceleratorFault::NotConfigured),
    };
    if words.len() > size {
      return Err(AcceleratorFault::OutOfRange {
        region: "window",
        addr: base,
        len: words.len(),
        mem_size: size,
      });
    }
    let end = self.check_range("window", base, words.len())?;
    self.mem[base as usize..end].copy_from_slice(words);
    Ok(())
  }
}
