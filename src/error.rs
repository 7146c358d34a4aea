use thiserror::Error;

pub type BenchResult<T> = Result<T, BenchError>;

/// Rejected benchmark shapes. Raised before any measurement begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
  #[error("kernel side must be at least 1")]
  ZeroKernelSide,

  #[error("kernel side {side} overflows the kernel element count")]
  KernelSideOverflow { side: usize },

  #[error("window size must be at least 1")]
  ZeroWindow,

  #[error("window size {window_size} exceeds capacity {capacity}")]
  WindowTooLarge { window_size: usize, capacity: usize },

  #[error("kernel of {kernel_elems} elements does not fit in a window of {window_size}")]
  KernelLargerThanWindow { kernel_elems: usize, window_size: usize },

  #[error("slice at offset {offset} of length {len} runs past buffer end {buffer_len}")]
  SliceOutOfBounds { offset: usize, len: usize, buffer_len: usize },

  #[error("result buffer holds {got} entries, expected {expected}")]
  ResultBufferSize { expected: usize, got: usize },

  #[error("invalid configuration: {0}")]
  Invalid(String),
}

/// Failures reported by the low-level accelerator operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcceleratorFault {
  #[error("run issued before base addresses and sizes were set")]
  NotConfigured,

  #[error("{region} region at {addr:#x} with {len} words exceeds device memory of {mem_size} words")]
  OutOfRange {
    region: &'static str,
    addr: u64,
    len: usize,
    mem_size: usize,
  },

  #[error("accelerator busy")]
  Busy,

  #[error("unknown accelerator funct {0}")]
  UnknownFunct(u64),

  #[error("device fault: {0}")]
  Device(String),
}

#[derive(Debug, Error)]
pub enum BenchError {
  #[error(transparent)]
  Configuration(#[from] ConfigurationError),

  #[error("accelerator fault: {0}")]
  Accelerator(#[from] AcceleratorFault),

  #[error("accelerator already claimed by another caller")]
  Contention,

  #[error("i/o failure: {0}")]
  Io(#[from] std::io::Error),

  #[error("toml parse failure: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("toml render failure: {0}")]
  TomlRender(#[from] toml::ser::Error),

  #[error("json failure: {0}")]
  Json(#[from] serde_json::Error),
}
