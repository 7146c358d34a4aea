use super::ConvInvoker;
use crate::error::{AcceleratorFault, BenchError, BenchResult};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

/// Shared handle to a single accelerator.
///
/// Only one caller may hold the invoker at a time; a second concurrent claim
/// fails with [`BenchError::Contention`] instead of waiting.
pub struct AccelPort<A> {
  inner: Arc<Mutex<ConvInvoker<A>>>,
}

impl<A> AccelPort<A> {
  pub fn new(invoker: ConvInvoker<A>) -> Self {
    Self {
      inner: Arc::new(Mutex::new(invoker)),
    }
  }

  pub fn claim(&self) -> BenchResult<MutexGuard<'_, ConvInvoker<A>>> {
    match self.inner.try_lock() {
      Ok(guard) => Ok(guard),
      Err(TryLockError::WouldBlock) => Err(BenchError::Contention),
      Err(TryLockError::Poisoned(_)) => Err(BenchError::Accelerator(AcceleratorFault::Device(
        "accelerator owner panicked mid-run".to_string(),
      ))),
    }
  }
}

impl<A> Clone for AccelPort<A> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}
