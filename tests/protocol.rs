use convbench::accel::{AccelAddr, ConvAccel, ConvInvoker, ConvUnit, InvokerState};
use convbench::bench::driver::{drive_steady, AccelBases};
use convbench::config::BenchShape;
use convbench::conv::conv1d;
use convbench::error::AcceleratorFault;

/// Records every protocol call and computes on host buffers
#[derive(Default)]
struct Spy {
  kernel: Vec<u32>,
  window: Vec<u32>,
  set_base_calls: usize,
  set_size_calls: usize,
  run_calls: usize,
  sizes: Option<(u32, u32)>,
  fail_run: bool,
}

impl ConvAccel for Spy {
  fn set_base(&mut self, _kernel: AccelAddr, _window: AccelAddr) -> Result<(), AcceleratorFault> {
    self.set_base_calls += 1;
    Ok(())
  }

  fn set_size(&mut self, window_size: u32, kernel_size: u32) -> Result<(), AcceleratorFault> {
    self.set_size_calls += 1;
    self.sizes = Some((window_size, kernel_size));
    Ok(())
  }

  fn run(&mut self) -> Result<u32, AcceleratorFault> {
    self.run_calls += 1;
    if self.fail_run {
      return Err(AcceleratorFault::Busy);
    }
    let (w, k) = self.sizes.ok_or(AcceleratorFault::NotConfigured)?;
    Ok(conv1d(&self.kernel, &self.window, k as usize, w as usize))
  }
}

fn spy_for(shape: &BenchShape) -> Spy {
  Spy {
    kernel: shape.kernel_buffer(),
    window: shape.window_buffer(),
    ..Default::default()
  }
}

#[test]
fn test_configuration_is_issued_once() {
  let shape = BenchShape::default();
  let mut invoker = ConvInvoker::new(spy_for(&shape));
  let mut results = vec![0; shape.iterations()];
  let bases = AccelBases {
    kernel: AccelAddr(0),
    window: AccelAddr(0x1000),
  };

  drive_steady(&shape, &mut invoker, bases, &mut results).unwrap();

  let spy = invoker.into_inner();
  assert_eq!(spy.set_base_calls, 1);
  assert_eq!(spy.set_size_calls, 1);
  assert_eq!(spy.run_calls, 992);
  assert_eq!(spy.sizes, Some((1000, 9)));
  assert!(results.iter().all(|&r| r == 240));
}

#[test]
fn test_failed_first_run_leaves_invoker_unconfigured() {
  let shape = BenchShape::default();
  let mut spy = spy_for(&shape);
  spy.fail_run = true;
  let mut invoker = ConvInvoker::new(spy);

  let err = invoker.invoke(AccelAddr(0), AccelAddr(0x1000), 9, 1000).unwrap_err();
  assert_eq!(err, AcceleratorFault::Busy);
  assert_eq!(invoker.state(), InvokerState::Uninitialized);
}

#[test]
fn test_later_arguments_are_ignored_once_configured() {
  let shape = BenchShape::default();
  let mut unit = ConvUnit::with_mem_size(shape.kernel_elems() + shape.window_size());
  let kernel = unit.load(&shape.kernel_buffer()).unwrap();
  let window = unit.load(&shape.window_buffer()).unwrap();
  let mut invoker = ConvInvoker::new(unit);

  let first = invoker.invoke(kernel, window, 9, 1000).unwrap();
  // a different window pointer has no effect after configuration
  let again = invoker.invoke(kernel, AccelAddr(window.raw() + 5), 9, 1000).unwrap();
  assert_eq!(first, 240);
  assert_eq!(again, 240);
  assert_eq!(invoker.runs(), 2);
}

#[test]
fn test_unit_rejects_run_before_configuration() {
  let mut unit = ConvUnit::with_mem_size(16);
  assert_eq!(unit.run(), Err(AcceleratorFault::NotConfigured));
}
