use crate::accel::ConvUnitConfig;
use crate::bench::driver::AccelMode;
use crate::config::{BenchShape, KERNEL_SIDE, MAX_WINDOW_SIZE, WINDOW_SIZE};
use crate::error::{BenchResult, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("default.toml");

/// Which backends a run measures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
  Software,
  Accelerator,
  #[default]
  Both,
}

impl Backend {
  pub fn runs_software(self) -> bool {
    matches!(self, Backend::Software | Backend::Both)
  }

  pub fn runs_accelerator(self) -> bool {
    matches!(self, Backend::Accelerator | Backend::Both)
  }
}

/// Accelerator realization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccelDevice {
  /// In-process simulated conv unit
  #[default]
  Sim,
  /// Custom instructions on the running RISC-V core
  Rocc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
  #[default]
  Text,
  Json,
}

/// `[bench]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BenchSection {
  #[serde(default = "default_kernel_side")]
  pub kernel_side: usize,
  #[serde(default = "default_window_size")]
  pub window_size: usize,
  #[serde(default = "default_max_window_size")]
  pub max_window_size: usize,
  #[serde(default)]
  pub backend: Backend,
  #[serde(default)]
  pub accel_mode: AccelMode,
  #[serde(default = "default_verify")]
  pub verify: bool,
}

fn default_kernel_side() -> usize {
  KERNEL_SIDE
}

fn default_window_size() -> usize {
  WINDOW_SIZE
}

fn default_max_window_size() -> usize {
  MAX_WINDOW_SIZE
}

fn default_verify() -> bool {
  true
}

impl Default for BenchSection {
  fn default() -> Self {
    Self {
      kernel_side: default_kernel_side(),
      window_size: default_window_size(),
      max_window_size: default_max_window_size(),
      backend: Backend::default(),
      accel_mode: AccelMode::default(),
      verify: default_verify(),
    }
  }
}

/// `[accel]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccelSection {
  #[serde(default)]
  pub device: AccelDevice,
  #[serde(flatten)]
  pub unit: ConvUnitConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportSection {
  #[serde(default)]
  pub format: ReportFormat,
}

/// Complete benchmark configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
  #[serde(default)]
  pub bench: BenchSection,
  #[serde(default)]
  pub accel: AccelSection,
  #[serde(default)]
  pub report: ReportSection,
}

impl AppConfig {
  /// Shape derived from the bench section
  pub fn shape(&self) -> Result<BenchShape, ConfigurationError> {
    BenchShape::with_capacity(self.bench.kernel_side, self.bench.window_size, self.bench.max_window_size)
  }
}

/// Command-line values that take precedence over every file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
  pub kernel_side: Option<usize>,
  pub window_size: Option<usize>,
  pub backend: Option<Backend>,
  pub accel_mode: Option<AccelMode>,
  pub device: Option<AccelDevice>,
  pub json: bool,
  pub no_verify: bool,
}

/// Built-in configuration
pub fn load_default_config() -> BenchResult<AppConfig> {
  Ok(toml::from_str(DEFAULT_CONFIG)?)
}

/// Overlay `override_table` onto `base`, recursing into nested tables
pub fn merge_tables(base: &mut toml::Table, override_table: toml::Table) {
  for (key, value) in override_table {
    match (base.get_mut(&key), value) {
      (Some(toml::Value::Table(dst)), toml::Value::Table(src)) => merge_tables(dst, src),
      (_, value) => {
        base.insert(key, value);
      },
    }
  }
}

pub fn apply_cli_overrides(config: &mut AppConfig, cli: &CliOverrides) {
  if let Some(side) = cli.kernel_side {
    config.bench.kernel_side = side;
  }
  if let Some(window) = cli.window_size {
    config.bench.window_size = window;
  }
  if let Some(backend) = cli.backend {
    config.bench.backend = backend;
  }
  if let Some(mode) = cli.accel_mode {
    config.bench.accel_mode = mode;
  }
  if let Some(device) = cli.device {
    config.accel.device = device;
  }
  if cli.json {
    config.report.format = ReportFormat::Json;
  }
  if cli.no_verify {
    config.bench.verify = false;
  }
}

/// Reject configurations that cannot run, before any measurement
pub fn validate_config(config: &AppConfig) -> Result<BenchShape, ConfigurationError> {
  // a file may tighten the capacity, never lift it past what the device addresses
  if config.bench.max_window_size > MAX_WINDOW_SIZE {
    return Err(ConfigurationError::Invalid(format!(
      "max_window_size {} exceeds the addressable limit of {} words",
      config.bench.max_window_size, MAX_WINDOW_SIZE
    )));
  }
  let shape = config.shape()?;

  if config.bench.backend.runs_accelerator() && config.accel.device == AccelDevice::Sim {
    // kernel and window both live in device memory
    let needed = shape.kernel_elems() + shape.window_size();
    if needed > config.accel.unit.mem_size {
      return Err(ConfigurationError::Invalid(format!(
        "accelerator memory of {} words cannot hold kernel and window ({} words)",
        config.accel.unit.mem_size, needed
      )));
    }
  }

  if config.bench.backend.runs_accelerator()
    && config.accel.device == AccelDevice::Rocc
    && config.bench.accel_mode == AccelMode::Advance
  {
    return Err(ConfigurationError::Invalid(
      "advance mode needs a device with a window feed; the rocc device has none".to_string(),
    ));
  }

  Ok(shape)
}

/// Resolve the effective configuration
///
/// 1. built-in defaults
/// 2. optional user file, merged key by key
/// 3. command-line overrides
/// 4. validation
pub fn load_and_merge_configs(custom_config_path: Option<&Path>, cli: &CliOverrides) -> BenchResult<(AppConfig, BenchShape)> {
  let mut table: toml::Table = toml::from_str(DEFAULT_CONFIG)?;

  if let Some(path) = custom_config_path {
    let content = fs::read_to_string(path)?;
    let custom: toml::Table = toml::from_str(&content)?;
    merge_tables(&mut table, custom);
  }

  let mut config: AppConfig = toml::Value::Table(table).try_into()?;
  apply_cli_overrides(&mut config, cli);
  let shape = validate_config(&config)?;

  Ok((config, shape))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_file_matches_constants() {
    let config = load_default_config().unwrap();
    assert_eq!(config.bench.kernel_side, KERNEL_SIDE);
    assert_eq!(config.bench.window_size, WINDOW_SIZE);
    assert_eq!(config.bench.max_window_size, MAX_WINDOW_SIZE);
    assert_eq!(config.bench.backend, Backend::Both);
    assert_eq!(config.bench.accel_mode, AccelMode::SteadyState);
    assert_eq!(config.accel.device, AccelDevice::Sim);
    assert_eq!(config.accel.unit, ConvUnitConfig::default());
    assert_eq!(config.report.format, ReportFormat::Text);
  }

  #[test]
  fn test_merge_keeps_unmentioned_keys() {
    let mut base: toml::Table = toml::from_str(DEFAULT_CONFIG).unwrap();
    let custom: toml::Table = toml::from_str("[bench]\nkernel_side = 9\n[accel]\nmac_latency = 4\n").unwrap();
    merge_tables(&mut base, custom);

    let config: AppConfig = toml::Value::Table(base).try_into().unwrap();
    assert_eq!(config.bench.kernel_side, 9);
    assert_eq!(config.bench.window_size, WINDOW_SIZE);
    assert_eq!(config.accel.unit.mac_latency, 4);
    assert_eq!(config.accel.unit.mem_size, 8192);
  }

  #[test]
  fn test_cli_overrides_win() {
    let mut config = AppConfig::default();
    apply_cli_overrides(
      &mut config,
      &CliOverrides {
        kernel_side: Some(9),
        window_size: Some(4096),
        accel_mode: Some(AccelMode::Advance),
        json: true,
        no_verify: true,
        ..Default::default()
      },
    );
    assert_eq!(config.shape().unwrap().iterations(), 4016);
    assert_eq!(config.bench.accel_mode, AccelMode::Advance);
    assert_eq!(config.report.format, ReportFormat::Json);
    assert!(!config.bench.verify);
  }

  #[test]
  fn test_validate_rejects_small_device_memory() {
    let mut config = AppConfig::default();
    config.accel.unit.mem_size = 100;
    assert!(matches!(validate_config(&config), Err(ConfigurationError::Invalid(_))));

    config.bench.backend = Backend::Software;
    assert!(validate_config(&config).is_ok());
  }

  #[test]
  fn test_validate_rejects_kernel_larger_than_window() {
    let mut config = AppConfig::default();
    config.bench.kernel_side = 40;
    assert!(matches!(
      validate_config(&config),
      Err(ConfigurationError::KernelLargerThanWindow { .. })
    ));
  }

  #[test]
  fn test_capacity_cannot_exceed_addressable_limit() {
    let mut config = AppConfig::default();
    config.bench.max_window_size = 100_000;
    config.bench.window_size = 7000;
    assert!(matches!(validate_config(&config), Err(ConfigurationError::Invalid(_))));

    // a tighter capacity is honored
    config.bench.max_window_size = 512;
    assert!(matches!(
      validate_config(&config),
      Err(ConfigurationError::WindowTooLarge { window_size: 7000, capacity: 512 })
    ));
  }

  #[test]
  fn test_rocc_has_no_advance_mode() {
    let mut config = AppConfig::default();
    config.accel.device = AccelDevice::Rocc;
    config.bench.accel_mode = AccelMode::Advance;
    assert!(validate_config(&config).is_err());
  }
}
