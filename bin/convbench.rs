use clap::Parser;
use convbench::bench::config::config::{load_and_merge_configs, AccelDevice, Backend, CliOverrides, ReportFormat};
use convbench::bench::{run_benchmark, AccelMode};
use convbench::error::{BenchResult, ConfigurationError};
use convbench::utils::log::{init_log, set_log};
use std::path::PathBuf;

/// convbench - sliding-window convolution benchmark
#[derive(Parser, Debug)]
#[command(name = "convbench")]
#[command(version = "0.1.0")]
#[command(about = "Software vs accelerator 1D convolution benchmark", long_about = None)]
struct Args {
  /// Kernel side length; the kernel holds side*side elements
  #[arg(short, long, value_name = "N")]
  side: Option<usize>,

  /// Window length in 32-bit words
  #[arg(short, long, value_name = "WORDS")]
  window: Option<usize>,

  /// Backends to measure: software, accelerator or both
  #[arg(short, long, value_name = "BACKEND")]
  backend: Option<String>,

  /// Accelerator walk: steady-state or advance
  #[arg(short, long, value_name = "MODE")]
  mode: Option<String>,

  /// Accelerator device: sim or rocc
  #[arg(short, long, value_name = "DEVICE")]
  device: Option<String>,

  /// TOML file merged over the built-in configuration
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Quiet mode (suppress log messages)
  #[arg(short, long)]
  quiet: bool,

  /// Print the report as JSON
  #[arg(long)]
  json: bool,

  /// Skip the accelerator/software cross-check
  #[arg(long)]
  no_verify: bool,

  /// Print the effective configuration and exit
  #[arg(long)]
  dump_config: bool,
}

fn invalid(what: &str, value: &str) -> ConfigurationError {
  ConfigurationError::Invalid(format!("unknown {}: {}", what, value))
}

fn parse_backend(s: &str) -> Result<Backend, ConfigurationError> {
  match s.to_lowercase().as_str() {
    "software" | "sw" => Ok(Backend::Software),
    "accelerator" | "accel" | "hw" => Ok(Backend::Accelerator),
    "both" => Ok(Backend::Both),
    _ => Err(invalid("backend", s)),
  }
}

fn parse_mode(s: &str) -> Result<AccelMode, ConfigurationError> {
  match s.to_lowercase().as_str() {
    "steady-state" | "steady" => Ok(AccelMode::SteadyState),
    "advance" => Ok(AccelMode::Advance),
    _ => Err(invalid("accelerator mode", s)),
  }
}

fn parse_device(s: &str) -> Result<AccelDevice, ConfigurationError> {
  match s.to_lowercase().as_str() {
    "sim" => Ok(AccelDevice::Sim),
    "rocc" => Ok(AccelDevice::Rocc),
    _ => Err(invalid("device", s)),
  }
}

fn main() -> BenchResult<()> {
  init_log();

  let args = Args::parse();
  if args.quiet {
    set_log(false);
  }

  let overrides = CliOverrides {
    kernel_side: args.side,
    window_size: args.window,
    backend: args.backend.as_deref().map(parse_backend).transpose()?,
    accel_mode: args.mode.as_deref().map(parse_mode).transpose()?,
    device: args.device.as_deref().map(parse_device).transpose()?,
    json: args.json,
    no_verify: args.no_verify,
  };

  let (config, shape) = load_and_merge_configs(args.config.as_deref(), &overrides)?;

  if args.dump_config {
    print!("{}", toml::to_string_pretty(&config)?);
    return Ok(());
  }

  let report = run_benchmark(&config, &shape)?;
  match config.report.format {
    ReportFormat::Text => print!("{}", report.render_text()),
    ReportFormat::Json => println!("{}", report.to_json()?),
  }

  Ok(())
}
