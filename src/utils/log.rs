/// Global logging configuration

/// Set logging enabled; disabled still lets warnings and errors through
pub fn set_log(enabled: bool) {
  log::set_max_level(if enabled {
    log::LevelFilter::Info
  } else {
    log::LevelFilter::Warn
  });
}

/// Install the env_logger backend at `info`, overridable through `RUST_LOG`.
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init_log() {
  let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    .format_timestamp(None)
    .try_init();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_init_log_twice() {
    init_log();
    init_log();
    set_log(false);
    assert_eq!(log::max_level(), log::LevelFilter::Warn);
    set_log(true);
    assert_eq!(log::max_level(), log::LevelFilter::Info);
  }
}
