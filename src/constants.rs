//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available —
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Media Resolution Service
  pub default_endpoint: String,
  pub request_timeout_secs: u64,
  pub connect_timeout_secs: u64,
  pub user_agent: String,

  // URL validation
  pub recognized_domains: Vec<String>,

  // Download
  pub filename_prefix: String,

  // User-facing messages
  pub empty_input_prompt: String,
  pub invalid_url_prompt: String,
  pub rejected_fallback: String,
  pub transport_fallback: String,
  pub timeout_message: String,
  pub save_failed_message: String,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
