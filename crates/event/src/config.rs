//! Listener scanning configuration.

use serde::Deserialize;

/// Environment variable overriding [`ScanConfig::multi_thread_threshold`].
pub const SCAN_THREAD_THRESHOLD_ENV: &str = "PHASEBUS_SCAN_THREAD_THRESHOLD";

const DEFAULT_MULTI_THREAD_THRESHOLD: usize = 5;

/// How a [`ListenerCatalog`](crate::ListenerCatalog) scans its sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
	/// Scan sources on one thread each once at least this many are given.
	pub multi_thread_threshold: usize,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			multi_thread_threshold: DEFAULT_MULTI_THREAD_THRESHOLD,
		}
	}
}

impl ScanConfig {
	/// Default configuration with environment overrides applied.
	pub fn from_env() -> Self {
		Self {
			multi_thread_threshold: parse_threshold(std::env::var(SCAN_THREAD_THRESHOLD_ENV).ok()),
		}
	}
}

fn parse_threshold(value: Option<String>) -> usize {
	value
		.and_then(|v| v.trim().parse::<usize>().ok())
		.unwrap_or(DEFAULT_MULTI_THREAD_THRESHOLD)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_threshold() {
		assert_eq!(parse_threshold(None), 5);
		assert_eq!(parse_threshold(Some("12".into())), 12);
		assert_eq!(parse_threshold(Some(" 2 ".into())), 2);
		assert_eq!(parse_threshold(Some("many".into())), 5);
	}

	#[test]
	fn test_deserialize_with_defaults() {
		let empty: ScanConfig = serde_json::from_str("{}").unwrap();
		assert_eq!(empty, ScanConfig::default());

		let set: ScanConfig = serde_json::from_str(r#"{"multi_thread_threshold": 1}"#).unwrap();
		assert_eq!(set.multi_thread_threshold, 1);
	}
}
