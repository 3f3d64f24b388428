//! Engine settings.
//!
//! Settings are attached to a [`Document`](crate::dom::Document) and shared by
//! every component rendered into it. They can be built in code or loaded from
//! TOML:
//!
//! ```
//! use shock_pages::settings::{EngineSettings, StylesheetFailurePolicy};
//!
//! let settings = EngineSettings::from_toml_str(r#"
//! stylesheet_failure = "fatal"
//! auto_settle_stylesheets = true
//! "#).unwrap();
//!
//! assert_eq!(settings.stylesheet_failure, StylesheetFailurePolicy::Fatal);
//! assert!(settings.window_listener_advisory);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What a render does when one of its stylesheets fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylesheetFailurePolicy {
	/// Log the failure and render anyway.
	#[default]
	Degrade,
	/// Fail the render before the document is mutated.
	Fatal,
}

/// Settings shared by all components of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
	/// Policy applied when a stylesheet load fails during render.
	pub stylesheet_failure: StylesheetFailurePolicy,
	/// Emit an advisory when a behavior appears to attach window listeners.
	pub window_listener_advisory: bool,
	/// Mark stylesheet links as loaded as soon as they are inserted.
	pub auto_settle_stylesheets: bool,
}

impl Default for EngineSettings {
	fn default() -> Self {
		Self {
			stylesheet_failure: StylesheetFailurePolicy::Degrade,
			window_listener_advisory: true,
			auto_settle_stylesheets: false,
		}
	}
}

impl EngineSettings {
	/// Parses settings from a TOML document. Missing keys keep their defaults.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Toml`] if the source is not valid TOML or a key
	/// has the wrong type.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	/// Sets the stylesheet failure policy.
	pub fn with_stylesheet_failure(mut self, policy: StylesheetFailurePolicy) -> Self {
		self.stylesheet_failure = policy;
		self
	}

	/// Enables or disables the window listener advisory.
	pub fn with_window_listener_advisory(mut self, enabled: bool) -> Self {
		self.window_listener_advisory = enabled;
		self
	}

	/// Enables or disables settling stylesheet links on insertion.
	pub fn with_auto_settle_stylesheets(mut self, enabled: bool) -> Self {
		self.auto_settle_stylesheets = enabled;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let settings = EngineSettings::default();

		assert_eq!(settings.stylesheet_failure, StylesheetFailurePolicy::Degrade);
		assert!(settings.window_listener_advisory);
		assert!(!settings.auto_settle_stylesheets);
	}

	#[rstest]
	fn test_empty_toml_yields_defaults() {
		let settings = EngineSettings::from_toml_str("").unwrap();
		assert_eq!(settings, EngineSettings::default());
	}

	#[rstest]
	#[case("stylesheet_failure = \"degrade\"", StylesheetFailurePolicy::Degrade)]
	#[case("stylesheet_failure = \"fatal\"", StylesheetFailurePolicy::Fatal)]
	fn test_failure_policy_from_toml(
		#[case] source: &str,
		#[case] expected: StylesheetFailurePolicy,
	) {
		let settings = EngineSettings::from_toml_str(source).unwrap();
		assert_eq!(settings.stylesheet_failure, expected);
	}

	#[rstest]
	fn test_full_toml() {
		let settings = EngineSettings::from_toml_str(
			r#"
			stylesheet_failure = "fatal"
			window_listener_advisory = false
			auto_settle_stylesheets = true
			"#,
		)
		.unwrap();

		assert_eq!(
			settings,
			EngineSettings::default()
				.with_stylesheet_failure(StylesheetFailurePolicy::Fatal)
				.with_window_listener_advisory(false)
				.with_auto_settle_stylesheets(true)
		);
	}

	#[rstest]
	#[case("stylesheet_failure = \"explode\"")]
	#[case("window_listener_advisory = \"yes\"")]
	#[case("auto_settle_stylesheets = ")]
	fn test_invalid_toml_is_rejected(#[case] source: &str) {
		let result = EngineSettings::from_toml_str(source);
		assert!(matches!(result, Err(ConfigError::Toml(_))));
	}
}
