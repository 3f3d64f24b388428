//! Error types for the component engine.
//!
//! Each concern gets its own enum. Errors that can be detected before the
//! document is touched are returned to the caller; problems discovered while
//! waiting on stylesheets are logged and, by default, do not fail a render.

use thiserror::Error;

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors returned by [`Component::render`](crate::component::Component::render).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RenderError {
	/// The template is missing, empty, or whitespace only.
	#[error("template is missing")]
	InvalidTemplate,

	/// A behavior is registered but cannot be invoked.
	#[error("behavior cannot be invoked: {0}")]
	InvalidBehavior(String),

	/// No target container was supplied, or it is no longer in the document.
	#[error("render target is missing")]
	MissingTarget,

	/// A stylesheet failed to load and the document treats that as fatal.
	#[error(transparent)]
	Stylesheet(#[from] StylesheetError),
}

/// Outcome of a failed stylesheet load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StylesheetError {
	/// The document signalled a load error for the link.
	#[error("stylesheet {href} failed to load: {reason}")]
	LoadFailed {
		/// Resolved href of the link.
		href: String,
		/// Reason reported by the document.
		reason: String,
	},

	/// The document went away before the load settled.
	#[error("stylesheet {href} was abandoned before it settled")]
	Abandoned {
		/// Resolved href of the link.
		href: String,
	},
}

impl StylesheetError {
	/// Returns the resolved href the error refers to.
	pub fn href(&self) -> &str {
		match self {
			Self::LoadFailed { href, .. } | Self::Abandoned { href } => href,
		}
	}
}

/// Errors raised by host document operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DomError {
	/// The element handle no longer refers to a node in a live document.
	#[error("element is detached from the document")]
	Detached,

	/// No element carries the requested id.
	#[error("no element with id '{0}'")]
	ElementNotFound(String),
}

/// Errors raised while loading [`EngineSettings`](crate::settings::EngineSettings).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
	/// The TOML source could not be parsed into settings.
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Errors raised by the [`Router`](crate::router::Router).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RouterError {
	/// No route is registered under the name.
	#[error("route not found: {0}")]
	NotFound(String),

	/// The outlet container is not present in the document.
	#[error("router outlet '{0}' is not in the document")]
	OutletMissing(String),

	/// The routed component failed to render.
	#[error("render failed: {0}")]
	Render(#[from] RenderError),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_stylesheet_error_href() {
		let failed = StylesheetError::LoadFailed {
			href: "/app/a.css".to_string(),
			reason: "404".to_string(),
		};
		let abandoned = StylesheetError::Abandoned {
			href: "/app/b.css".to_string(),
		};

		assert_eq!(failed.href(), "/app/a.css");
		assert_eq!(abandoned.href(), "/app/b.css");
	}

	#[rstest]
	fn test_render_error_wraps_stylesheet_error() {
		let err: RenderError = StylesheetError::Abandoned {
			href: "/x.css".to_string(),
		}
		.into();

		assert_eq!(
			err.to_string(),
			"stylesheet /x.css was abandoned before it settled"
		);
	}

	#[rstest]
	fn test_router_error_display() {
		assert_eq!(
			RouterError::NotFound("Contact".to_string()).to_string(),
			"route not found: Contact"
		);
		assert_eq!(
			RouterError::from(RenderError::MissingTarget).to_string(),
			"render failed: render target is missing"
		);
	}
}
