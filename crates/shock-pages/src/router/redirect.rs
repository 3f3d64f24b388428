//! Structured redirects.

use crate::component::Component;
use crate::error::RouterError;

use super::core::Router;

/// A navigation to a named route, built ahead of time and followed later.
///
/// `Redirect::to("About").follow(&router)` is the same as
/// `router.navigate("About")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
	target: String,
}

impl Redirect {
	/// Creates a redirect to the route `name`.
	pub fn to(name: impl Into<String>) -> Self {
		Self {
			target: name.into(),
		}
	}

	/// Name of the target route.
	pub fn target(&self) -> &str {
		&self.target
	}

	/// Navigates the router to the target route.
	pub async fn follow(&self, router: &Router) -> Result<Component, RouterError> {
		router.navigate(&self.target).await
	}

	/// Queues the navigation on the router's scheduler.
	pub fn follow_later(&self, router: &Router) {
		router.navigate_later(&self.target);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_target() {
		let redirect = Redirect::to("About");
		assert_eq!(redirect.target(), "About");
		assert_eq!(redirect, Redirect::to(String::from("About")));
	}
}
