//! Render-time checks on a component's template and behavior.

use crate::error::RenderError;

use super::behavior::Behavior;

/// Returns the template if it has non-whitespace content.
pub fn validate_template(template: Option<&str>) -> Result<&str, RenderError> {
	match template {
		Some(template) if !template.trim().is_empty() => Ok(template),
		_ => Err(RenderError::InvalidTemplate),
	}
}

/// Checks that a registered behavior can be invoked.
///
/// A behavior that is currently running cannot be invoked again, which is
/// what happens when it renders its own component.
pub fn validate_behavior(behavior: Option<&Behavior>) -> Result<(), RenderError> {
	match behavior {
		Some(behavior) if !behavior.is_invocable() => Err(RenderError::InvalidBehavior(
			"behavior is currently executing".to_string(),
		)),
		_ => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(None)]
	#[case(Some(""))]
	#[case(Some("   "))]
	#[case(Some("\n\t  \n"))]
	fn test_invalid_templates(#[case] template: Option<&str>) {
		assert_eq!(validate_template(template), Err(RenderError::InvalidTemplate));
	}

	#[rstest]
	#[case("<div>Home</div>")]
	#[case("  text  ")]
	fn test_valid_templates(#[case] template: &str) {
		assert_eq!(validate_template(Some(template)), Ok(template));
	}

	#[rstest]
	fn test_absent_behavior_is_valid() {
		assert_eq!(validate_behavior(None), Ok(()));
		assert_eq!(validate_behavior(Some(&Behavior::new(|_| {}))), Ok(()));
	}
}
