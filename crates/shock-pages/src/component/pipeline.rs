//! The render pipeline.

use std::rc::Rc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::dom::Element;
use crate::error::{RenderError, RenderResult, StylesheetError};
use crate::settings::StylesheetFailurePolicy;

use super::Component;
use super::behavior::BehaviorContext;
use super::validator::{validate_behavior, validate_template};

impl Component {
	/// Renders the template into `target` and activates the component.
	///
	/// Validation happens before anything is awaited, so a missing template,
	/// a behavior that is already executing, or a missing target are
	/// reported without touching the document. The render then waits for
	/// every stylesheet requested before this call. Failed loads are logged;
	/// with [`StylesheetFailurePolicy::Fatal`] the first one is returned and
	/// the target is left unchanged.
	///
	/// After the target's content is replaced, state values are bound and
	/// the behavior runs once, together with anything it defers, before this
	/// future completes. Called from inside a running flush, the behavior
	/// still runs before completion but its deferred tasks are left to that
	/// flush.
	///
	/// # Errors
	///
	/// - [`RenderError::InvalidTemplate`] if the template is missing or blank,
	///   also when it was cleared while stylesheets were loading.
	/// - [`RenderError::InvalidBehavior`] if the behavior is executing, also
	///   when it started while stylesheets were loading.
	/// - [`RenderError::MissingTarget`] if `target` is `None` or detached.
	/// - [`RenderError::Stylesheet`] under the fatal stylesheet policy.
	pub async fn render<'a>(&self, target: impl Into<Option<&'a Element>>) -> RenderResult<()> {
		let inner = &self.inner;

		validate_template(inner.template.borrow().as_deref())?;
		validate_behavior(inner.behavior.borrow().as_ref())?;
		let target = match target.into() {
			Some(target) if target.is_connected() => target.clone(),
			_ => return Err(RenderError::MissingTarget),
		};

		// Loads requested while this render waits belong to the next one.
		let pending = std::mem::take(&mut *inner.stylesheets.borrow_mut());
		let waited = pending.len();
		let outcomes = join_all(pending).await;

		let policy = inner.document.settings().stylesheet_failure;
		let mut first_failure: Option<StylesheetError> = None;
		for err in outcomes.into_iter().filter_map(Result::err) {
			warn!(href = %err.href(), error = %err, "stylesheet failed to load");
			if policy == StylesheetFailurePolicy::Fatal && first_failure.is_none() {
				first_failure = Some(err);
			}
		}
		if let Some(err) = first_failure {
			return Err(err.into());
		}

		let template = validate_template(inner.template.borrow().as_deref())?.to_string();
		validate_behavior(inner.behavior.borrow().as_ref())?;
		target
			.set_inner_html(&template)
			.map_err(|_| RenderError::MissingTarget)?;
		debug!(stylesheets = waited, len = template.len(), "template committed");

		inner.state.bind(&inner.document);

		let behavior = inner.behavior.borrow().clone();
		if let Some(behavior) = behavior {
			let context = BehaviorContext::new(
				inner.document.clone(),
				Rc::clone(&inner.window_listeners),
			);
			let scheduler = inner.document.scheduler();
			if scheduler.is_flushing() {
				// A nested flush would be a no-op; whatever the behavior defers
				// joins the running one.
				behavior.invoke(&context);
			} else {
				scheduler.defer(move || {
					behavior.invoke(&context);
				});
				scheduler.flush();
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::Behavior;
	use crate::dom::Document;
	use futures::FutureExt;
	use rstest::rstest;
	use std::cell::RefCell;

	#[rstest]
	fn test_behavior_runs_after_binding_and_before_deferred_tasks() {
		let document = Document::from_body("<div id=\"app\"></div>");
		let component = Component::new(&document);
		let log = Rc::new(RefCell::new(Vec::new()));
		let (_, set) = component.declare_state(1, "value");
		component.set_template("<span id=\"value\">1</span>");

		let behavior_log = Rc::clone(&log);
		component.set_behavior(Behavior::new(move |cx| {
			set.set(2);
			behavior_log.borrow_mut().push("behavior");
			let deferred_log = Rc::clone(&behavior_log);
			cx.defer(move || deferred_log.borrow_mut().push("deferred"));
		}));

		let app = document.get_element_by_id("app").unwrap();
		component.render(&app).now_or_never().unwrap().unwrap();

		assert_eq!(*log.borrow(), vec!["behavior", "deferred"]);
		assert_eq!(app.inner_html().unwrap(), "<span id=\"value\">2</span>");
	}

	#[rstest]
	fn test_validation_order() {
		let document = Document::new();
		let component = Component::new(&document);

		let result = component.render(None).now_or_never().unwrap();
		assert_eq!(result, Err(RenderError::InvalidTemplate));

		component.set_template("<p>x</p>");
		let result = component.render(None).now_or_never().unwrap();
		assert_eq!(result, Err(RenderError::MissingTarget));
	}
}
