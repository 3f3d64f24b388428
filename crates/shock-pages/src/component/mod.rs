//! Components.
//!
//! A [`Component`] owns one markup template, an optional [`Behavior`], the
//! stylesheet loads it depends on, and a set of named state values. Nothing
//! touches the document until [`Component::render`] runs the pipeline:
//!
//! 1. validate the template, the behavior and the target,
//! 2. wait for every stylesheet requested so far,
//! 3. replace the target's content with the template,
//! 4. bind state values to elements by id,
//! 5. run the behavior.
//!
//! ## Example
//!
//! ```
//! use shock_pages::component::Component;
//! use shock_pages::dom::Document;
//!
//! let document = Document::from_body(r#"<main id="app"></main>"#);
//! let page = Component::new(&document);
//! let (count, set_count) = page.declare_state(0, "count");
//! page.set_template(format!(r#"<p>Clicked <span id="count">{count}</span> times</p>"#));
//!
//! let app = document.get_element_by_id("app").unwrap();
//! futures::executor::block_on(page.render(&app)).unwrap();
//!
//! set_count.set(3);
//! assert_eq!(
//!     document.body_html(),
//!     r#"<main id="app"><p>Clicked <span id="count">3</span> times</p></main>"#
//! );
//! ```

mod behavior;
mod guard;
mod pipeline;
mod state;
mod stylesheet;
mod validator;

pub use behavior::{Behavior, BehaviorContext};
pub use guard::{WINDOW_SCOPED_ADVISORY, is_window_scoped, warn_if_window_scoped};
pub use state::{SetState, unique_id};
pub use stylesheet::{ModuleLocation, request_stylesheets, resolve_stylesheet_path};
pub use validator::{validate_behavior, validate_template};

use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;

use tracing::debug;

use crate::dom::{Document, ListenerId, StylesheetHandle};

use state::StateStore;

struct ComponentInner {
	document: Document,
	template: RefCell<Option<String>>,
	behavior: RefCell<Option<Behavior>>,
	stylesheets: RefCell<Vec<StylesheetHandle>>,
	state: StateStore,
	window_listeners: Rc<RefCell<Vec<ListenerId>>>,
}

/// A unit of UI rendered into a target element of a [`Document`].
///
/// `Component` is a cheap handle; clones share the same component, so
/// behaviors and event handlers can hold one.
#[derive(Clone)]
pub struct Component {
	inner: Rc<ComponentInner>,
}

impl Component {
	/// Creates a component with no template.
	pub fn new(document: &Document) -> Self {
		Self {
			inner: Rc::new(ComponentInner {
				document: document.clone(),
				template: RefCell::new(None),
				behavior: RefCell::new(None),
				stylesheets: RefCell::new(Vec::new()),
				state: StateStore::default(),
				window_listeners: Rc::new(RefCell::new(Vec::new())),
			}),
		}
	}

	/// The document this component renders into.
	pub fn document(&self) -> &Document {
		&self.inner.document
	}

	/// Returns `true` if both handles refer to the same component.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	/// Replaces the template. It is validated when rendering.
	pub fn set_template(&self, template: impl Into<String>) {
		*self.inner.template.borrow_mut() = Some(template.into());
	}

	/// Removes the template.
	pub fn clear_template(&self) {
		self.inner.template.borrow_mut().take();
	}

	/// Current template.
	pub fn template(&self) -> Option<String> {
		self.inner.template.borrow().clone()
	}

	/// Replaces the behavior.
	///
	/// When the document's settings enable it, the behavior's source is
	/// checked for window listeners and an advisory is logged.
	pub fn set_behavior(&self, behavior: Behavior) {
		if self.inner.document.settings().window_listener_advisory
			&& let Some(source) = behavior.source()
		{
			warn_if_window_scoped(source);
		}
		*self.inner.behavior.borrow_mut() = Some(behavior);
	}

	/// Removes the behavior.
	pub fn clear_behavior(&self) {
		self.inner.behavior.borrow_mut().take();
	}

	/// Returns `true` if a behavior is registered.
	pub fn has_behavior(&self) -> bool {
		self.inner.behavior.borrow().is_some()
	}

	/// Links the stylesheets relative to `base`. The next render waits for
	/// every newly linked one.
	pub fn request_stylesheets<I, S>(&self, base: impl Into<ModuleLocation>, paths: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let handles = request_stylesheets(&self.inner.document, &base.into(), paths);
		self.inner.stylesheets.borrow_mut().extend(handles);
	}

	/// Number of stylesheet loads the next render will wait for.
	pub fn pending_stylesheets(&self) -> usize {
		self.inner.stylesheets.borrow().len()
	}

	/// Declares a state value bound to the element with `id`.
	///
	/// Returns the initial value and its write accessor. Declaring the same
	/// id twice replaces the earlier entry.
	pub fn declare_state<T>(&self, initial: T, id: &str) -> (T, SetState<T>)
	where
		T: Display + Clone + 'static,
	{
		self.inner.state.declare(initial, id)
	}

	/// Text of the current value of the state `id`.
	pub fn state_text(&self, id: &str) -> Option<String> {
		self.inner.state.text(id)
	}

	/// Detaches state bindings, removes window listeners registered by the
	/// behavior, and drops pending stylesheet waits.
	pub fn dispose(&self) {
		self.inner.state.unbind_all();
		let listeners: Vec<_> = self.inner.window_listeners.borrow_mut().drain(..).collect();
		for id in &listeners {
			self.inner.document.remove_listener(*id);
		}
		self.inner.stylesheets.borrow_mut().clear();
		debug!(window_listeners = listeners.len(), "component disposed");
	}
}

impl Display for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.inner.template.borrow().as_deref().unwrap_or_default())
	}
}

impl fmt::Debug for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Component")
			.field("template", &self.inner.template.borrow())
			.field("behavior", &self.inner.behavior.borrow())
			.field("pending_stylesheets", &self.pending_stylesheets())
			.field("states", &self.inner.state.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use tracing_test::traced_test;

	#[rstest]
	fn test_display_is_template() {
		let component = Component::new(&Document::new());
		assert_eq!(component.to_string(), "");

		component.set_template("<h1>Home</h1>");
		assert_eq!(component.to_string(), "<h1>Home</h1>");
		assert_eq!(format!("<main>{component}</main>"), "<main><h1>Home</h1></main>");

		component.clear_template();
		assert_eq!(component.template(), None);
	}

	#[rstest]
	fn test_stylesheets_are_collected() {
		let document = Document::new();
		let component = Component::new(&document);

		component.request_stylesheets("/app/Home.rs", ["a.css", "b.css"]);
		component.request_stylesheets("/app/Home.rs", ["a.css"]);

		assert_eq!(component.pending_stylesheets(), 2);
		component.dispose();
		assert_eq!(component.pending_stylesheets(), 0);
	}

	#[rstest]
	#[traced_test]
	fn test_set_behavior_logs_advisory() {
		let component = Component::new(&Document::new());
		component.set_behavior(Behavior::new(|_| {}).with_source("window.addEventListener('x', f)"));

		assert!(component.has_behavior());
		assert!(logs_contain(WINDOW_SCOPED_ADVISORY));
	}

	#[rstest]
	#[traced_test]
	fn test_advisory_can_be_disabled() {
		let document = Document::with_settings(
			crate::settings::EngineSettings::default().with_window_listener_advisory(false),
		);
		let component = Component::new(&document);
		component.set_behavior(Behavior::new(|_| {}).with_source("window.onresize = f"));

		assert!(!logs_contain(WINDOW_SCOPED_ADVISORY));
	}
}
