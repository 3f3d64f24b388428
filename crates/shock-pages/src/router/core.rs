//! Core router implementation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::component::{Behavior, Component};
use crate::dom::{Document, html_escape};
use crate::error::RouterError;

type ComponentFactory = Rc<dyn Fn(&Document) -> Component>;

/// A named route and the factory building its component.
#[derive(Clone)]
pub struct Route {
	name: String,
	component: ComponentFactory,
}

impl fmt::Debug for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Route")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

impl Route {
	/// Creates a route.
	pub fn new<F>(name: impl Into<String>, component: F) -> Self
	where
		F: Fn(&Document) -> Component + 'static,
	{
		Self {
			name: name.into(),
			component: Rc::new(component),
		}
	}

	/// Route name, also used as the navigation label.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Builds a fresh component for this route.
	pub fn build(&self, document: &Document) -> Component {
		(self.component)(document)
	}
}

struct RouterInner {
	document: Document,
	outlet_id: String,
	routes: RefCell<Vec<Route>>,
	current: RefCell<Option<(String, Component)>>,
}

/// Renders one routed component at a time into an outlet element.
///
/// Clones share the same router.
#[derive(Clone)]
pub struct Router {
	inner: Rc<RouterInner>,
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("outlet_id", &self.inner.outlet_id)
			.field("routes", &self.route_names())
			.field("current", &self.current_route())
			.finish()
	}
}

impl Router {
	/// Creates a router rendering into the element with id `outlet_id`.
	pub fn new(document: &Document, outlet_id: impl Into<String>) -> Self {
		Self {
			inner: Rc::new(RouterInner {
				document: document.clone(),
				outlet_id: outlet_id.into(),
				routes: RefCell::new(Vec::new()),
				current: RefCell::new(None),
			}),
		}
	}

	/// Adds a route.
	pub fn route<F>(self, name: impl Into<String>, component: F) -> Self
	where
		F: Fn(&Document) -> Component + 'static,
	{
		self.add_route(Route::new(name, component));
		self
	}

	/// Adds a route, replacing any existing route with the same name.
	pub fn add_route(&self, route: Route) {
		let mut routes = self.inner.routes.borrow_mut();
		match routes.iter_mut().find(|existing| existing.name == route.name) {
			Some(existing) => *existing = route,
			None => routes.push(route),
		}
	}

	/// The document the router renders into.
	pub fn document(&self) -> &Document {
		&self.inner.document
	}

	/// Id of the outlet element.
	pub fn outlet_id(&self) -> &str {
		&self.inner.outlet_id
	}

	/// Route names in registration order.
	pub fn route_names(&self) -> Vec<String> {
		self.inner
			.routes
			.borrow()
			.iter()
			.map(|route| route.name.clone())
			.collect()
	}

	/// Number of registered routes.
	pub fn route_count(&self) -> usize {
		self.inner.routes.borrow().len()
	}

	/// Returns `true` if a route has this name.
	pub fn has_route(&self, name: &str) -> bool {
		self.inner
			.routes
			.borrow()
			.iter()
			.any(|route| route.name == name)
	}

	/// Name of the route rendered last.
	pub fn current_route(&self) -> Option<String> {
		self.inner
			.current
			.borrow()
			.as_ref()
			.map(|(name, _)| name.clone())
	}

	/// Component rendered last.
	pub fn current_component(&self) -> Option<Component> {
		self.inner
			.current
			.borrow()
			.as_ref()
			.map(|(_, component)| component.clone())
	}

	/// Builds the route's component and renders it into the outlet.
	///
	/// On success the previously routed component is disposed.
	///
	/// # Errors
	///
	/// - [`RouterError::NotFound`] for an unknown name.
	/// - [`RouterError::OutletMissing`] if the outlet is not in the document.
	/// - [`RouterError::Render`] if the component fails to render.
	pub async fn navigate(&self, name: &str) -> Result<Component, RouterError> {
		let route = self
			.inner
			.routes
			.borrow()
			.iter()
			.find(|route| route.name == name)
			.cloned()
			.ok_or_else(|| RouterError::NotFound(name.to_string()))?;
		let outlet = self
			.inner
			.document
			.get_element_by_id(&self.inner.outlet_id)
			.ok_or_else(|| RouterError::OutletMissing(self.inner.outlet_id.clone()))?;

		let component = route.build(&self.inner.document);
		component.render(&outlet).await?;

		let previous = self
			.inner
			.current
			.replace(Some((name.to_string(), component.clone())));
		if let Some((_, previous)) = previous
			&& !previous.ptr_eq(&component)
		{
			previous.dispose();
		}
		debug!(route = %name, outlet = %self.inner.outlet_id, "navigated");
		Ok(component)
	}

	/// Queues a navigation on the document's scheduler.
	///
	/// Failures are logged. The navigation completes when the host drives
	/// [`Document::run_until_stalled`].
	pub fn navigate_later(&self, name: &str) {
		let router = self.clone();
		let name = name.to_string();
		self.inner.document.scheduler().spawn(async move {
			if let Err(err) = router.navigate(&name).await {
				warn!(route = %name, error = %err, "navigation failed");
			}
		});
	}

	/// One `nav-item` button per route, labelled with the route name.
	pub fn nav_markup(&self) -> String {
		self.inner
			.routes
			.borrow()
			.iter()
			.map(|route| {
				format!(
					"<button class='nav-item button-primary'>{}</button>",
					html_escape(&route.name)
				)
			})
			.collect()
	}

	/// Builds the navigation shell: the route buttons, a cover section and
	/// the outlet.
	///
	/// Its behavior wires each button to navigate to the route named by the
	/// button's text, then navigates to the first route.
	pub fn shell(&self) -> Component {
		let shell = Component::new(&self.inner.document);
		shell.set_template(format!(
			"<nav id=\"navigation\">{}</nav><section id=\"cover\"></section><section id=\"{}\" style=\"height: 100%;\"></section>",
			self.nav_markup(),
			html_escape(&self.inner.outlet_id),
		));

		let router = self.clone();
		shell.set_behavior(Behavior::new(move |cx| {
			for item in cx.elements_by_class("nav-item") {
				let router = router.clone();
				let wired = item.add_event_listener("click", move |event| {
					let label = event.target().and_then(|target| target.text_content().ok());
					if let Some(label) = label {
						router.navigate_later(label.trim());
					}
				});
				if let Err(err) = wired {
					warn!(error = %err, "navigation item vanished before wiring");
				}
			}
			if let Some(first) = router.route_names().first() {
				router.navigate_later(first);
			}
		}));
		shell
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn page(label: &'static str) -> impl Fn(&Document) -> Component {
		move |document| {
			let component = Component::new(document);
			component.set_template(format!("<h1>{label}</h1>"));
			component
		}
	}

	#[rstest]
	fn test_route_registration() {
		let document = Document::new();
		let router = Router::new(&document, "manager")
			.route("Home", page("Home"))
			.route("About", page("About"))
			.route("Home", page("Home again"));

		assert_eq!(router.route_names(), vec!["Home", "About"]);
		assert_eq!(router.route_count(), 2);
		assert!(router.has_route("About"));
		assert!(!router.has_route("Contact"));
	}

	#[rstest]
	fn test_nav_markup_escapes_names() {
		let router = Router::new(&Document::new(), "manager")
			.route("Home", page("Home"))
			.route("Q&A", page("Q&A"));

		assert_eq!(
			router.nav_markup(),
			"<button class='nav-item button-primary'>Home</button><button class='nav-item button-primary'>Q&amp;A</button>"
		);
	}

	#[rstest]
	fn test_shell_template() {
		let router = Router::new(&Document::new(), "manager").route("Home", page("Home"));
		let shell = router.shell();

		assert_eq!(
			shell.to_string(),
			"<nav id=\"navigation\"><button class='nav-item button-primary'>Home</button></nav><section id=\"cover\"></section><section id=\"manager\" style=\"height: 100%;\"></section>"
		);
		assert!(shell.has_behavior());
	}
}
