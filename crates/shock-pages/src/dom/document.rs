//! The host document.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::{DomError, StylesheetError};
use crate::scheduler::Scheduler;
use crate::settings::EngineSettings;

use super::element::Element;
use super::event::{Event, ListenerId, Listeners, Scope};
use super::head::{LoadState, StylesheetHandle, StylesheetLink};
use super::markup::{ElementNode, NodeId};

pub(crate) struct DocumentInner {
	pub(crate) settings: EngineSettings,
	head: RefCell<Vec<StylesheetLink>>,
	pub(crate) body: RefCell<ElementNode>,
	pub(crate) listeners: RefCell<Listeners>,
	scheduler: Scheduler,
}

impl DocumentInner {
	/// Replaces the children of `node`, dropping listeners of removed elements.
	pub(crate) fn replace_children(
		&self,
		node: NodeId,
		replace: impl FnOnce(&mut ElementNode) -> Vec<NodeId>,
	) -> Result<(), DomError> {
		let removed = {
			let mut body = self.body.borrow_mut();
			let element = body.find_mut(node).ok_or(DomError::Detached)?;
			replace(element)
		};
		if !removed.is_empty() {
			self.listeners.borrow_mut().purge_nodes(&removed);
		}
		Ok(())
	}

	pub(crate) fn contains(&self, node: NodeId) -> bool {
		self.body.borrow().find(node).is_some()
	}

	pub(crate) fn dispatch(&self, scope: Scope, event: &Event) -> usize {
		let handlers = self.listeners.borrow().matching(scope, event.event_type());
		for handler in &handlers {
			handler(event);
		}
		handlers.len()
	}
}

/// An in-memory host document: a head holding stylesheet links, a body
/// markup tree, and the listeners attached to elements and to the window.
///
/// `Document` is a cheap handle; clones share the same document. It is the
/// explicit context every component is constructed against.
///
/// ## Example
///
/// ```
/// use shock_pages::dom::Document;
///
/// let document = Document::from_body(r#"<main id="app"></main>"#);
/// let app = document.get_element_by_id("app").unwrap();
///
/// app.set_inner_html("<p>Hello</p>").unwrap();
/// assert_eq!(document.body_html(), r#"<main id="app"><p>Hello</p></main>"#);
/// ```
#[derive(Clone)]
pub struct Document {
	inner: Rc<DocumentInner>,
}

impl Document {
	/// Creates an empty document with default settings.
	pub fn new() -> Self {
		Self::with_settings(EngineSettings::default())
	}

	/// Creates an empty document with the given settings.
	pub fn with_settings(settings: EngineSettings) -> Self {
		Self {
			inner: Rc::new(DocumentInner {
				settings,
				head: RefCell::new(Vec::new()),
				body: RefCell::new(ElementNode::synthetic("body")),
				listeners: RefCell::new(Listeners::default()),
				scheduler: Scheduler::new(),
			}),
		}
	}

	/// Creates a document with default settings whose body holds `html`.
	pub fn from_body(html: &str) -> Self {
		let document = Self::new();
		document.inner.body.borrow_mut().set_inner_html(html);
		document
	}

	pub(crate) fn from_inner(inner: Rc<DocumentInner>) -> Self {
		Self { inner }
	}

	pub(crate) fn downgrade(&self) -> std::rc::Weak<DocumentInner> {
		Rc::downgrade(&self.inner)
	}

	/// Returns `true` if both handles refer to the same document.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	/// Settings shared by every component of this document.
	pub fn settings(&self) -> &EngineSettings {
		&self.inner.settings
	}

	/// The scheduler driving deferred callbacks and local tasks.
	pub fn scheduler(&self) -> &Scheduler {
		&self.inner.scheduler
	}

	/// Polls spawned tasks and flushes deferred callbacks until idle.
	pub fn run_until_stalled(&self) {
		self.inner.scheduler.run_until_stalled();
	}

	/// The body element.
	pub fn body(&self) -> Element {
		let node = self.inner.body.borrow().node_id;
		Element::new(self, node)
	}

	/// Serialized content of the body.
	pub fn body_html(&self) -> String {
		self.inner.body.borrow().inner_html()
	}

	/// First element in document order whose id is `id`.
	pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
		let node = self.inner.body.borrow().find_by_id(id)?.node_id;
		Some(Element::new(self, node))
	}

	/// Like [`get_element_by_id`](Self::get_element_by_id), but reports a
	/// missing element as an error.
	pub fn require_element_by_id(&self, id: &str) -> Result<Element, DomError> {
		self.get_element_by_id(id)
			.ok_or_else(|| DomError::ElementNotFound(id.to_string()))
	}

	/// Elements carrying `class`, in document order.
	pub fn get_elements_by_class_name(&self, class: &str) -> Vec<Element> {
		let mut nodes = Vec::new();
		self.inner.body.borrow().collect_by_class(class, &mut nodes);
		nodes
			.into_iter()
			.map(|node| Element::new(self, node))
			.collect()
	}

	/// Returns `true` if a link with exactly this href is in the head.
	pub fn has_stylesheet(&self, href: &str) -> bool {
		self.inner
			.head
			.borrow()
			.iter()
			.any(|link| link.href == href)
	}

	/// Hrefs of every stylesheet link, in insertion order.
	pub fn stylesheets(&self) -> Vec<String> {
		self.inner
			.head
			.borrow()
			.iter()
			.map(|link| link.href.clone())
			.collect()
	}

	/// Load state of the link with this href.
	pub fn stylesheet_state(&self, href: &str) -> Option<LoadState> {
		self.inner
			.head
			.borrow()
			.iter()
			.find(|link| link.href == href)
			.map(|link| link.state.clone())
	}

	/// Serialized head content.
	pub fn head_html(&self) -> String {
		self.inner
			.head
			.borrow()
			.iter()
			.map(StylesheetLink::to_html)
			.collect()
	}

	/// Appends a stylesheet link unless one with the same href exists.
	///
	/// Returns `None` for a duplicate href.
	pub(crate) fn link_stylesheet(&self, href: &str) -> Option<StylesheetHandle> {
		let mut head = self.inner.head.borrow_mut();
		if head.iter().any(|link| link.href == href) {
			return None;
		}
		let (mut link, handle) = StylesheetLink::pending(href.to_string());
		if self.inner.settings.auto_settle_stylesheets {
			link.settle(Ok(()));
		}
		debug!(href = %href, state = ?link.state, "stylesheet linked");
		head.push(link);
		Some(handle)
	}

	/// Reports that the stylesheet loaded.
	///
	/// Returns `false` if no pending link has this href.
	pub fn complete_stylesheet(&self, href: &str) -> bool {
		self.settle_stylesheet(href, Ok(()))
	}

	/// Reports that the stylesheet failed to load.
	///
	/// Returns `false` if no pending link has this href.
	pub fn fail_stylesheet(&self, href: &str, reason: impl Into<String>) -> bool {
		self.settle_stylesheet(
			href,
			Err(StylesheetError::LoadFailed {
				href: href.to_string(),
				reason: reason.into(),
			}),
		)
	}

	/// Settles every pending link as loaded. Returns how many were settled.
	pub fn complete_all_stylesheets(&self) -> usize {
		let mut settled = 0;
		for link in self.inner.head.borrow_mut().iter_mut() {
			if link.settle(Ok(())) {
				settled += 1;
			}
		}
		settled
	}

	fn settle_stylesheet(&self, href: &str, outcome: Result<(), StylesheetError>) -> bool {
		let settled = self
			.inner
			.head
			.borrow_mut()
			.iter_mut()
			.find(|link| link.href == href)
			.is_some_and(|link| link.settle(outcome));
		debug!(href = %href, settled, "stylesheet settled");
		settled
	}

	/// Attaches a listener to the window.
	///
	/// Window listeners live until removed with
	/// [`remove_listener`](Self::remove_listener).
	pub fn add_window_listener(
		&self,
		event_type: &str,
		handler: impl Fn(&Event) + 'static,
	) -> ListenerId {
		self.inner
			.listeners
			.borrow_mut()
			.add(Scope::Window, event_type, Rc::new(handler))
	}

	/// Removes a window or element listener. Returns `false` if it was not
	/// registered.
	pub fn remove_listener(&self, id: ListenerId) -> bool {
		self.inner.listeners.borrow_mut().remove(id)
	}

	/// Dispatches an event to the window listeners. Returns how many ran.
	pub fn dispatch_window_event(&self, event_type: &str) -> usize {
		self.inner
			.dispatch(Scope::Window, &Event::new(event_type, None))
	}

	/// Number of listeners attached to the window.
	pub fn window_listener_count(&self) -> usize {
		self.inner.listeners.borrow().count(Scope::Window)
	}
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Document")
			.field("settings", &self.inner.settings)
			.field("stylesheets", &self.stylesheets())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::FutureExt;
	use rstest::{fixture, rstest};
	use std::cell::Cell;

	#[fixture]
	fn document() -> Document {
		Document::from_body(
			"<nav id=\"navigation\"><button class=\"nav-item\">Home</button></nav><section id=\"app\"></section>",
		)
	}

	#[rstest]
	fn test_lookup(document: Document) {
		assert!(document.get_element_by_id("app").is_some());
		assert!(document.get_element_by_id("missing").is_none());
		assert_eq!(document.get_elements_by_class_name("nav-item").len(), 1);
		assert_eq!(
			document.require_element_by_id("missing").unwrap_err(),
			DomError::ElementNotFound("missing".to_string())
		);
	}

	#[rstest]
	fn test_duplicate_link_yields_no_handle(document: Document) {
		assert!(document.link_stylesheet("/app/a.css").is_some());
		assert!(document.link_stylesheet("/app/a.css").is_none());
		assert_eq!(document.stylesheets(), vec!["/app/a.css"]);
		assert_eq!(
			document.head_html(),
			"<link rel=\"stylesheet\" href=\"/app/a.css\">"
		);
	}

	#[rstest]
	fn test_complete_and_fail(document: Document) {
		let loaded = document.link_stylesheet("/ok.css").unwrap();
		let failed = document.link_stylesheet("/bad.css").unwrap();

		assert!(document.complete_stylesheet("/ok.css"));
		assert!(document.fail_stylesheet("/bad.css", "404"));
		assert!(!document.complete_stylesheet("/ok.css"));
		assert!(!document.complete_stylesheet("/unknown.css"));

		assert_eq!(loaded.now_or_never(), Some(Ok(())));
		assert!(matches!(
			failed.now_or_never(),
			Some(Err(StylesheetError::LoadFailed { .. }))
		));
		assert_eq!(
			document.stylesheet_state("/bad.css"),
			Some(LoadState::Failed("404".to_string()))
		);
	}

	#[rstest]
	fn test_auto_settle() {
		let document =
			Document::with_settings(EngineSettings::default().with_auto_settle_stylesheets(true));
		let handle = document.link_stylesheet("/a.css").unwrap();

		assert_eq!(document.stylesheet_state("/a.css"), Some(LoadState::Loaded));
		assert_eq!(handle.now_or_never(), Some(Ok(())));
	}

	#[rstest]
	fn test_dropping_document_abandons_pending_links() {
		let document = Document::new();
		let handle = document.link_stylesheet("/late.css").unwrap();
		drop(document);

		assert!(matches!(
			handle.now_or_never(),
			Some(Err(StylesheetError::Abandoned { .. }))
		));
	}

	#[rstest]
	fn test_window_listeners(document: Document) {
		let hits = Rc::new(Cell::new(0));
		let counter = Rc::clone(&hits);
		let id = document.add_window_listener("resize", move |_| counter.set(counter.get() + 1));

		assert_eq!(document.dispatch_window_event("resize"), 1);
		assert_eq!(document.dispatch_window_event("scroll"), 0);
		assert_eq!(document.window_listener_count(), 1);
		assert!(document.remove_listener(id));
		assert_eq!(document.dispatch_window_event("resize"), 0);
		assert_eq!(hits.get(), 1);
	}

	#[rstest]
	fn test_replacing_markup_drops_element_listeners(document: Document) {
		let buttons = document.get_elements_by_class_name("nav-item");
		let button = &buttons[0];
		button.add_event_listener("click", |_| {}).unwrap();
		assert_eq!(button.dispatch_event("click").unwrap(), 1);

		let nav = document.get_element_by_id("navigation").unwrap();
		nav.set_inner_html("<button class=\"nav-item\">Other</button>").unwrap();

		assert!(!button.is_connected());
		assert_eq!(document.inner.listeners.borrow().count(Scope::Node(button.node_id())), 0);
	}
}
