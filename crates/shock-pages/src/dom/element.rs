//! Element handles.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::DomError;

use super::document::{Document, DocumentInner};
use super::event::{Event, ListenerId, Scope};
use super::markup::{ElementNode, NodeId};

/// A weak handle to an element of a [`Document`].
///
/// The handle does not keep the node alive. Once the node is removed from
/// the document, or the document itself is dropped, every operation reports
/// [`DomError::Detached`].
#[derive(Clone)]
pub struct Element {
	document: Weak<DocumentInner>,
	node: NodeId,
}

impl Element {
	pub(crate) fn new(document: &Document, node: NodeId) -> Self {
		Self {
			document: document.downgrade(),
			node,
		}
	}

	#[cfg(test)]
	pub(crate) fn node_id(&self) -> NodeId {
		self.node
	}

	fn live_document(&self) -> Result<Rc<DocumentInner>, DomError> {
		let document = self.document.upgrade().ok_or(DomError::Detached)?;
		if document.contains(self.node) {
			Ok(document)
		} else {
			Err(DomError::Detached)
		}
	}

	/// The document this element belongs to, if it is still alive.
	pub fn document(&self) -> Option<Document> {
		self.document.upgrade().map(Document::from_inner)
	}

	/// Returns `true` while the element is part of a live document.
	pub fn is_connected(&self) -> bool {
		self.live_document().is_ok()
	}

	/// Lowercase tag name.
	pub fn tag_name(&self) -> Result<String, DomError> {
		self.read(|node| node.tag.clone())
	}

	/// Value of the attribute `name`, if present.
	pub fn attribute(&self, name: &str) -> Result<Option<String>, DomError> {
		self.read(|node| node.attribute(name).map(str::to_string))
	}

	/// Serialized children.
	pub fn inner_html(&self) -> Result<String, DomError> {
		self.read(|node| node.inner_html())
	}

	/// Serialized element including its own tags.
	pub fn outer_html(&self) -> Result<String, DomError> {
		self.read(|node| node.outer_html())
	}

	/// Replaces the children with parsed markup.
	///
	/// Listeners on removed descendants are dropped.
	pub fn set_inner_html(&self, html: &str) -> Result<(), DomError> {
		let document = self.live_document()?;
		document.replace_children(self.node, |node| node.set_inner_html(html))
	}

	/// Concatenated text of all descendant text nodes.
	pub fn text_content(&self) -> Result<String, DomError> {
		self.read(|node| node.text_content())
	}

	/// Replaces the children with a single text node.
	pub fn set_text_content(&self, text: &str) -> Result<(), DomError> {
		let document = self.live_document()?;
		document.replace_children(self.node, |node| node.set_text_content(text))
	}

	/// Attaches a listener to this element. It is dropped together with the
	/// element.
	pub fn add_event_listener(
		&self,
		event_type: &str,
		handler: impl Fn(&Event) + 'static,
	) -> Result<ListenerId, DomError> {
		let document = self.live_document()?;
		let id = document
			.listeners
			.borrow_mut()
			.add(Scope::Node(self.node), event_type, Rc::new(handler));
		Ok(id)
	}

	/// Dispatches an event to this element's listeners. Returns how many ran.
	pub fn dispatch_event(&self, event_type: &str) -> Result<usize, DomError> {
		let document = self.live_document()?;
		let event = Event::new(event_type, Some(self.clone()));
		Ok(document.dispatch(Scope::Node(self.node), &event))
	}

	fn read<R>(&self, f: impl FnOnce(&ElementNode) -> R) -> Result<R, DomError> {
		let document = self.document.upgrade().ok_or(DomError::Detached)?;
		let body = document.body.borrow();
		let node = body.find(self.node).ok_or(DomError::Detached)?;
		Ok(f(node))
	}
}

impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		self.node == other.node && Weak::ptr_eq(&self.document, &other.document)
	}
}

impl Eq for Element {}

impl fmt::Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Element")
			.field("node", &self.node)
			.field("connected", &self.is_connected())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::RefCell;

	#[rstest]
	fn test_text_content_round_trip() {
		let document = Document::from_body("<p id=\"counter\">0</p>");
		let counter = document.get_element_by_id("counter").unwrap();

		counter.set_text_content("5 < 6").unwrap();

		assert_eq!(counter.text_content().unwrap(), "5 < 6");
		assert_eq!(counter.inner_html().unwrap(), "5 &lt; 6");
		assert_eq!(document.body_html(), "<p id=\"counter\">5 &lt; 6</p>");
	}

	#[rstest]
	fn test_attributes_and_tag() {
		let document = Document::from_body("<a id=\"home\" href=\"/\">Home</a>");
		let link = document.get_element_by_id("home").unwrap();

		assert_eq!(link.tag_name().unwrap(), "a");
		assert_eq!(link.attribute("href").unwrap().as_deref(), Some("/"));
		assert_eq!(link.attribute("title").unwrap(), None);
		assert_eq!(link.outer_html().unwrap(), "<a id=\"home\" href=\"/\">Home</a>");
	}

	#[rstest]
	fn test_removed_element_is_detached() {
		let document = Document::from_body("<div id=\"outer\"><span id=\"inner\"></span></div>");
		let outer = document.get_element_by_id("outer").unwrap();
		let inner = document.get_element_by_id("inner").unwrap();

		outer.set_inner_html("replaced").unwrap();

		assert!(outer.is_connected());
		assert!(!inner.is_connected());
		assert_eq!(inner.set_text_content("x"), Err(DomError::Detached));
		assert_eq!(inner.dispatch_event("click"), Err(DomError::Detached));
		assert!(inner.add_event_listener("click", |_| {}).is_err());
	}

	#[rstest]
	fn test_dropped_document_detaches_elements() {
		let document = Document::from_body("<div id=\"app\"></div>");
		let app = document.get_element_by_id("app").unwrap();
		drop(document);

		assert!(app.document().is_none());
		assert_eq!(app.inner_html(), Err(DomError::Detached));
	}

	#[rstest]
	fn test_dispatch_passes_target() {
		let document = Document::from_body("<button id=\"like\">Like</button>");
		let button = document.get_element_by_id("like").unwrap();
		let seen = std::rc::Rc::new(RefCell::new(Vec::new()));

		let log = std::rc::Rc::clone(&seen);
		button
			.add_event_listener("click", move |event| {
				let label = event.target().and_then(|t| t.text_content().ok());
				log.borrow_mut().push((event.event_type().to_string(), label));
			})
			.unwrap();

		assert_eq!(button.dispatch_event("click").unwrap(), 1);
		assert_eq!(
			*seen.borrow(),
			vec![("click".to_string(), Some("Like".to_string()))]
		);
	}

	#[rstest]
	fn test_handler_may_mutate_document() {
		let document = Document::from_body("<button id=\"go\">Go</button><div id=\"out\"></div>");
		let button = document.get_element_by_id("go").unwrap();
		let out = document.get_element_by_id("out").unwrap();

		button
			.add_event_listener("click", move |_| {
				out.set_text_content("clicked").unwrap();
			})
			.unwrap();
		button.dispatch_event("click").unwrap();

		assert_eq!(
			document.get_element_by_id("out").unwrap().text_content().unwrap(),
			"clicked"
		);
	}
}
