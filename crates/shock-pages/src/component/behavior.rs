//! Behavior callbacks and the context they run in.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use tracing::warn;

use crate::dom::{Document, Element, Event, ListenerId};
use crate::error::DomError;

type BehaviorFn = Box<dyn FnMut(&BehaviorContext)>;

/// A cloneable callback that attaches interactivity after a render.
///
/// Clones share the same closure. The optional source text feeds the window
/// listener advisory; [`behavior!`](crate::behavior) captures it
/// automatically.
///
/// ```
/// use shock_pages::component::Behavior;
///
/// let behavior = Behavior::new(|cx| {
///     let _ = cx.on("like", "click", |_| {});
/// })
/// .with_source("cx.on(\"like\", \"click\", ...)");
///
/// assert!(behavior.source().is_some());
/// ```
#[derive(Clone)]
pub struct Behavior {
	inner: Rc<RefCell<BehaviorFn>>,
	source: Option<Rc<str>>,
}

impl Behavior {
	/// Wraps a closure.
	pub fn new<F>(f: F) -> Self
	where
		F: FnMut(&BehaviorContext) + 'static,
	{
		Self {
			inner: Rc::new(RefCell::new(Box::new(f))),
			source: None,
		}
	}

	/// Attaches the source text used by the window listener advisory.
	pub fn with_source(mut self, source: impl Into<Rc<str>>) -> Self {
		self.source = Some(source.into());
		self
	}

	/// Source text, if known.
	pub fn source(&self) -> Option<&str> {
		self.source.as_deref()
	}

	/// Returns `false` while the behavior is executing.
	pub fn is_invocable(&self) -> bool {
		self.inner.try_borrow_mut().is_ok()
	}

	/// Runs the behavior. Returns `false` if it was already executing.
	pub fn invoke(&self, context: &BehaviorContext) -> bool {
		let Ok(mut f) = self.inner.try_borrow_mut() else {
			warn!("behavior invoked while already executing; skipped");
			return false;
		};
		f(context);
		true
	}
}

impl fmt::Debug for Behavior {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Behavior")
			.field("source", &self.source)
			.finish_non_exhaustive()
	}
}

/// What a behavior can reach: the document, its elements, and the scheduler.
pub struct BehaviorContext {
	document: Document,
	window_listeners: Rc<RefCell<Vec<ListenerId>>>,
}

impl BehaviorContext {
	pub(crate) fn new(document: Document, window_listeners: Rc<RefCell<Vec<ListenerId>>>) -> Self {
		Self {
			document,
			window_listeners,
		}
	}

	/// The document the component rendered into.
	pub fn document(&self) -> &Document {
		&self.document
	}

	/// Looks up an element by id.
	pub fn element(&self, id: &str) -> Option<Element> {
		self.document.get_element_by_id(id)
	}

	/// Elements carrying `class`, in document order.
	pub fn elements_by_class(&self, class: &str) -> Vec<Element> {
		self.document.get_elements_by_class_name(class)
	}

	/// Attaches a listener to the element with `id`.
	pub fn on(
		&self,
		id: &str,
		event_type: &str,
		handler: impl Fn(&Event) + 'static,
	) -> Result<ListenerId, DomError> {
		self.document
			.require_element_by_id(id)?
			.add_event_listener(event_type, handler)
	}

	/// Attaches a window listener that the component removes on dispose.
	pub fn on_window(&self, event_type: &str, handler: impl Fn(&Event) + 'static) -> ListenerId {
		let id = self.document.add_window_listener(event_type, handler);
		self.window_listeners.borrow_mut().push(id);
		id
	}

	/// Queues a callback that runs after the behavior, in the same flush.
	pub fn defer(&self, task: impl FnOnce() + 'static) {
		self.document.scheduler().defer(task);
	}

	/// Queues a task on the document's local executor.
	pub fn spawn(&self, future: impl Future<Output = ()> + 'static) {
		self.document.scheduler().spawn(future);
	}
}

impl fmt::Debug for BehaviorContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BehaviorContext")
			.field("window_listeners", &self.window_listeners.borrow().len())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::Cell;

	fn context(document: &Document) -> (BehaviorContext, Rc<RefCell<Vec<ListenerId>>>) {
		let tracked = Rc::new(RefCell::new(Vec::new()));
		(
			BehaviorContext::new(document.clone(), Rc::clone(&tracked)),
			tracked,
		)
	}

	#[rstest]
	fn test_invoke_runs_closure() {
		let document = Document::new();
		let (cx, _) = context(&document);
		let runs = Rc::new(Cell::new(0));
		let counter = Rc::clone(&runs);

		let behavior = Behavior::new(move |_| counter.set(counter.get() + 1));

		assert!(behavior.invoke(&cx));
		assert!(behavior.clone().invoke(&cx));
		assert_eq!(runs.get(), 2);
	}

	#[rstest]
	fn test_not_invocable_while_running() {
		let document = Document::new();
		let (cx, _) = context(&document);
		let observed = Rc::new(Cell::new(None));

		let slot: Rc<RefCell<Option<Behavior>>> = Rc::new(RefCell::new(None));
		let (inner_slot, inner_observed) = (Rc::clone(&slot), Rc::clone(&observed));
		let behavior = Behavior::new(move |cx| {
			let me = inner_slot.borrow().clone();
			if let Some(me) = me {
				inner_observed.set(Some((me.is_invocable(), me.invoke(cx))));
			}
		});
		*slot.borrow_mut() = Some(behavior.clone());

		assert!(behavior.is_invocable());
		assert!(behavior.invoke(&cx));
		assert_eq!(observed.get(), Some((false, false)));
		slot.borrow_mut().take();
	}

	#[rstest]
	fn test_on_and_on_window() {
		let document = Document::from_body("<button id=\"like\">Like</button>");
		let (cx, tracked) = context(&document);

		assert!(cx.on("like", "click", |_| {}).is_ok());
		assert_eq!(
			cx.on("missing", "click", |_| {}),
			Err(DomError::ElementNotFound("missing".to_string()))
		);

		let id = cx.on_window("resize", |_| {});
		assert_eq!(*tracked.borrow(), vec![id]);
		assert_eq!(document.window_listener_count(), 1);
	}

	#[rstest]
	fn test_defer_runs_on_flush() {
		let document = Document::new();
		let (cx, _) = context(&document);
		let ran = Rc::new(Cell::new(false));
		let flag = Rc::clone(&ran);

		cx.defer(move || flag.set(true));
		assert!(!ran.get());
		document.scheduler().flush();
		assert!(ran.get());
	}
}
