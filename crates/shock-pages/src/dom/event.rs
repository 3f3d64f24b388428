//! Events and listener bookkeeping.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::element::Element;
use super::markup::NodeId;

/// Identifier of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
	fn new() -> Self {
		static COUNTER: AtomicU64 = AtomicU64::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

/// An event delivered to listeners.
#[derive(Debug, Clone)]
pub struct Event {
	event_type: String,
	target: Option<Element>,
}

impl Event {
	pub(crate) fn new(event_type: &str, target: Option<Element>) -> Self {
		Self {
			event_type: event_type.to_string(),
			target,
		}
	}

	/// Event name, e.g. `"click"`.
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	/// The element the event was dispatched on. `None` for window events.
	pub fn target(&self) -> Option<&Element> {
		self.target.as_ref()
	}
}

pub(crate) type Handler = Rc<dyn Fn(&Event)>;

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
	Window,
	Node(NodeId),
}

struct Listener {
	id: ListenerId,
	scope: Scope,
	event_type: String,
	handler: Handler,
}

/// Registry of every listener in a document.
#[derive(Default)]
pub(crate) struct Listeners {
	entries: Vec<Listener>,
}

impl Listeners {
	pub(crate) fn add(&mut self, scope: Scope, event_type: &str, handler: Handler) -> ListenerId {
		let id = ListenerId::new();
		self.entries.push(Listener {
			id,
			scope,
			event_type: event_type.to_string(),
			handler,
		});
		id
	}

	pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
		let before = self.entries.len();
		self.entries.retain(|listener| listener.id != id);
		self.entries.len() != before
	}

	/// Drops every listener attached to one of `nodes`.
	pub(crate) fn purge_nodes(&mut self, nodes: &[NodeId]) -> usize {
		let before = self.entries.len();
		self.entries.retain(|listener| match listener.scope {
			Scope::Node(node) => !nodes.contains(&node),
			Scope::Window => true,
		});
		before - self.entries.len()
	}

	/// Handlers matching the scope and event, in registration order.
	///
	/// The handlers are cloned out so they can run without the registry
	/// borrowed, which lets them add or remove listeners.
	pub(crate) fn matching(&self, scope: Scope, event_type: &str) -> Vec<Handler> {
		self.entries
			.iter()
			.filter(|listener| listener.scope == scope && listener.event_type == event_type)
			.map(|listener| Rc::clone(&listener.handler))
			.collect()
	}

	pub(crate) fn count(&self, scope: Scope) -> usize {
		self.entries
			.iter()
			.filter(|listener| listener.scope == scope)
			.count()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::Cell;

	fn noop() -> Handler {
		Rc::new(|_| {})
	}

	#[rstest]
	fn test_matching_filters_by_scope_and_type() {
		let mut listeners = Listeners::default();
		let node = NodeId::new();
		listeners.add(Scope::Node(node), "click", noop());
		listeners.add(Scope::Node(node), "input", noop());
		listeners.add(Scope::Window, "click", noop());

		assert_eq!(listeners.matching(Scope::Node(node), "click").len(), 1);
		assert_eq!(listeners.matching(Scope::Window, "click").len(), 1);
		assert_eq!(listeners.matching(Scope::Window, "resize").len(), 0);
	}

	#[rstest]
	fn test_remove_and_purge() {
		let mut listeners = Listeners::default();
		let node = NodeId::new();
		let window = listeners.add(Scope::Window, "resize", noop());
		listeners.add(Scope::Node(node), "click", noop());
		listeners.add(Scope::Node(node), "click", noop());

		assert_eq!(listeners.purge_nodes(&[node]), 2);
		assert_eq!(listeners.count(Scope::Window), 1);
		assert!(listeners.remove(window));
		assert!(!listeners.remove(window));
		assert_eq!(listeners.count(Scope::Window), 0);
	}

	#[rstest]
	fn test_handlers_are_invoked_in_order() {
		let mut listeners = Listeners::default();
		let seen = Rc::new(Cell::new(0));
		for expected in 0..3 {
			let seen = Rc::clone(&seen);
			listeners.add(
				Scope::Window,
				"tick",
				Rc::new(move |_| {
					assert_eq!(seen.get(), expected);
					seen.set(expected + 1);
				}),
			);
		}

		let event = Event::new("tick", None);
		for handler in listeners.matching(Scope::Window, "tick") {
			handler(&event);
		}
		assert_eq!(seen.get(), 3);
	}
}
