//! Named reactive values bound to elements by id.
//!
//! A value is declared with an id. During render the id is looked up in the
//! document; from then on every write through [`SetState`] also replaces the
//! bound element's text. Before the first render, or when no element carries
//! the id, writes only update the value.

use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::dom::{Document, Element};

/// Returns a process-unique element id of the form `shock-<n>`.
pub fn unique_id() -> String {
	static COUNTER: AtomicU64 = AtomicU64::new(0);
	format!("shock-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

struct Slot<T> {
	id: String,
	value: RefCell<T>,
	bound: RefCell<Option<Element>>,
}

impl<T: Display> Slot<T> {
	fn write_bound(&self, text: &str) {
		// Cloned out so the element write runs without the slot borrowed.
		let bound = self.bound.borrow().clone();
		if let Some(element) = bound
			&& let Err(err) = element.set_text_content(text)
		{
			debug!(id = %self.id, error = %err, "bound element is gone, value kept in memory");
		}
	}
}

trait StateCell {
	fn bind(&self, element: Option<Element>);
	fn text(&self) -> String;
}

impl<T: Display> StateCell for Slot<T> {
	fn bind(&self, element: Option<Element>) {
		*self.bound.borrow_mut() = element;
	}

	fn text(&self) -> String {
		self.value.borrow().to_string()
	}
}

/// Write accessor for a declared state value.
pub struct SetState<T> {
	slot: Rc<Slot<T>>,
}

impl<T> Clone for SetState<T> {
	fn clone(&self) -> Self {
		Self {
			slot: Rc::clone(&self.slot),
		}
	}
}

impl<T: Display> SetState<T> {
	/// Id the value binds to.
	pub fn id(&self) -> &str {
		&self.slot.id
	}

	/// Returns `true` if the last render found an element for the id.
	pub fn is_bound(&self) -> bool {
		self.slot.bound.borrow().is_some()
	}

	/// Stores `value` and writes its text into the bound element, if any.
	pub fn set(&self, value: T) {
		let text = value.to_string();
		let previous = self.slot.value.replace(value);
		drop(previous);
		self.slot.write_bound(&text);
	}

	/// Modifies the value in place, then writes it like [`set`](Self::set).
	pub fn update(&self, f: impl FnOnce(&mut T)) {
		let text = {
			let mut value = self.slot.value.borrow_mut();
			f(&mut value);
			value.to_string()
		};
		self.slot.write_bound(&text);
	}

	/// Calls `f` with the current value.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.slot.value.borrow())
	}
}

impl<T: Display + Clone> SetState<T> {
	/// Current value.
	pub fn get(&self) -> T {
		self.slot.value.borrow().clone()
	}
}

impl<T: Display> fmt::Debug for SetState<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SetState")
			.field("id", &self.slot.id)
			.field("value", &self.slot.text())
			.field("bound", &self.is_bound())
			.finish()
	}
}

/// State entries of one component, in declaration order.
#[derive(Default)]
pub(crate) struct StateStore {
	entries: RefCell<Vec<(String, Rc<dyn StateCell>)>>,
}

impl StateStore {
	pub(crate) fn declare<T>(&self, initial: T, id: &str) -> (T, SetState<T>)
	where
		T: Display + Clone + 'static,
	{
		let slot = Rc::new(Slot {
			id: id.to_string(),
			value: RefCell::new(initial.clone()),
			bound: RefCell::new(None),
		});
		let cell: Rc<dyn StateCell> = slot.clone();

		let mut entries = self.entries.borrow_mut();
		match entries.iter_mut().find(|(key, _)| key == id) {
			Some(entry) => {
				warn!(id = %id, "state declared twice, replacing the previous value");
				entry.1 = cell;
			}
			None => entries.push((id.to_string(), cell)),
		}

		(initial, SetState { slot })
	}

	/// Resolves every entry against the document. Returns how many bound.
	pub(crate) fn bind(&self, document: &Document) -> usize {
		let entries = self.entries.borrow().clone();
		let mut bound = 0;
		for (id, cell) in entries {
			let element = document.get_element_by_id(&id);
			match element {
				Some(_) => bound += 1,
				None => warn!(id = %id, "no element found for state binding"),
			}
			cell.bind(element);
		}
		bound
	}

	pub(crate) fn unbind_all(&self) {
		for (_, cell) in self.entries.borrow().iter() {
			cell.bind(None);
		}
	}

	pub(crate) fn text(&self, id: &str) -> Option<String> {
		self.entries
			.borrow()
			.iter()
			.find(|(key, _)| key == id)
			.map(|(_, cell)| cell.text())
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.borrow().len()
	}
}
