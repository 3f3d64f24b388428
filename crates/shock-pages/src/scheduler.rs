//! Task scheduling with an explicit flush point.
//!
//! The scheduler owns two queues:
//!
//! - **Deferred callbacks**: `FnOnce` tasks queued with [`Scheduler::defer`]
//!   and drained in FIFO order by [`Scheduler::flush`]. Callbacks queued while
//!   a flush is running join the same flush.
//! - **Local tasks**: futures queued with [`Scheduler::spawn`] and polled by
//!   [`Scheduler::run_until_stalled`] on a single-threaded executor.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use shock_pages::scheduler::Scheduler;
//!
//! let scheduler = Scheduler::new();
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let first = Rc::clone(&log);
//! scheduler.defer(move || first.borrow_mut().push("first"));
//! let second = Rc::clone(&log);
//! scheduler.defer(move || second.borrow_mut().push("second"));
//!
//! assert_eq!(scheduler.flush(), 2);
//! assert_eq!(*log.borrow(), vec!["first", "second"]);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use tracing::{debug, warn};

type Task = Box<dyn FnOnce()>;

/// Single-threaded scheduler owned by a [`Document`](crate::dom::Document).
pub struct Scheduler {
	deferred: RefCell<VecDeque<Task>>,
	pool: RefCell<LocalPool>,
	spawner: LocalSpawner,
	flushing: Cell<bool>,
}

/// Clears the flushing flag even if a callback panics.
struct FlushGuard<'a>(&'a Cell<bool>);

impl Drop for FlushGuard<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

impl Scheduler {
	/// Creates an empty scheduler.
	pub fn new() -> Self {
		let pool = LocalPool::new();
		let spawner = pool.spawner();
		Self {
			deferred: RefCell::new(VecDeque::new()),
			pool: RefCell::new(pool),
			spawner,
			flushing: Cell::new(false),
		}
	}

	/// Queues a callback for the next flush.
	pub fn defer(&self, task: impl FnOnce() + 'static) {
		self.deferred.borrow_mut().push_back(Box::new(task));
	}

	/// Number of callbacks waiting for a flush.
	pub fn pending(&self) -> usize {
		self.deferred.borrow().len()
	}

	/// Returns `true` while a flush is draining the queue.
	pub fn is_flushing(&self) -> bool {
		self.flushing.get()
	}

	/// Runs queued callbacks until the queue is empty.
	///
	/// Returns the number of callbacks that ran. A flush requested from inside
	/// a running flush does nothing and returns 0; the outer flush picks up
	/// whatever was queued.
	pub fn flush(&self) -> usize {
		if self.flushing.replace(true) {
			return 0;
		}
		let _guard = FlushGuard(&self.flushing);

		let mut ran = 0;
		loop {
			// The queue borrow must end before the callback runs.
			let next = self.deferred.borrow_mut().pop_front();
			let Some(task) = next else {
				break;
			};
			task();
			ran += 1;
		}
		ran
	}

	/// Queues a future on the local executor.
	pub fn spawn(&self, future: impl Future<Output = ()> + 'static) {
		if let Err(err) = self.spawner.spawn_local(future) {
			warn!(error = %err, "failed to spawn local task");
		}
	}

	/// Polls local tasks and flushes callbacks until neither makes progress.
	pub fn run_until_stalled(&self) {
		loop {
			match self.pool.try_borrow_mut() {
				Ok(mut pool) => pool.run_until_stalled(),
				Err(_) => debug!("local executor is already running"),
			}
			if self.flush() == 0 {
				break;
			}
		}
	}
}

impl Default for Scheduler {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Scheduler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Scheduler")
			.field("pending", &self.pending())
			.field("flushing", &self.flushing.get())
			.finish_non_exhaustive()
	}
}
