//! Stylesheet links in the document head.
//!
//! A link is keyed by its resolved href. Each request that creates a link
//! receives a [`StylesheetHandle`], a future that settles when the document
//! reports the load outcome. If the document is dropped first, the handle
//! settles with [`StylesheetError::Abandoned`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::error::StylesheetError;

use super::markup::html_escape;

type LoadOutcome = Result<(), StylesheetError>;

/// Load state of a stylesheet link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
	/// Inserted, outcome not reported yet.
	Pending,
	/// The stylesheet loaded.
	Loaded,
	/// The stylesheet failed to load.
	Failed(String),
}

impl LoadState {
	/// Returns `true` once the link has loaded or failed.
	pub fn is_settled(&self) -> bool {
		!matches!(self, Self::Pending)
	}
}

#[derive(Debug)]
pub(crate) struct StylesheetLink {
	pub(crate) href: String,
	pub(crate) state: LoadState,
	waiters: Vec<oneshot::Sender<LoadOutcome>>,
}

impl StylesheetLink {
	/// Creates a pending link together with the handle observing it.
	pub(crate) fn pending(href: String) -> (Self, StylesheetHandle) {
		let (sender, receiver) = oneshot::channel();
		let handle = StylesheetHandle {
			href: href.clone(),
			receiver,
		};
		let link = Self {
			href,
			state: LoadState::Pending,
			waiters: vec![sender],
		};
		(link, handle)
	}

	/// Settles the link. Returns `false` if it had already settled.
	pub(crate) fn settle(&mut self, outcome: LoadOutcome) -> bool {
		if self.state.is_settled() {
			return false;
		}
		self.state = match &outcome {
			Ok(()) => LoadState::Loaded,
			Err(StylesheetError::LoadFailed { reason, .. }) => LoadState::Failed(reason.clone()),
			Err(other) => LoadState::Failed(other.to_string()),
		};
		for waiter in self.waiters.drain(..) {
			// The receiving side may have been dropped with its component.
			let _ = waiter.send(outcome.clone());
		}
		true
	}

	pub(crate) fn to_html(&self) -> String {
		format!(
			"<link rel=\"stylesheet\" href=\"{}\">",
			html_escape(&self.href)
		)
	}
}

/// Future that settles when a stylesheet link has loaded or failed.
#[must_use = "a stylesheet handle does nothing unless awaited"]
pub struct StylesheetHandle {
	href: String,
	receiver: oneshot::Receiver<LoadOutcome>,
}

impl StylesheetHandle {
	/// Resolved href of the link this handle observes.
	pub fn href(&self) -> &str {
		&self.href
	}
}

impl fmt::Debug for StylesheetHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StylesheetHandle")
			.field("href", &self.href)
			.finish_non_exhaustive()
	}
}

impl Future for StylesheetHandle {
	type Output = LoadOutcome;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match Pin::new(&mut self.receiver).poll(cx) {
			Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
			Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(StylesheetError::Abandoned {
				href: self.href.clone(),
			})),
			Poll::Pending => Poll::Pending,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::FutureExt;
	use rstest::rstest;

	#[rstest]
	fn test_pending_until_settled() {
		let (mut link, mut handle) = StylesheetLink::pending("/a.css".to_string());
		assert!((&mut handle).now_or_never().is_none());

		assert!(link.settle(Ok(())));
		assert_eq!(link.state, LoadState::Loaded);
		assert_eq!(handle.now_or_never(), Some(Ok(())));
	}

	#[rstest]
	fn test_second_settle_is_ignored() {
		let (mut link, handle) = StylesheetLink::pending("/a.css".to_string());
		let failure = StylesheetError::LoadFailed {
			href: "/a.css".to_string(),
			reason: "404".to_string(),
		};

		assert!(link.settle(Err(failure.clone())));
		assert!(!link.settle(Ok(())));
		assert_eq!(link.state, LoadState::Failed("404".to_string()));
		assert_eq!(handle.now_or_never(), Some(Err(failure)));
	}

	#[rstest]
	fn test_dropped_link_abandons_handle() {
		let (link, handle) = StylesheetLink::pending("/gone.css".to_string());
		drop(link);

		assert_eq!(
			handle.now_or_never(),
			Some(Err(StylesheetError::Abandoned {
				href: "/gone.css".to_string()
			}))
		);
	}

	#[rstest]
	fn test_link_markup_escapes_href() {
		let (link, _handle) = StylesheetLink::pending("/a\"b.css".to_string());
		assert_eq!(
			link.to_html(),
			"<link rel=\"stylesheet\" href=\"/a&quot;b.css\">"
		);
	}
}
