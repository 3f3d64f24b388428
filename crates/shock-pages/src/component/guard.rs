//! Advisory check for behaviors that listen on the window.
//!
//! Window listeners outlive the markup a component renders, so a behavior
//! that registers them leaks handlers across renders. The check is a text
//! heuristic over the behavior's source and never blocks registration.

use tracing::warn;

/// Warning emitted for window-scoped behaviors.
pub const WINDOW_SCOPED_ADVISORY: &str = "It is not recommended to attach events to the window element. Add an id, and attach the event to the id instead.";

/// Matched against lowercased source with all whitespace removed.
const WINDOW_PATTERNS: &[&str] = &[
	"window.on",
	"window.addeventlistener",
	"on_window(",
	"add_window_listener(",
];

/// Returns `true` if the source appears to attach window listeners.
pub fn is_window_scoped(source: &str) -> bool {
	let normalized: String = source
		.chars()
		.filter(|c| !c.is_whitespace())
		.flat_map(char::to_lowercase)
		.collect();
	WINDOW_PATTERNS
		.iter()
		.any(|pattern| normalized.contains(pattern))
}

/// Logs [`WINDOW_SCOPED_ADVISORY`] once if the source is window-scoped.
pub fn warn_if_window_scoped(source: &str) -> bool {
	let scoped = is_window_scoped(source);
	if scoped {
		warn!("{WINDOW_SCOPED_ADVISORY}");
	}
	scoped
}
