//! Stylesheet resolution and loading.
//!
//! Stylesheet paths are resolved against the location of the module that
//! declares the component, then linked into the document head. A resolved
//! href is linked at most once per document, however many components ask
//! for it.

use std::fmt;

use tracing::info;
use url::Url;

use crate::dom::{Document, StylesheetHandle};

/// Location of the module a component is defined in, e.g.
/// `/app/pages/Home/Home.rs`.
///
/// Usually produced by [`module_location!`](crate::module_location). Full
/// URLs are reduced to their path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleLocation(String);

impl ModuleLocation {
	/// Creates a location, reducing `scheme://host/path` to `/path`.
	pub fn new(location: impl Into<String>) -> Self {
		let location = location.into();
		match Url::parse(&location) {
			Ok(url) if !url.cannot_be_a_base() => Self(url.path().to_string()),
			_ => Self(location),
		}
	}

	/// The location as a string.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Everything before the last `/`.
	pub fn directory(&self) -> &str {
		self.0.rsplit_once('/').map_or("", |(dir, _)| dir)
	}

	/// Resolves `path` against this location.
	pub fn resolve(&self, path: &str) -> String {
		resolve_stylesheet_path(self, path)
	}
}

impl fmt::Display for ModuleLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ModuleLocation {
	fn from(location: &str) -> Self {
		Self::new(location)
	}
}

impl From<String> for ModuleLocation {
	fn from(location: String) -> Self {
		Self::new(location)
	}
}

impl From<&ModuleLocation> for ModuleLocation {
	fn from(location: &ModuleLocation) -> Self {
		location.clone()
	}
}

/// Resolves a stylesheet path against a module location.
///
/// With `dir` being the location up to its last `/`:
///
/// | path | result |
/// |---|---|
/// | `/x.css` | `dir + "/x.css"` |
/// | `x.css` (no `/`) | `dir + "/x.css"` |
/// | `./styles/x.css` | `dir + "/styles/x.css"` |
/// | anything else | unchanged |
///
/// ```
/// use shock_pages::component::{resolve_stylesheet_path, ModuleLocation};
///
/// let base = ModuleLocation::new("/app/pages/Home/Home.rs");
/// assert_eq!(
///     resolve_stylesheet_path(&base, "./styles/Home.css"),
///     "/app/pages/Home/styles/Home.css"
/// );
/// assert_eq!(resolve_stylesheet_path(&base, "../shared.css"), "../shared.css");
/// ```
pub fn resolve_stylesheet_path(base: &ModuleLocation, path: &str) -> String {
	let dir = base.directory();
	if path.starts_with('/') {
		format!("{dir}{path}")
	} else if !path.contains('/') {
		format!("{dir}/{path}")
	} else if let Some(rest) = path.strip_prefix("./") {
		format!("{dir}/{rest}")
	} else {
		path.to_string()
	}
}

/// Resolves each path, links the ones not yet in the document, and returns a
/// handle per newly linked stylesheet, in request order.
///
/// Duplicates are skipped without a handle. The handles may be dropped when
/// nothing needs to wait for the loads.
pub fn request_stylesheets<I, S>(
	document: &Document,
	base: &ModuleLocation,
	paths: I,
) -> Vec<StylesheetHandle>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut handles = Vec::new();
	for path in paths {
		let href = resolve_stylesheet_path(base, path.as_ref());
		match document.link_stylesheet(&href) {
			Some(handle) => handles.push(handle),
			None => info!(href = %href, "stylesheet already linked"),
		}
	}
	handles
}
