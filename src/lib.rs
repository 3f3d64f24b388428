//! # Shock
//!
//! A minimal component lifecycle engine for building interactive user
//! interfaces inside a host document.
//!
//! A component owns a markup template, optional reactive state, an optional
//! behavior callback, and the stylesheets it depends on. Rendering validates
//! all of it, waits for the stylesheets, commits the template, binds the
//! state and then runs the behavior, in that order.
//!
//! ## Core Principles
//!
//! - **Explicit context**: components are constructed against a [`Document`]
//!   instead of reaching for a global one
//! - **Ordered lifecycle**: nothing touches the document before validation and
//!   stylesheet loads have settled
//! - **Single-threaded**: engine types are shared with `Rc` and never cross
//!   threads
//!
//! ## Feature Flags
//!
//! - `pages` (default) - the component engine, host document and router
//!
//! ## Quick Example
//!
//! ```rust
//! use shock::prelude::*;
//!
//! let document = Document::from_body(r#"<section id="manager"></section>"#);
//! let router = Router::new(&document, "manager").route("Home", |document| {
//!     let home = Component::new(document);
//!     home.set_template(r#"<div class="home"><h1>ShockJS</h1></div>"#);
//!     home
//! });
//!
//! futures::executor::block_on(router.navigate("Home")).unwrap();
//! assert!(document.body_html().contains("<h1>ShockJS</h1>"));
//! ```

#[cfg(feature = "pages")]
pub mod pages;

#[cfg(feature = "pages")]
pub use shock_pages::{
	Behavior, BehaviorContext, Component, Document, Element, EngineSettings, ModuleLocation,
	Redirect, RenderError, Router, RouterError, SetState, StylesheetFailurePolicy, behavior,
	module_location,
};

/// Commonly used items.
#[cfg(feature = "pages")]
pub mod prelude {
	pub use shock_pages::{
		Behavior, BehaviorContext, Component, Document, Element, EngineSettings, Event,
		ModuleLocation, Redirect, RenderError, RenderResult, Router, RouterError, SetState,
		StylesheetFailurePolicy, behavior, module_location,
	};
}
