//! Shock Pages - a minimal component lifecycle engine
//!
//! Components own a markup template, reactive state values, a behavior
//! callback and the stylesheets they depend on. The engine decides how these
//! are validated, loaded, ordered and committed to a host document without
//! duplicate resources, racing loads, or dangling bindings.
//!
//! ## Architecture
//!
//! - [`dom`]: in-memory host document (head links, body tree, listeners)
//! - [`scheduler`]: deferred callbacks and local tasks with an explicit flush point
//! - [`component`]: components, stylesheet loading, state, behaviors, rendering
//! - [`router`]: named-route navigation built on the component contract
//! - [`settings`]: engine settings, loadable from TOML
//! - [`error`]: error types
//!
//! ## Macros
//!
//! - [`behavior!`]: builds a [`Behavior`] that remembers its own source text
//! - [`module_location!`]: the [`ModuleLocation`] of the invoking file
//!
//! ## Example
//!
//! ```
//! use shock_pages::{behavior, module_location, Component, Document};
//!
//! let document = Document::from_body(r#"<main id="app"></main>"#);
//! let home = Component::new(&document);
//!
//! home.request_stylesheets(module_location!(), ["./styles/Home.css"]);
//! let (likes, set_likes) = home.declare_state(0, "likes");
//! home.set_template(format!(
//!     r#"<button id="like">Like</button><span id="likes">{likes}</span>"#
//! ));
//! home.set_behavior(behavior!(move |cx| {
//!     let set_likes = set_likes.clone();
//!     let _ = cx.on("like", "click", move |_| set_likes.update(|n| *n += 1));
//! }));
//!
//! let app = document.get_element_by_id("app").unwrap();
//! let render = home.render(&app);
//! document.complete_all_stylesheets();
//! futures::executor::block_on(render).unwrap();
//!
//! document.get_element_by_id("like").unwrap().dispatch_event("click").unwrap();
//! assert_eq!(home.state_text("likes").as_deref(), Some("1"));
//! ```

pub mod component;
pub mod dom;
pub mod error;
pub mod router;
pub mod scheduler;
pub mod settings;

pub use component::{Behavior, BehaviorContext, Component, ModuleLocation, SetState};
pub use dom::{Document, Element, Event, ListenerId, LoadState, StylesheetHandle};
pub use error::{ConfigError, DomError, RenderError, RenderResult, RouterError, StylesheetError};
pub use router::{Redirect, Route, Router};
pub use scheduler::Scheduler;
pub use settings::{EngineSettings, StylesheetFailurePolicy};

/// Builds a [`Behavior`] from a closure, recording the closure's source text
/// for the window listener advisory.
///
/// ```
/// use shock_pages::behavior;
///
/// let b = behavior!(|cx| {
///     cx.on_window("resize", |_| {});
/// });
/// assert!(b.source().unwrap().contains("on_window"));
/// ```
#[macro_export]
macro_rules! behavior {
	($($body:tt)+) => {
		$crate::component::Behavior::new($($body)+).with_source(stringify!($($body)+))
	};
}

/// Expands to the [`ModuleLocation`] of the invoking source file, rooted at
/// `/`.
#[macro_export]
macro_rules! module_location {
	() => {
		$crate::component::ModuleLocation::new(concat!("/", file!()))
	};
}
