//! Named-route navigation over the component contract.
//!
//! The router only uses what any caller of [`Component`](crate::component::Component)
//! can use: it builds a component per route and renders it into an outlet
//! element.
//!
//! ## Example
//!
//! ```
//! use shock_pages::component::Component;
//! use shock_pages::dom::Document;
//! use shock_pages::router::Router;
//!
//! let document = Document::from_body(r#"<section id="manager"></section>"#);
//! let router = Router::new(&document, "manager").route("Home", |document| {
//!     let home = Component::new(document);
//!     home.set_template("<h1>Home</h1>");
//!     home
//! });
//!
//! futures::executor::block_on(router.navigate("Home")).unwrap();
//! assert_eq!(
//!     document.body_html(),
//!     r#"<section id="manager"><h1>Home</h1></section>"#
//! );
//! ```

mod core;
mod redirect;

pub use self::core::{Route, Router};
pub use redirect::Redirect;
