//! In-memory host document.
//!
//! Components never reach for a global document. They are constructed against
//! a [`Document`], which owns:
//!
//! - the **head**: deduplicated stylesheet links and their load states,
//! - the **body**: a markup tree with id and class lookup,
//! - the **listeners** attached to elements and to the window,
//! - the [`Scheduler`](crate::scheduler::Scheduler) that orders deferred work.
//!
//! The host drives stylesheet loads by calling
//! [`Document::complete_stylesheet`] or [`Document::fail_stylesheet`], or
//! opts into immediate settlement through
//! [`EngineSettings::auto_settle_stylesheets`](crate::settings::EngineSettings).

mod document;
mod element;
mod event;
mod head;
pub(crate) mod markup;

pub use document::Document;
pub use element::Element;
pub use event::{Event, ListenerId};
pub use head::{LoadState, StylesheetHandle};

pub(crate) use markup::html_escape;
