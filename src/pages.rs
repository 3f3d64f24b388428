//! Component engine
//!
//! This module provides access to shock-pages: components, the in-memory host
//! document, the scheduler and the router.
//!
//! ## Architecture
//!
//! - **Components**: templates, state bindings, behaviors and stylesheet loads
//! - **Document**: head links, body markup, element and window listeners
//! - **Scheduler**: deferred callbacks with an explicit flush point
//! - **Router**: named-route navigation into an outlet element

// Re-export all shock-pages functionality
pub use shock_pages::*;
