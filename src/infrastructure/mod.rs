//! Infrastructure layer
//!
//! - Tokio runtime bridge that loads page data off the UI thread
//! - System URL opener for external menu links

pub mod opener;
pub mod runtime;

pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
