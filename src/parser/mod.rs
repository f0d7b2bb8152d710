//! Parser module for external routine references.
//!
//! Decodes the stored external name of a routine into a [`CalleeLocator`]
//! using a pest grammar.

mod grammar;
mod locator;

pub use grammar::{parse_external_reference, ReferenceError};
pub use locator::CalleeLocator;
