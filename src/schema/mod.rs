//! Raw journal schema
//!
//! This module defines the storage-shaped input rows and the adapter that
//! turns them into the typed entry model.

mod adapter;
mod raw_entry;

pub use adapter::*;
pub use raw_entry::*;
