//! Common utilities for the arbor document tree.
//!
//! This crate provides shared infrastructure used by the other arbor crates:
//! - **Warning System** - deduplicated, colored diagnostics on stderr
//! - **Fetching** - blocking HTTP GET for documents that live behind a URL

pub mod net;
pub mod warning;
