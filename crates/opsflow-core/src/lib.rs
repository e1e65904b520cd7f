//! Shared plumbing for opsflow cloud plugins
//!
//! This crate holds the provider-neutral pieces every opsflow operation
//! builds on: the loosely-typed parameter bag callers hand to an
//! operation, tag and port-range normalization, the ordered step report a
//! workflow returns, and the autocomplete item shape used by interactive
//! parameter pickers.

pub mod autocomplete;
pub mod error;
pub mod params;
pub mod ports;
pub mod report;
pub mod tags;

// Re-exports
pub use autocomplete::AutocompleteItem;
pub use error::{CoreError, Result};
pub use params::Params;
pub use ports::PortRange;
pub use report::Report;
pub use tags::{Tag, parse_tag_line, parse_tags, tag_specifications};
