//! External capabilities the pipeline depends on.
//!
//! - HTTP download of weekly reports (`fetch`)
//! - spreadsheet decoding into a headerless string table (`sheet`)

pub mod fetch;
pub mod sheet;

pub use fetch::*;
pub use sheet::*;
