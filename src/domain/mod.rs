//! Domain types used throughout the pipeline.
//!
//! - reporting windows and the naming convention derived from them (`window`)
//! - silver-layer records and the run accumulator (`record`)

pub mod record;
pub mod window;

pub use record::*;
pub use window::*;
