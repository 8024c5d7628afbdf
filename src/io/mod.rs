//! Input/output helpers.
//!
//! - bronze/silver directory handling (`store`)
//! - bronze artifact -> silver batch transform (`transform`)
//! - silver CSV writers (`export`)

pub mod export;
pub mod store;
pub mod transform;

pub use export::*;
pub use store::*;
pub use transform::*;
