#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod text;
mod types;

/// ASCII PLY export of sparse points.
pub mod ply;

pub use text::*;
pub use types::*;
