//! Circuit representation and building API.
//!
//! The [`Circuit`] struct owns the ordered element list and exposes the
//! validated `add_*` operations together with the solve entry points.

mod builder;
mod types;

pub use builder::Circuit;
pub use types::NodeId;
