//! Anchoring review threads onto a rendered patch.

pub mod grouping;
pub mod index;
pub mod placement;

pub use grouping::group_threads;
pub use index::PositionError;
pub use placement::{
    BufferRange, PlacedThread, ResolvedPlacement, SuppressReason, place_threads,
    resolve_placement,
};
