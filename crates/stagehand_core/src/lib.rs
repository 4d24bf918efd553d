//! Core utilities and foundational types shared by every Stagehand crate.
//!
//! - [`errors`]: the shared [`Error`] type and [`Result`] alias
//! - [`bounds`]: [`BoundingBox`], the axis-aligned volume used for model placement
//! - [`time`]: frame [`Timer`] and the fixed-cadence [`FrameThrottle`]
//! - [`NodeHandle`]: the scene node key, defined here so the animation crate can
//!   bind tracks to nodes without depending on the scene graph

pub mod bounds;
pub mod errors;
pub mod time;

pub use bounds::BoundingBox;
pub use errors::{Error, Result};
pub use time::{FrameThrottle, Timer};

use slotmap::new_key_type;

new_key_type! {
    /// Strongly-typed handle to a scene graph node.
    pub struct NodeHandle;
}
