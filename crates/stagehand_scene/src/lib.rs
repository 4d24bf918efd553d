//! Scene graph for the Stagehand viewer.
//!
//! A [`Scene`] is a slotmap arena of [`Node`]s linked by [`NodeHandle`]s. It
//! propagates TRS transforms into world matrices, measures world-space bounds of
//! drawable geometry, and is the [`AnimationTarget`] animation clips are bound to.
//!
//! [`NodeHandle`]: stagehand_core::NodeHandle
//! [`AnimationTarget`]: stagehand_animation::AnimationTarget

pub mod node;
pub mod scene;
pub mod transform;
pub mod transform_system;

pub use node::{Drawable, MeshData, Node, NodeKind};
pub use scene::{NodeBuilder, Scene};
pub use transform::Transform;
