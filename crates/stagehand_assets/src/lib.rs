//! Model loading for the Stagehand viewer.
//!
//! [`SceneLoader`] is the seam between the viewer core and container formats;
//! [`GltfLoader`] implements it for glTF 2.0 and GLB.

pub mod gltf_loader;
pub mod info;
pub mod io;
pub mod loader;

pub use gltf_loader::{GltfLoader, ROOT_NODE_NAME};
pub use info::{ElementCounts, ModelInfo};
pub use loader::{LoadedModel, SceneLoader};
