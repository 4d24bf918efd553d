//! Error Types
//!
//! This module defines the error type shared by every Stagehand crate.
//!
//! # Overview
//!
//! The main error type [`Error`] covers all failure modes of the viewer core:
//! - Playback commands referencing a missing model or clip
//! - Decoding failures of model and animation files
//! - Buffer resolution and I/O failures inside the scene loader
//! - Background task failures
//!
//! None of these are fatal. Every public API that can fail returns
//! [`Result<T>`], and a rejected call leaves the viewer state untouched.
//!
//! ```rust,ignore
//! use stagehand_core::errors::{Error, Result};
//!
//! fn select(name: &str) -> Result<()> {
//!     Err(Error::ClipNotFound(name.to_string()))
//! }
//! ```

use thiserror::Error;

/// The main error type for the Stagehand viewer.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Playback Errors
    // ========================================================================
    /// An operation needs a displayed model, but none is loaded.
    #[error("No model is loaded")]
    NoModelLoaded,

    /// The file parsed correctly but carries no animation clips.
    #[error("File contains no animation data")]
    NoAnimationData,

    /// The requested clip does not exist in the active registry.
    #[error("Animation clip not found: {0}")]
    ClipNotFound(String),

    /// Playback speed must be finite and strictly positive.
    #[error("Invalid playback speed: {0}")]
    InvalidPlaybackSpeed(f32),

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// An animation-only file could not be parsed.
    #[error("Malformed animation file: {0}")]
    MalformedClipFile(String),

    /// A model file could not be parsed.
    #[error("Model decode error: {0}")]
    ModelDecode(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUri(String),

    /// A buffer references an external file that cannot be resolved.
    #[error("Unresolved buffer: {0}")]
    UnresolvedBuffer(String),

    // ========================================================================
    // I/O & Task Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A background task failed to complete.
    #[error("Task join error: {0}")]
    TaskJoin(String),
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
