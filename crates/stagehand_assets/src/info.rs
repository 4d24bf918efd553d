use serde::{Deserialize, Serialize};

/// Element counts of a decoded document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCounts {
    pub scenes: usize,
    pub nodes: usize,
    pub meshes: usize,
    pub materials: usize,
    pub textures: usize,
    pub images: usize,
    pub animations: usize,
    pub skins: usize,
    pub cameras: usize,
}

/// Read-only metadata about a loaded file, for the host's info panels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub generator: Option<String>,
    pub version: String,
    pub copyright: Option<String>,
    pub counts: ElementCounts,
    pub extensions_used: Vec<String>,
    pub extensions_required: Vec<String>,
}

impl ModelInfo {
    /// Whether the file needs an extension outside `supported`.
    #[must_use]
    pub fn unsupported_required<'a>(&'a self, supported: &[&str]) -> Vec<&'a str> {
        self.extensions_required
            .iter()
            .map(String::as_str)
            .filter(|ext| !supported.contains(ext))
            .collect()
    }
}
