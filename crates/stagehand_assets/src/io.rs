use std::path::Path;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use stagehand_core::{Error, Result};
#[cfg(not(target_arch = "wasm32"))]
use url::Url;

/// Decodes a `data:` URI into bytes.
///
/// Only base64 payloads are accepted; that is the only encoding glTF exporters use
/// for embedded buffers.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::DataUri("not a data URI".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::DataUri("missing ',' separator".to_string()))?;

    if !header.ends_with(";base64") {
        return Err(Error::DataUri(format!(
            "unsupported encoding in '{header}', expected base64"
        )));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::DataUri(e.to_string()))
}

/// Resolves a buffer URI: embedded data URIs directly, relative paths against
/// `base_path` when one is configured.
pub fn resolve_uri(uri: &str, base_path: Option<&Path>) -> Result<Vec<u8>> {
    if uri.starts_with("data:") {
        return decode_data_uri(uri);
    }

    let Some(base) = base_path else {
        return Err(Error::UnresolvedBuffer(format!(
            "external buffer '{uri}' needs a base path"
        )));
    };

    #[cfg(not(target_arch = "wasm32"))]
    {
        let path = relative_buffer_path(uri, base)?;
        std::fs::read(&path).map_err(|e| {
            Error::UnresolvedBuffer(format!("failed to read '{}': {e}", path.display()))
        })
    }
    #[cfg(target_arch = "wasm32")]
    {
        Err(Error::UnresolvedBuffer(format!(
            "external buffer '{uri}' cannot be read from '{}' on this target",
            base.display()
        )))
    }
}

/// Maps a relative buffer URI to a file under `base`.
///
/// The URI is percent-decoded (`my%20model.bin` names `my model.bin`). Absolute
/// URIs and references that climb out of `base` are rejected.
#[cfg(not(target_arch = "wasm32"))]
pub fn relative_buffer_path(uri: &str, base: &Path) -> Result<PathBuf> {
    let unresolved = |reason: &str| Error::UnresolvedBuffer(format!("buffer URI '{uri}' {reason}"));

    if Url::parse(uri).is_ok() || uri.starts_with(['/', '\\']) {
        return Err(unresolved("is absolute"));
    }

    // A model path without directory components has an empty parent.
    let base = if base.as_os_str().is_empty() {
        Path::new(".")
    } else {
        base
    };
    let base = std::path::absolute(base)?;
    let base_url =
        Url::from_directory_path(&base).map_err(|()| unresolved("has no usable base directory"))?;
    let root = base_url
        .to_file_path()
        .map_err(|()| unresolved("has no usable base directory"))?;

    let path = base_url
        .join(uri)
        .ok()
        .and_then(|url| url.to_file_path().ok())
        .ok_or_else(|| unresolved("is not a valid relative reference"))?;

    if !path.starts_with(&root) {
        return Err(unresolved("points outside the model directory"));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_octet_stream() {
        let bytes = decode_data_uri("data:application/octet-stream;base64,AAEC").unwrap();
        assert_eq!(bytes, vec![0, 1, 2]);
    }

    #[test]
    fn rejects_non_base64() {
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(Error::DataUri(_))
        ));
    }

    #[test]
    fn external_uri_without_base_is_unresolved() {
        assert!(matches!(
            resolve_uri("scene.bin", None),
            Err(Error::UnresolvedBuffer(_))
        ));
    }

    #[test]
    fn relative_path_is_percent_decoded() {
        let base = std::env::temp_dir();
        let path = relative_buffer_path("my%20model.bin", &base).unwrap();
        assert_eq!(path.file_name().unwrap(), "my model.bin");
        assert!(path.starts_with(std::path::absolute(&base).unwrap()));

        let nested = relative_buffer_path("textures/../buffers/a.bin", &base).unwrap();
        assert!(nested.ends_with("buffers/a.bin"));
    }

    #[test]
    fn absolute_and_escaping_uris_are_rejected() {
        let base = std::env::temp_dir().join("stagehand-model");
        for uri in [
            "/etc/passwd",
            "file:///etc/passwd",
            "https://example.com/a.bin",
            "../secret.bin",
            "a/../../secret.bin",
        ] {
            assert!(
                matches!(relative_buffer_path(uri, &base), Err(Error::UnresolvedBuffer(_))),
                "{uri} was accepted"
            );
        }
    }
}
