//! Output files.
//!
//! # Submodules
//!
//! - [`json`]: the article collection and the discovery state
//! - [`lookup`]: the lookup template produced by `discover`
//!
//! Every file is written to a temporary sibling first and renamed into place,
//! so a failed write never replaces an existing artifact with a partial one.

pub mod json;
pub mod lookup;

use crate::error::HarvestError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write `contents` to `path` via a temporary sibling and a rename.
#[instrument(level = "info", skip(contents), fields(path = %path.display(), bytes = contents.len()))]
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), HarvestError> {
    let tmp = temp_sibling(path);
    let output_error = |source: std::io::Error| HarvestError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).await.map_err(output_error)?;
    }
    if let Err(e) = fs::write(&tmp, contents).await {
        error!(tmp = %tmp.display(), error = %e, "Failed to write temporary file");
        let _ = fs::remove_file(&tmp).await;
        return Err(output_error(e));
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        error!(tmp = %tmp.display(), error = %e, "Failed to move temporary file into place");
        let _ = fs::remove_file(&tmp).await;
        return Err(output_error(e));
    }
    info!("Wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_sibling() {
        assert_eq!(
            temp_sibling(Path::new("/out/articles.json")),
            PathBuf::from("/out/.articles.json.tmp")
        );
    }

    #[tokio::test]
    async fn test_write_atomic_replaces_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.json");
        write_atomic(&path, b"first").await.unwrap();
        write_atomic(&path, b"second").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_sibling(&path).exists());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.json");
        std::fs::write(&path, "keep me").unwrap();
        // A directory in the temp file's place makes the write fail.
        std::fs::create_dir(temp_sibling(&path)).unwrap();
        let err = write_atomic(&path, b"new").await.unwrap_err();
        assert!(matches!(err, HarvestError::Output { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
