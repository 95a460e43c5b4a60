use crate::errors::DetectError;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Make sure the model weights exist at `path`, fetching them from `url` on
/// first use. An already-present file is never re-fetched.
///
/// When `sha256` is set, the on-disk artifact is hashed and compared before
/// it is trusted, whether it was just downloaded or already there.
pub fn ensure_weights(
    path: &Path,
    url: &str,
    sha256: Option<&str>,
) -> Result<PathBuf, DetectError> {
    ensure_weights_with(path, url, sha256, fetch_over_http)
}

/// Same as [`ensure_weights`] with an injectable fetch step.
pub fn ensure_weights_with<F>(
    path: &Path,
    url: &str,
    sha256: Option<&str>,
    mut fetch: F,
) -> Result<PathBuf, DetectError>
where
    F: FnMut(&str, &Path) -> anyhow::Result<()>,
{
    if path.exists() {
        tracing::debug!(path = %path.display(), "model weights already present, skipping fetch");
    } else {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| DetectError::Fetch(format!("create {}: {}", parent.display(), e)))?;
        }

        tracing::info!(url, path = %path.display(), "fetching model weights");

        // Download into a sibling and rename so a failed fetch never leaves
        // a truncated artifact at the final path.
        let partial = partial_path(path);
        fetch(url, &partial).map_err(|e| DetectError::Fetch(e.to_string()))?;
        fs::rename(&partial, path)
            .map_err(|e| DetectError::Fetch(format!("rename into {}: {}", path.display(), e)))?;
    }

    match sha256 {
        Some(expected) => verify_sha256(path, expected)?,
        None => {
            tracing::warn!(
                path = %path.display(),
                "no checksum pinned for model weights; trusting artifact as-is"
            );
        }
    }

    Ok(path.to_path_buf())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

fn fetch_over_http(url: &str, dest: &Path) -> anyhow::Result<()> {
    let response = ureq::get(url).call()?;

    let mut reader = response.into_reader();
    let mut file = File::create(dest)?;
    let bytes = io::copy(&mut reader, &mut file)?;

    tracing::info!(bytes, dest = %dest.display(), "model weights downloaded");
    Ok(())
}

fn verify_sha256(path: &Path, expected: &str) -> Result<(), DetectError> {
    let mut file = File::open(path)
        .map_err(|e| DetectError::Fetch(format!("open {}: {}", path.display(), e)))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| DetectError::Fetch(format!("hash {}: {}", path.display(), e)))?;

    let actual = hex::encode(hasher.finalize());
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(DetectError::Fetch(format!(
            "checksum mismatch for {}: expected {}, got {}",
            path.display(),
            expected,
            actual
        )));
    }

    tracing::debug!(path = %path.display(), "model weights checksum verified");
    Ok(())
}
