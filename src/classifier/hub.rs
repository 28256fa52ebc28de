//! Hub weight resolution.
//!
//! Mirrors the hub-download convention: weights live at
//! `https://huggingface.co/{repo}/resolve/main/{filename}` and are cached
//! locally, so the network is only touched on first start. The download
//! streams to a `.part` file and renames into place, so a crash mid-transfer
//! never leaves a truncated model in the cache.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use super::ClassifierError;

/// Resolve the model file, downloading into `cache_dir` when absent.
pub async fn fetch_model(
    repo: &str,
    filename: &str,
    cache_dir: &Path,
) -> Result<PathBuf, ClassifierError> {
    let target = cache_dir.join(filename);
    if target.exists() {
        tracing::debug!(path = %target.display(), "Using cached classifier weights");
        return Ok(target);
    }

    tokio::fs::create_dir_all(cache_dir)
        .await
        .map_err(|e| ClassifierError::Download(format!("Cannot create cache dir: {e}")))?;

    let url = hub_url(repo, filename);
    tracing::info!(%url, "Downloading classifier weights");

    let response = reqwest::get(&url)
        .await
        .map_err(|e| ClassifierError::Download(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ClassifierError::Download(format!(
            "Hub returned HTTP {status} for {url}"
        )));
    }

    let part = target.with_extension("onnx.part");
    let mut file = tokio::fs::File::create(&part)
        .await
        .map_err(|e| ClassifierError::Download(format!("Cannot create {}: {e}", part.display())))?;

    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ClassifierError::Download(e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| ClassifierError::Download(e.to_string()))?;
        written += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| ClassifierError::Download(e.to_string()))?;
    drop(file);

    tokio::fs::rename(&part, &target)
        .await
        .map_err(|e| ClassifierError::Download(e.to_string()))?;

    tracing::info!(bytes = written, path = %target.display(), "Classifier weights cached");
    Ok(target)
}

fn hub_url(repo: &str, filename: &str) -> String {
    format!("https://huggingface.co/{repo}/resolve/main/{filename}")
}
