//! Per-URL media download with payload validation and unique naming.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::FetchConfig;

/// Process-wide ordinal folded into every generated filename.  Two fetch
/// runs writing into the same directory at the same instant still produce
/// distinct names.
static DOWNLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

/// Extensions we are willing to infer from a `Content-Type` header.
fn extension_for(content_type: &str) -> Option<&'static str> {
    // Parameters like `; charset=…` are not part of the media type.
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();

    match media_type.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        _ => None,
    }
}

/// Decide whether a response with this `Content-Type` is acceptable, and
/// under which extension it should be saved.
fn accept_payload(config: &FetchConfig, content_type: &str) -> anyhow::Result<&'static str> {
    let extension = extension_for(content_type)
        .ok_or_else(|| anyhow::anyhow!("not an image payload: {content_type:?}"))?;

    if let Some(required) = config.require_format.as_deref() {
        // "jpeg" and "jpg" name the same encoding.
        let required = match required.to_ascii_lowercase().as_str() {
            "jpeg" => "jpg".to_string(),
            other => other.to_string(),
        };
        if required != extension {
            anyhow::bail!("payload is {extension}, required format is {required}");
        }
    }

    Ok(extension)
}

/// Build a destination path that cannot collide with any other writer in
/// this process: prefix + wall-clock timestamp + process-wide ordinal.
fn unique_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S%3f");
    let ordinal = DOWNLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
    dir.join(format!("{prefix}{stamp}_{ordinal}.{extension}"))
}

/// Download each URL independently into `dir`.
///
/// A response is accepted only when its `Content-Type` maps to a known
/// image extension; when `config.require_format` is set, only that exact
/// extension passes.  One URL's failure never aborts the batch — it is
/// logged and skipped.  Returns the paths that were actually written.
pub async fn download_all(
    client: &reqwest::Client,
    config: &FetchConfig,
    urls: &[String],
    dir: &Path,
) -> Vec<PathBuf> {
    let mut saved = Vec::new();

    for url in urls {
        match download_one(client, config, url, dir).await {
            Ok(path) => {
                log::info!("saved {}", path.display());
                saved.push(path);
            }
            Err(e) => log::warn!("skipping {url}: {e}"),
        }
    }

    saved
}

async fn download_one(
    client: &reqwest::Client,
    config: &FetchConfig,
    url: &str,
    dir: &Path,
) -> anyhow::Result<PathBuf> {
    let response = client.get(url).send().await?.error_for_status()?;

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let extension = accept_payload(config, &content_type)?;

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        anyhow::bail!("empty response body");
    }

    let path = unique_path(dir, &config.filename_prefix, extension);
    tokio::fs::write(&path, &bytes).await?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
