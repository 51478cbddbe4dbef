//! Saving resolved media to disk.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::constants::constants;
use crate::resolver::MediaKind;

/// Synthesize the download filename from the media kind and a unix-millis
/// timestamp. The name carries no extension.
pub fn synthesize_filename(kind: MediaKind, at_millis: i64) -> String {
  format!("{}-{}-{}", constants().filename_prefix, kind.label(), at_millis)
}

/// Current unix-millis timestamp for filename synthesis.
pub fn now_millis() -> i64 {
  Utc::now().timestamp_millis()
}

/// Fetch the media bytes and stream them into `dir` under `filename`.
/// Returns the path of the written file.
pub async fn save_media(client: &reqwest::Client, media_url: &str, dir: &Path, filename: &str) -> Result<PathBuf> {
  let path = dir.join(filename);

  tokio::fs::create_dir_all(dir).await.with_context(|| format!("Failed to create {}", dir.display()))?;

  let response =
    client.get(media_url).send().await.with_context(|| format!("Failed to fetch media from {}", media_url))?;
  if !response.status().is_success() {
    bail!("Media fetch failed with status {}", response.status());
  }

  let mut file =
    tokio::fs::File::create(&path).await.with_context(|| format!("Failed to create {}", path.display()))?;
  let mut stream = response.bytes_stream();
  while let Some(chunk) = stream.next().await {
    let chunk = chunk.context("Failed reading media stream")?;
    file.write_all(&chunk).await.context("Failed writing media chunk")?;
  }
  file.flush().await.context("Failed flushing media file")?;

  info!(path = %path.display(), "media saved");
  Ok(path)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn filename_carries_prefix_and_kind() {
    let name = synthesize_filename(MediaKind::Video, 1_700_000_000_000);
    assert_eq!(name, "instagram-video-1700000000000");
    let name = synthesize_filename(MediaKind::Image, 42);
    assert_eq!(name, "instagram-image-42");
  }

  #[test]
  fn filename_has_no_extension() {
    let name = synthesize_filename(MediaKind::Image, 1_700_000_000_000);
    assert!(!name.contains('.'));
  }
}
