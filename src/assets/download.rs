//! Asset download — stream to disk, verify, unpack.
//!
//! Bytes land in `<file>.partial` and are renamed only once the body is
//! complete, so a half-finished download is never mistaken for an asset. A
//! leftover partial file is resumed with a Range request.

use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use super::{asset_dir, AssetKind, PARTIAL_EXTENSION};
use crate::config::AppPaths;
use crate::error::{Error, Result};

/// Receives download milestones. All methods default to no-ops.
pub trait DownloadObserver: Send + Sync {
    /// Percent in 0..=100; 0 while the server sends no content length.
    fn on_progress(&self, _percent: f64) {}
    fn on_complete(&self, _path: &Path) {}
    fn on_extracting(&self) {}
    fn on_extracted(&self, _dir: &Path) {}
}

impl DownloadObserver for () {}

#[derive(Debug, Clone)]
pub struct AssetRequest<'a> {
    pub kind: AssetKind,
    /// Catalog name; the directory uses its safe form.
    pub name: &'a str,
    pub url: &'a str,
    /// Unpack the downloaded zip in place and delete the archive.
    pub extract: bool,
    pub sha256: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Download (and optionally unpack) one asset. Returns the downloaded
    /// file, or the asset directory when the archive was extracted.
    ///
    /// On failure the asset directory is left holding at most a `.partial`
    /// file to resume from; a failed extraction removes the directory.
    pub async fn fetch(
        &self,
        paths: &AppPaths,
        req: &AssetRequest<'_>,
        observer: &dyn DownloadObserver,
    ) -> Result<PathBuf> {
        let dir = asset_dir(paths, req.kind, req.name);
        tokio::fs::create_dir_all(&dir).await?;

        let dest = match self.download_verified(&dir, req, observer).await {
            Ok(dest) => dest,
            Err(e) => {
                // Only succeeds when nothing (not even a partial) was written.
                let _ = tokio::fs::remove_dir(&dir).await;
                return Err(e);
            }
        };
        observer.on_complete(&dest);

        if !req.extract {
            return Ok(dest);
        }

        observer.on_extracting();
        let (archive, into) = (dest.clone(), dir.clone());
        let extracted = tokio::task::spawn_blocking(move || extract_zip(&archive, &into))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))
            .and_then(|r| r);
        let count = match extracted {
            Ok(count) => count,
            Err(e) => {
                log::warn!("[ASSET] Extraction failed, removing {}", dir.display());
                let _ = tokio::fs::remove_dir_all(&dir).await;
                return Err(e);
            }
        };
        tokio::fs::remove_file(&dest).await?;
        log::info!("[ASSET] Extracted {} files into {}", count, dir.display());
        observer.on_extracted(&dir);

        Ok(dir)
    }

    /// Stream into `<file>.partial`, rename into place, check the hash.
    async fn download_verified(
        &self,
        dir: &Path,
        req: &AssetRequest<'_>,
        observer: &dyn DownloadObserver,
    ) -> Result<PathBuf> {
        let dest = dir.join(target_file_name(req));
        let partial = partial_path(&dest);

        self.stream_to(&partial, req, observer).await?;
        tokio::fs::rename(&partial, &dest).await?;
        log::info!("[ASSET] Download complete: {}", dest.display());

        if let Some(expected) = req.sha256.filter(|h| !h.is_empty()) {
            let path = dest.clone();
            let expected = expected.to_string();
            let verified = tokio::task::spawn_blocking(move || verify_sha256(&path, &expected))
                .await
                .map_err(|e| Error::Io(std::io::Error::other(e)))?;
            if let Err(e) = verified {
                let _ = tokio::fs::remove_file(&dest).await;
                return Err(e);
            }
            log::info!("[ASSET] Hash verified for {}", req.name);
        }
        Ok(dest)
    }

    async fn stream_to(
        &self,
        partial: &Path,
        req: &AssetRequest<'_>,
        observer: &dyn DownloadObserver,
    ) -> Result<()> {
        let existing = tokio::fs::metadata(partial)
            .await
            .map(|m| m.len())
            .unwrap_or(0);

        log::info!(
            "[ASSET] Downloading {} from {} (resuming from {} bytes)",
            req.name,
            req.url,
            existing
        );

        let mut request = self.client.get(req.url);
        if existing > 0 {
            request = request.header(reqwest::header::RANGE, format!("bytes={}-", existing));
        }
        let mut resp = request.send().await?.error_for_status()?;

        // A server that ignores Range sends the whole body again.
        let resumed = existing > 0 && resp.status() == reqwest::StatusCode::PARTIAL_CONTENT;
        let mut downloaded = if resumed { existing } else { 0 };
        let total = resp.content_length().map_or(0, |len| len + downloaded);

        let mut file = if resumed {
            tokio::fs::OpenOptions::new().append(true).open(partial).await?
        } else {
            tokio::fs::File::create(partial).await?
        };

        let mut last_reported = None;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            // One event per whole percent keeps the event bus quiet.
            let percent = percent_of(downloaded, total);
            let whole = percent.floor() as u32;
            if last_reported != Some(whole) {
                last_reported = Some(whole);
                observer.on_progress(percent);
            }
        }
        file.flush().await?;
        Ok(())
    }
}

/// Convenience wrapper with a default client.
pub async fn download_asset(
    paths: &AppPaths,
    req: &AssetRequest<'_>,
    observer: &dyn DownloadObserver,
) -> Result<PathBuf> {
    Downloader::new().fetch(paths, req, observer).await
}

fn percent_of(downloaded: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (downloaded as f64 / total as f64 * 100.0).min(100.0)
}

/// Models are stored as `<name>.gguf` so the launcher can find them by name;
/// everything else keeps the URL's file name.
fn target_file_name(req: &AssetRequest<'_>) -> String {
    match req.kind {
        AssetKind::Models if !req.extract => format!("{}.gguf", req.name),
        _ => file_name_from_url(req.url),
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    dest.with_file_name(format!(
        "{}.{}",
        dest.file_name().and_then(|n| n.to_str()).unwrap_or("download"),
        PARTIAL_EXTENSION
    ))
}

fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "..")
        .unwrap_or("download.zip")
        .to_string()
}

/// SHA-256 check, reading in 8 MB chunks. An empty expectation passes.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    if expected.is_empty() {
        return Ok(());
    }

    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::with_capacity(8 * 1024 * 1024, file);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 8 * 1024 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let actual = format!("{:x}", hasher.finalize());
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(Error::HashMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Unpack `archive` into `into`. Entries whose paths would land outside the
/// target directory are skipped. Returns the number of files written.
fn extract_zip(archive: &Path, into: &Path) -> Result<usize> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    let mut written = 0;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("[ASSET] Skipping unsafe archive entry {:?}", entry.name());
            continue;
        };
        let out = into.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut target = std::fs::File::create(&out)?;
        std::io::copy(&mut entry, &mut target)?;

        // Runtime binaries must stay executable.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&out, std::fs::Permissions::from_mode(mode))?;
            }
        }
        written += 1;
    }

    Ok(written)
}
