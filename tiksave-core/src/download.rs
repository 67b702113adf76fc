use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::{DownloadSection, DEFAULT_DOWNLOAD_TIMEOUT_SECONDS};
use crate::display::{download_links, MediaKind, MediaLink};
use crate::fetch::VideoRecord;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("io error at {path}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("no {0} media available for this post")]
    Unavailable(&'static str),
    #[error("post id {0:?} cannot be used as a file name")]
    UnsafeId(String),
    #[error("download of {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },
}

pub type DownloadResult<T> = Result<T, DownloadError>;

#[derive(Debug, Clone, Serialize)]
pub struct DownloadedFile {
    pub kind: MediaKind,
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Which of a record's links to save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSelection {
    Hd,
    Watermarked,
    Audio,
    Cover,
    Images,
    All,
}

impl MediaSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaSelection::Hd => "hd",
            MediaSelection::Watermarked => "watermarked",
            MediaSelection::Audio => "audio",
            MediaSelection::Cover => "cover",
            MediaSelection::Images => "images",
            MediaSelection::All => "all",
        }
    }

    pub fn matches(&self, kind: MediaKind) -> bool {
        match self {
            MediaSelection::Hd => kind == MediaKind::HdVideo,
            MediaSelection::Watermarked => kind == MediaKind::WatermarkedVideo,
            MediaSelection::Audio => kind == MediaKind::Audio,
            MediaSelection::Cover => kind == MediaKind::Cover,
            MediaSelection::Images => kind == MediaKind::Image,
            MediaSelection::All => true,
        }
    }
}

pub fn select_links(record: &VideoRecord, selection: MediaSelection) -> Vec<MediaLink> {
    download_links(record)
        .into_iter()
        .filter(|link| selection.matches(link.kind))
        .collect()
}

/// Post ids become file name prefixes, so only `[A-Za-z0-9_-]` is accepted.
fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

async fn discard_partial(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        if err.kind() != ErrorKind::NotFound {
            warn!(target: "download", path = %path.display(), error = %err, "failed to remove partial file");
        }
    }
}

pub struct MediaDownloader {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for MediaDownloader {
    fn default() -> Self {
        Self::new(
            reqwest::Client::new(),
            Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECONDS),
        )
    }
}

impl MediaDownloader {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn from_config(section: &DownloadSection) -> Self {
        Self::new(reqwest::Client::new(), section.timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn save_selection(
        &self,
        record: &VideoRecord,
        selection: MediaSelection,
        dir: &Path,
    ) -> DownloadResult<Vec<DownloadedFile>> {
        if !is_safe_file_stem(&record.id) {
            return Err(DownloadError::UnsafeId(record.id.clone()));
        }
        let links = select_links(record, selection);
        if links.is_empty() {
            return Err(DownloadError::Unavailable(selection.as_str()));
        }
        let mut saved = Vec::with_capacity(links.len());
        for link in links {
            let path = dir.join(link.file_name(&record.id));
            let bytes = self.save_one(&link.url, &path).await?;
            info!(target: "download", kind = link.kind.as_str(), path = %path.display(), bytes, "saved media");
            saved.push(DownloadedFile {
                kind: link.kind,
                url: link.url,
                path,
                bytes,
            });
        }
        Ok(saved)
    }

    /// Streams into `<path>.part` and renames on success. The partial file is
    /// removed on any failure, including the deadline.
    async fn save_one(&self, url: &str, path: &Path) -> DownloadResult<u64> {
        let part = partial_path(path);
        let outcome = match timeout(self.timeout, self.fetch_to_file(url, &part)).await {
            Ok(result) => result,
            Err(_) => Err(DownloadError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            }),
        };
        let written = match outcome {
            Ok(written) => written,
            Err(err) => {
                discard_partial(&part).await;
                return Err(err);
            }
        };
        if let Err(source) = fs::rename(&part, path).await {
            discard_partial(&part).await;
            return Err(DownloadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(written)
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> DownloadResult<u64> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| DownloadError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        debug!(target: "download", url, "streaming media");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let mut stream = response.bytes_stream();
        let mut file = fs::File::create(path)
            .await
            .map_err(|source| DownloadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let data = chunk?;
            file.write_all(&data)
                .await
                .map_err(|source| DownloadError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            written += data.len() as u64;
        }
        file.flush().await.map_err(|source| DownloadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(written)
    }
}
