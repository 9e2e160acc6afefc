//! Publishing guest logs to an object container

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guestlog_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info};

use crate::entry::GuestLog;

/// Object storage receiving published log segments
#[async_trait]
pub trait ContainerClient: Send + Sync {
    /// Name of the container logs are published to
    fn container_name(&self) -> &str;

    /// Send the log's pending bytes and return how many were stored.
    ///
    /// When some segments were stored before a failure the error is
    /// [`Error::PartialPublish`] carrying the acknowledged byte count.
    async fn publish(&self, log: &GuestLog) -> Result<u64>;

    /// Delete every published segment and the metafile of a log.
    /// Deleting components that are already gone succeeds.
    async fn delete_components(&self, log: &GuestLog) -> Result<()>;
}

/// Publish checkpoint stored next to a log's segments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metafile {
    pub log: String,
    pub published_size: u64,
    pub segments: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Container kept as a directory tree: `<root>/<container>/<prefix>/<segment>`
pub struct DirectoryContainer {
    root: PathBuf,
    container: String,
    segment_size: u64,
}

impl DirectoryContainer {
    pub fn new(root: impl Into<PathBuf>, container: impl Into<String>, segment_size: u64) -> Self {
        Self {
            root: root.into(),
            container: container.into(),
            segment_size: segment_size.max(1),
        }
    }

    fn container_dir(&self) -> PathBuf {
        self.root.join(&self.container)
    }

    /// Directory holding a log's segments
    pub fn segment_dir(&self, log: &GuestLog) -> PathBuf {
        self.container_dir().join(log.prefix())
    }

    pub fn metafile_path(&self, log: &GuestLog) -> PathBuf {
        self.container_dir().join(log.metafile())
    }

    /// Load a log's metafile, `None` if it was never published
    pub async fn read_metafile(&self, log: &GuestLog) -> Result<Option<Metafile>> {
        match tokio::fs::read(self.metafile_path(log)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_metafile(&self, log: &GuestLog, metafile: &Metafile) -> Result<()> {
        let path = self.metafile_path(log);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(metafile)?;
        tokio::fs::write(&path, json).await?;
        Ok(())
    }

    /// Copy pending bytes into segments, recording their names; returns the
    /// byte count, or the partial count alongside the error that stopped it
    async fn write_segments(
        &self,
        log: &GuestLog,
        segments: &mut Vec<String>,
    ) -> std::result::Result<u64, (u64, Error)> {
        let dir = self.segment_dir(log);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| (0u64, Error::from(e)))?;

        let mut file = tokio::fs::File::open(log.file())
            .await
            .map_err(|e| (0u64, Error::from(e)))?;
        file.seek(SeekFrom::Start(log.published_size()))
            .await
            .map_err(|e| (0u64, Error::from(e)))?;

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.6f").to_string();
        let mut remaining = log.pending();
        let mut sent = 0u64;
        let mut seq = 0u32;

        while remaining > 0 {
            let want = remaining.min(self.segment_size) as usize;
            let mut buffer = vec![0u8; want];
            let read = read_up_to(&mut file, &mut buffer)
                .await
                .map_err(|e| (sent, Error::from(e)))?;
            if read == 0 {
                break;
            }
            buffer.truncate(read);

            let name = format!("log-{}-{:04}", stamp, seq);
            tokio::fs::write(dir.join(&name), &buffer)
                .await
                .map_err(|e| (sent, Error::from(e)))?;

            debug!("Stored segment {}/{} ({} bytes)", log.prefix(), name, read);
            segments.push(name);
            sent += read as u64;
            remaining -= read as u64;
            seq += 1;
        }

        Ok(sent)
    }
}

/// Fill `buffer` from `file` until it is full or the file ends
async fn read_up_to(file: &mut tokio::fs::File, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

async fn remove_if_present(path: &Path, is_dir: bool) -> Result<()> {
    let result = if is_dir {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl ContainerClient for DirectoryContainer {
    fn container_name(&self) -> &str {
        &self.container
    }

    async fn publish(&self, log: &GuestLog) -> Result<u64> {
        let mut metafile = self.read_metafile(log).await?.unwrap_or_else(|| Metafile {
            log: log.name().to_string(),
            published_size: 0,
            segments: Vec::new(),
            updated_at: Utc::now(),
        });

        let outcome = self.write_segments(log, &mut metafile.segments).await;
        let sent = match &outcome {
            Ok(sent) => *sent,
            Err((sent, _)) => *sent,
        };

        metafile.published_size = log.published_size() + sent;
        metafile.updated_at = Utc::now();

        let partial = |reason: String| Error::PartialPublish {
            log: log.name().to_string(),
            sent,
            reason,
        };

        if sent > 0 {
            self.write_metafile(log, &metafile)
                .await
                .map_err(|e| partial(e.to_string()))?;
        }

        match outcome {
            Ok(sent) => {
                info!(
                    "Published {} bytes of log '{}' to container '{}'",
                    sent,
                    log.name(),
                    self.container
                );
                Ok(sent)
            }
            Err((0, e)) => Err(Error::container(format!(
                "Failed to publish log '{}': {}",
                log.name(),
                e
            ))),
            Err((_, e)) => Err(partial(e.to_string())),
        }
    }

    async fn delete_components(&self, log: &GuestLog) -> Result<()> {
        remove_if_present(&self.segment_dir(log), true).await?;
        remove_if_present(&self.metafile_path(log), false).await?;
        info!(
            "Deleted published components of log '{}' from container '{}'",
            log.name(),
            self.container
        );
        Ok(())
    }
}
