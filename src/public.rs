//! Downloading files that are reachable over plain HTTP(S), no bucket needed.

use std::path::Path;

use reqwest::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

/// Size of the pieces [`download_public_file`] writes by default.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PublicDownloadError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Download `url` to `save_path` with a default HTTP client.
///
/// See [`download_public_file_with`].
pub async fn download_public_file(
    url: &str,
    save_path: impl AsRef<Path>,
    chunk_size: usize,
) -> Result<(), PublicDownloadError> {
    download_public_file_with(&reqwest::Client::new(), url, save_path, chunk_size).await
}

/// Stream `url` into `save_path`, writing at most `chunk_size` bytes at a
/// time.
///
/// Only a `200 OK` response is written, truncating any existing file. Every
/// other status leaves `save_path` untouched and is reported as a warning,
/// not as an error.
pub async fn download_public_file_with(
    client: &reqwest::Client,
    url: &str,
    save_path: impl AsRef<Path>,
    chunk_size: usize,
) -> Result<(), PublicDownloadError> {
    if chunk_size == 0 {
        return Err(PublicDownloadError::InvalidChunkSize);
    }
    let mut response = client.get(url).send().await?;
    if response.status() != StatusCode::OK {
        warn!(
            "Did not download {url}. Response code was {}",
            response.status().as_u16()
        );
        return Ok(());
    }

    let mut file = tokio::fs::File::create(save_path.as_ref()).await?;
    while let Some(chunk) = response.chunk().await? {
        write_in_pieces(&mut file, &chunk, chunk_size).await?;
    }
    file.flush().await?;
    Ok(())
}

/// Write `chunk` with one `write_all` per `chunk_size` slice.
async fn write_in_pieces<W>(writer: &mut W, chunk: &[u8], chunk_size: usize) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for piece in chunk.chunks(chunk_size) {
        writer.write_all(piece).await?;
    }
    Ok(())
}
