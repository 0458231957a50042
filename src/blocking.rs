//! Synchronous counterparts of the crate's async API.
//!
//! Each [`Bucket`] owns a current-thread tokio runtime and blocks on it for
//! every call. Do not use these from inside an async context.

use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::runtime::Runtime;

use crate::{
    public::PublicDownloadError,
    resources::{
        object::{ObjectOperationError, ObjectRecord},
        s3::S3,
        store::ObjectStore,
    },
};

fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Blocking wrapper around [`crate::Bucket`].
pub struct Bucket<C = aws_sdk_s3::Client> {
    inner: crate::Bucket<C>,
    runtime: Runtime,
}

impl<C: ObjectStore> Bucket<C> {
    pub fn new(inner: crate::Bucket<C>) -> io::Result<Self> {
        Ok(Self {
            inner,
            runtime: runtime()?,
        })
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// See [`crate::Bucket::simple_list`].
    pub fn simple_list(
        &self,
        prefix: &str,
        exclude: Option<&str>,
    ) -> Result<Option<Vec<String>>, ObjectOperationError> {
        self.runtime.block_on(self.inner.simple_list(prefix, exclude))
    }

    /// See [`crate::Bucket::list`].
    pub fn list(
        &self,
        prefix: Option<&str>,
        suffix: Option<&str>,
    ) -> Result<Option<Vec<ObjectRecord>>, ObjectOperationError> {
        self.runtime.block_on(self.inner.list(prefix, suffix))
    }

    /// See [`crate::Bucket::download_to_dir`].
    pub fn download_to_dir(
        &self,
        filename: &str,
        tmpdir: Option<&Path>,
    ) -> Result<Option<PathBuf>, ObjectOperationError> {
        self.runtime
            .block_on(self.inner.download_to_dir(filename, tmpdir))
    }

    pub fn upload(
        &self,
        upload_file: impl AsRef<Path>,
        key: &str,
    ) -> Result<C::UploadOutput, ObjectOperationError> {
        self.runtime.block_on(self.inner.upload(upload_file, key))
    }

    pub fn upload_with_acl(
        &self,
        upload_file: impl AsRef<Path>,
        key: &str,
        acl: &str,
    ) -> Result<C::UploadOutput, ObjectOperationError> {
        self.runtime
            .block_on(self.inner.upload_with_acl(upload_file, key, acl))
    }
}

/// Blocking [`crate::default_bucket_factory`].
pub fn default_bucket_factory(
    profile: &str,
    bucket_name: impl Into<String>,
) -> io::Result<Bucket> {
    let runtime = runtime()?;
    let s3 = runtime.block_on(S3::from_profile(profile));
    Ok(Bucket {
        inner: s3.bucket(bucket_name),
        runtime,
    })
}

/// Blocking [`crate::download_public_file`].
pub fn download_public_file(
    url: &str,
    save_path: impl AsRef<Path>,
    chunk_size: usize,
) -> Result<(), PublicDownloadError> {
    runtime()?.block_on(crate::download_public_file(url, save_path, chunk_size))
}

/// Blocking [`crate::download_public_file_with`].
pub fn download_public_file_with(
    client: &reqwest::Client,
    url: &str,
    save_path: impl AsRef<Path>,
    chunk_size: usize,
) -> Result<(), PublicDownloadError> {
    runtime()?.block_on(crate::download_public_file_with(
        client, url, save_path, chunk_size,
    ))
}
