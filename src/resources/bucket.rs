use std::path::{Path, PathBuf};

use tracing::{error, info, Span};

use super::{
    object::{ObjectOperationError, ObjectRecord},
    store::ObjectStore,
};

/// Canned ACL applied by [`Bucket::upload`].
pub const DEFAULT_ACL: &str = "public-read";

/// Name prefix of the directories [`Bucket::download_to_dir`] creates.
pub const DEFAULT_DOWNLOAD_DIR_PREFIX: &str = "s3download_";

const UNAUTHORIZED_HINT: &str = "You may want to run:  aws sso login --profile <profile name>";

/// A client bound to one bucket.
///
/// Listing and downloading answer `Ok(None)` when the backend reports missing
/// or expired credentials; the failure is logged at error level under the
/// bucket's span. Uploads propagate every error, credentials included.
pub struct Bucket<C = aws_sdk_s3::Client> {
    name: String,
    client: C,
    span: Span,
}

impl<C> Bucket<C> {
    pub fn new(client: C, name: impl Into<String>) -> Self {
        let name = name.into();
        let span = tracing::info_span!("bucket", name = %name);
        Self { name, client, span }
    }

    /// Replace the span the bucket logs under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn handle_unauthorized<T>(
        &self,
        result: Result<T, ObjectOperationError>,
    ) -> Result<Option<T>, ObjectOperationError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(ObjectOperationError::Unauthorized(err)) => {
                error!(parent: &self.span, "{err}");
                error!(parent: &self.span, "{UNAUTHORIZED_HINT}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

impl<C: ObjectStore> Bucket<C> {
    /// List the keys under `prefix`, dropping those that contain `exclude`.
    pub async fn simple_list(
        &self,
        prefix: &str,
        exclude: Option<&str>,
    ) -> Result<Option<Vec<String>>, ObjectOperationError> {
        let exclude = exclude.filter(|e| !e.is_empty());
        let result = self
            .client
            .list_keys(&self.name, Some(prefix))
            .await
            .map(|keys| {
                keys.into_iter()
                    .filter(|key| !exclude.is_some_and(|e| key.contains(e)))
                    .collect()
            });
        self.handle_unauthorized(result)
    }

    /// List the objects under `prefix` whose key ends with `suffix`, with
    /// their sizes.
    ///
    /// Sizes are resolved with one `HeadObject` request per matching key, so
    /// the call costs one extra round-trip for every record returned.
    pub async fn list(
        &self,
        prefix: Option<&str>,
        suffix: Option<&str>,
    ) -> Result<Option<Vec<ObjectRecord>>, ObjectOperationError> {
        let result = self.list_records(prefix, suffix).await;
        self.handle_unauthorized(result)
    }

    async fn list_records(
        &self,
        prefix: Option<&str>,
        suffix: Option<&str>,
    ) -> Result<Vec<ObjectRecord>, ObjectOperationError> {
        let suffix = suffix.filter(|s| !s.is_empty());
        let mut records = Vec::new();
        for key in self.client.list_keys(&self.name, prefix).await? {
            if suffix.is_some_and(|s| !key.ends_with(s)) {
                continue;
            }
            let size = self.client.content_length(&self.name, &key).await?;
            records.push(ObjectRecord { name: key, size });
        }
        Ok(records)
    }

    /// Download the object `filename` into `tmpdir`, or into a fresh
    /// `s3download_*` directory when none is given, and return the local path.
    ///
    /// The local file is named after the last path segment of the key. An
    /// existing file at that path is returned as is, without downloading.
    pub async fn download_to_dir(
        &self,
        filename: &str,
        tmpdir: Option<&Path>,
    ) -> Result<Option<PathBuf>, ObjectOperationError> {
        let result = self.fetch_to_dir(filename, tmpdir).await;
        self.handle_unauthorized(result)
    }

    async fn fetch_to_dir(
        &self,
        filename: &str,
        tmpdir: Option<&Path>,
    ) -> Result<PathBuf, ObjectOperationError> {
        let size = self.client.content_length(&self.name, filename).await?;

        let basename = Path::new(filename)
            .file_name()
            .filter(|_| !filename.ends_with('/'))
            .ok_or_else(|| {
                ObjectOperationError::other("object key has no file name", &self.name, filename)
            })?;
        let dir = match tmpdir.filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => tempfile::Builder::new()
                .prefix(DEFAULT_DOWNLOAD_DIR_PREFIX)
                .tempdir()?
                .keep(),
        };

        info!(parent: &self.span, "File {filename} size is {size}");
        let target = dir.join(basename);
        if target.exists() {
            info!(parent: &self.span, "File {} exists. skipping", target.display());
        } else {
            self.client.download(&self.name, filename, &target).await?;
        }
        Ok(target)
    }

    /// Upload the local file to `key` with the [`DEFAULT_ACL`].
    pub async fn upload(
        &self,
        upload_file: impl AsRef<Path>,
        key: &str,
    ) -> Result<C::UploadOutput, ObjectOperationError> {
        self.upload_with_acl(upload_file, key, DEFAULT_ACL).await
    }

    /// Upload the local file to `key` with the canned ACL `acl`, returning
    /// the backend's response.
    pub async fn upload_with_acl(
        &self,
        upload_file: impl AsRef<Path>,
        key: &str,
        acl: &str,
    ) -> Result<C::UploadOutput, ObjectOperationError> {
        self.client
            .upload(&self.name, key, upload_file.as_ref(), acl)
            .await
    }
}
