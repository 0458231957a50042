//! The object-store seam [`Bucket`](super::bucket::Bucket) is written against,
//! and its implementation for the AWS SDK client.

use std::{error::Error, future::Future, io, iter, path::Path};

use async_trait::async_trait;
use aws_credential_types::provider::error::CredentialsError;
use aws_sdk_s3::{
    error::{ProvideErrorMetadata, SdkError},
    operation::put_object::PutObjectOutput,
    primitives::ByteStream,
    types::ObjectCannedAcl,
};
use tokio::io::{AsyncRead, AsyncWriteExt};

use super::object::ObjectOperationError;

/// Service error codes S3 and STS answer with when a session token is no
/// longer usable.
const EXPIRED_TOKEN_CODES: &[&str] = &[
    "ExpiredToken",
    "ExpiredTokenException",
    "InvalidToken",
    "TokenRefreshRequired",
];

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whatever the backend answers an upload with.
    type UploadOutput: Send;

    /// All keys under `prefix`, in backend order.
    async fn list_keys(
        &self,
        bucket_name: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<String>, ObjectOperationError>;

    async fn content_length(&self, bucket_name: &str, key: &str)
        -> Result<u64, ObjectOperationError>;

    /// Write the whole object to `target`, creating or truncating it.
    async fn download(
        &self,
        bucket_name: &str,
        key: &str,
        target: &Path,
    ) -> Result<(), ObjectOperationError>;

    async fn upload(
        &self,
        bucket_name: &str,
        key: &str,
        source: &Path,
        acl: &str,
    ) -> Result<Self::UploadOutput, ObjectOperationError>;
}

#[async_trait]
impl ObjectStore for aws_sdk_s3::Client {
    type UploadOutput = PutObjectOutput;

    async fn list_keys(
        &self,
        bucket_name: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<String>, ObjectOperationError> {
        let prefix = prefix.filter(|p| !p.is_empty()).map(str::to_owned);
        collect_pages(|continuation_token| {
            let request = self
                .list_objects_v2()
                .bucket(bucket_name)
                .set_prefix(prefix.clone())
                .set_continuation_token(continuation_token);
            async move {
                let response = request.send().await.map_err(classify)?;
                let keys = response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_owned))
                    .collect();
                let next_token = response
                    .next_continuation_token()
                    .filter(|_| response.is_truncated().unwrap_or(false))
                    .map(str::to_owned);
                Ok(ListPage { keys, next_token })
            }
        })
        .await
    }

    async fn content_length(
        &self,
        bucket_name: &str,
        key: &str,
    ) -> Result<u64, ObjectOperationError> {
        let response = self
            .head_object()
            .bucket(bucket_name)
            .key(key)
            .send()
            .await
            .map_err(classify)?;
        let length = response.content_length().ok_or_else(|| {
            ObjectOperationError::other("object content length is missing", bucket_name, key)
        })?;
        u64::try_from(length).map_err(|_| {
            ObjectOperationError::other("object content length is negative", bucket_name, key)
        })
    }

    async fn download(
        &self,
        bucket_name: &str,
        key: &str,
        target: &Path,
    ) -> Result<(), ObjectOperationError> {
        let response = self
            .get_object()
            .bucket(bucket_name)
            .key(key)
            .send()
            .await
            .map_err(classify)?;
        let mut reader = response.body.into_async_read();
        write_via_partial(&mut reader, target).await?;
        Ok(())
    }

    /// Errors are returned as the SDK reports them, without credential
    /// classification: an expired token surfaces as
    /// [`ObjectOperationError::PutObject`].
    async fn upload(
        &self,
        bucket_name: &str,
        key: &str,
        source: &Path,
        acl: &str,
    ) -> Result<PutObjectOutput, ObjectOperationError> {
        let body = ByteStream::from_path(source).await?;
        let output = self
            .put_object()
            .bucket(bucket_name)
            .key(key)
            .acl(ObjectCannedAcl::from(acl))
            .body(body)
            .send()
            .await?;
        Ok(output)
    }
}

/// One page of a key listing and the token of the page after it.
struct ListPage {
    keys: Vec<String>,
    next_token: Option<String>,
}

/// Request pages until one comes back without a continuation token.
async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<String>, ObjectOperationError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListPage, ObjectOperationError>>,
{
    let mut keys = Vec::new();
    let mut continuation_token = None;
    loop {
        let page = fetch_page(continuation_token.take()).await?;
        keys.extend(page.keys);
        match page.next_token {
            Some(token) => continuation_token = Some(token),
            None => break,
        }
    }
    Ok(keys)
}

/// Copy `reader` into `<target>.part` and rename it to `target` once complete.
/// On failure the partial file is removed, so `target` only ever holds a
/// whole object.
async fn write_via_partial<R>(reader: &mut R, target: &Path) -> io::Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut partial = target.as_os_str().to_owned();
    partial.push(".part");

    let result = async {
        let mut file = tokio::fs::File::create(&partial).await?;
        tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&partial, target).await
    }
    .await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    result
}

/// Map an SDK error to [`ObjectOperationError::Unauthorized`] when it stems
/// from missing or expired credentials, and to its typed variant otherwise.
pub(crate) fn classify<E>(err: SdkError<E>) -> ObjectOperationError
where
    E: ProvideErrorMetadata + Error + Send + Sync + 'static,
    ObjectOperationError: From<SdkError<E>>,
{
    if is_unauthorized(&err) {
        ObjectOperationError::Unauthorized(Box::new(err))
    } else {
        err.into()
    }
}

/// Expired/invalid token codes from the service, or credentials that could not
/// be loaded or were refused by their provider. Provider timeouts and broken
/// configuration are not authorization failures.
fn is_unauthorized<E>(err: &SdkError<E>) -> bool
where
    E: ProvideErrorMetadata + Error + 'static,
{
    if err
        .code()
        .is_some_and(|code| EXPIRED_TOKEN_CODES.contains(&code))
    {
        return true;
    }
    iter::successors(Some(err as &(dyn Error + 'static)), |&e| e.source()).any(|e| {
        matches!(
            e.downcast_ref::<CredentialsError>(),
            Some(CredentialsError::CredentialsNotLoaded(_) | CredentialsError::ProviderError(_))
        )
    })
}
