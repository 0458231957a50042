//! In-memory [`ObjectStore`] for exercising bucket behavior without a network.

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use aws_sdk_s3::{error::SdkError, operation::put_object::PutObjectError};
use aws_smithy_runtime_api::http::{Response, StatusCode};
use aws_smithy_types::{body::SdkBody, error::ErrorMetadata};

use super::{object::ObjectOperationError, store::ObjectStore};

/// A service error as the SDK hands it back for a response with `status`.
pub(crate) fn service_error<E>(err: E, status: u16) -> SdkError<E> {
    let raw = Response::new(
        StatusCode::try_from(status).expect("valid status code"),
        SdkBody::empty(),
    );
    SdkError::service_error(err, raw)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredUpload {
    pub key: String,
    pub acl: String,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    objects: BTreeMap<String, Vec<u8>>,
    unauthorized: bool,
    downloads: AtomicUsize,
    head_requests: AtomicUsize,
    uploads: Mutex<Vec<StoredUpload>>,
}

impl MemoryStore {
    pub fn with_objects<'a>(objects: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        Self {
            objects: objects
                .into_iter()
                .map(|(key, size)| (key.to_string(), vec![b'x'; size]))
                .collect(),
            ..Default::default()
        }
    }

    /// A store whose every call fails as if the session token had expired.
    /// Reads fail with the classified error, uploads with the raw SDK error,
    /// matching what the S3 client returns for each.
    pub fn unauthorized() -> Self {
        Self {
            unauthorized: true,
            ..Default::default()
        }
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn head_requests(&self) -> usize {
        self.head_requests.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<StoredUpload> {
        self.uploads.lock().unwrap().clone()
    }

    fn check_auth(&self) -> Result<(), ObjectOperationError> {
        if self.unauthorized {
            Err(ObjectOperationError::Unauthorized(
                "the SSO session associated with this profile has expired".into(),
            ))
        } else {
            Ok(())
        }
    }

    fn object(&self, bucket_name: &str, key: &str) -> Result<&Vec<u8>, ObjectOperationError> {
        self.objects
            .get(key)
            .ok_or_else(|| ObjectOperationError::other("no such key", bucket_name, key))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    type UploadOutput = String;

    async fn list_keys(
        &self,
        _bucket_name: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<String>, ObjectOperationError> {
        self.check_auth()?;
        let prefix = prefix.unwrap_or_default();
        Ok(self
            .objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn content_length(
        &self,
        bucket_name: &str,
        key: &str,
    ) -> Result<u64, ObjectOperationError> {
        self.check_auth()?;
        self.head_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.object(bucket_name, key)?.len() as u64)
    }

    async fn download(
        &self,
        bucket_name: &str,
        key: &str,
        target: &Path,
    ) -> Result<(), ObjectOperationError> {
        self.check_auth()?;
        let body = self.object(bucket_name, key)?;
        self.downloads.fetch_add(1, Ordering::SeqCst);
        tokio::fs::write(target, body).await?;
        Ok(())
    }

    async fn upload(
        &self,
        _bucket_name: &str,
        key: &str,
        source: &Path,
        acl: &str,
    ) -> Result<String, ObjectOperationError> {
        if self.unauthorized {
            return Err(service_error(
                PutObjectError::generic(ErrorMetadata::builder().code("ExpiredToken").build()),
                400,
            )
            .into());
        }
        let body = tokio::fs::read(source).await?;
        self.uploads.lock().unwrap().push(StoredUpload {
            key: key.to_string(),
            acl: acl.to_string(),
            body,
        });
        Ok(format!("etag-{key}"))
    }
}
