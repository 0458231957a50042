use std::{collections::HashMap, io};

use aws_sdk_s3::{
    error::SdkError,
    operation::{
        get_object::GetObjectError, head_object::HeadObjectError,
        list_objects_v2::ListObjectsV2Error, put_object::PutObjectError,
    },
    primitives::ByteStreamError,
};

/// A listed object together with its size in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ObjectOperationError {
    /// The backend rejected or could not resolve the session credentials.
    #[error("not authorized: {0}")]
    Unauthorized(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    ListObjects(#[from] SdkError<ListObjectsV2Error>),
    #[error(transparent)]
    HeadObject(#[from] SdkError<HeadObjectError>),
    #[error(transparent)]
    GetObject(#[from] SdkError<GetObjectError>),
    #[error(transparent)]
    PutObject(#[from] SdkError<PutObjectError>),
    #[error(transparent)]
    ByteStream(#[from] ByteStreamError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{msg}")]
    Other {
        msg: String,
        data: HashMap<String, String>,
    },
}

impl ObjectOperationError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    pub(crate) fn other(msg: impl Into<String>, bucket_name: &str, key: &str) -> Self {
        Self::Other {
            msg: msg.into(),
            data: HashMap::from([
                ("bucket_name".into(), bucket_name.to_string()),
                ("key".into(), key.to_string()),
            ]),
        }
    }
}
