//! Convenience wrapper around the AWS S3 SDK for working with a single bucket.
//!
//! ```no_run
//! # async fn run() -> Result<(), s3_bucket::ObjectOperationError> {
//! let bucket = s3_bucket::default_bucket_factory("dev", "my-bucket").await;
//! if let Some(keys) = bucket.simple_list("reports/", Some("draft")).await? {
//!     for key in keys {
//!         println!("{key}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Listing and downloading swallow expired/missing credential errors: they are
//! logged and the operation yields `Ok(None)`. Uploads propagate every error.
//! See [`blocking`] for a synchronous facade.

pub mod blocking;
pub mod public;
pub mod resources;

pub use public::{
    download_public_file, download_public_file_with, PublicDownloadError, DEFAULT_CHUNK_SIZE,
};
pub use resources::bucket::{Bucket, DEFAULT_ACL, DEFAULT_DOWNLOAD_DIR_PREFIX};
pub use resources::object::{ObjectOperationError, ObjectRecord};
pub use resources::s3::{SessionConfig, S3};
pub use resources::store::ObjectStore;

/// Build a [`Bucket`] from the named credential profile.
pub async fn default_bucket_factory(profile: &str, bucket_name: impl Into<String>) -> Bucket {
    S3::from_profile(profile).await.bucket(bucket_name)
}
