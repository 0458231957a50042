use aws_config::{BehaviorVersion, Region};

use super::bucket::Bucket;

/// Optional overrides applied on top of the default AWS configuration chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Named profile from the shared config/credentials files.
    pub profile: Option<String>,
    pub region: Option<String>,
    /// Custom endpoint, for S3-compatible stores.
    pub endpoint: Option<String>,
    pub force_path_style: bool,
}

impl SessionConfig {
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set a custom endpoint. Path-style addressing is switched on as well,
    /// since most S3-compatible stores do not serve virtual-hosted buckets.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self.force_path_style = true;
        self
    }
}

/// An S3 session: the SDK client every [`Bucket`] is bound to.
pub struct S3 {
    client: aws_sdk_s3::Client,
}

impl S3 {
    /// Create an `S3` resource with the AWS configuration loaded from the
    /// environment.
    pub async fn default() -> Self {
        Self::from_config(&SessionConfig::default()).await
    }

    /// Create an `S3` resource from a named credential profile.
    pub async fn from_profile(profile: &str) -> Self {
        Self::from_config(&SessionConfig::default().with_profile(profile)).await
    }

    /// Create an `S3` resource from the default configuration chain with
    /// `config` layered on top.
    pub async fn from_config(config: &SessionConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let aws_sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&aws_sdk_config)
            .force_path_style(config.force_path_style)
            .build();
        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
        }
    }

    /// Create an `S3` resource with the provided AWS `config`.
    pub fn with_aws_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
        }
    }

    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }

    pub fn bucket(&self, name: impl Into<String>) -> Bucket {
        Bucket::new(self.client.clone(), name)
    }
}
