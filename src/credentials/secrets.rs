//! Secret storage access.

use async_trait::async_trait;
use aws_config::{meta::region::RegionProviderChain, BehaviorVersion, Region};
use aws_sdk_secretsmanager::error::DisplayErrorContext;

use crate::credentials::CredentialError;

const FALLBACK_REGION: &str = "us-east-1";

/// Fetches secret material by reference.
///
/// Returns the raw secret string; parsing is the caller's job.
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn fetch(&self, secret_id: &str) -> Result<String, CredentialError>;
}

/// [SecretSource] backed by AWS Secrets Manager.
///
/// The SDK client is built on first fetch, so deployments using direct
/// credentials never load AWS configuration. Region resolution: the
/// configured region, then the SDK default chain (`AWS_REGION`, profile,
/// IMDS), then `us-east-1`.
pub struct SecretsManagerSource {
    region: Option<String>,
}

impl SecretsManagerSource {
    pub fn new(region: Option<&str>) -> Self {
        Self {
            region: region.map(str::to_string),
        }
    }

    fn region_provider(&self) -> RegionProviderChain {
        RegionProviderChain::first_try(self.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::new(FALLBACK_REGION))
    }

    async fn client(&self) -> aws_sdk_secretsmanager::Client {
        let region_provider = self.region_provider();
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;
        aws_sdk_secretsmanager::Client::new(&config)
    }
}

#[async_trait]
impl SecretSource for SecretsManagerSource {
    async fn fetch(&self, secret_id: &str) -> Result<String, CredentialError> {
        tracing::debug!(secret_id = %secret_id, region = ?self.region, "Fetching database secret");
        let output = self
            .client()
            .await
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| CredentialError::SecretFetch(DisplayErrorContext(&e).to_string()))?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or(CredentialError::EmptySecret)
    }
}
