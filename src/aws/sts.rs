use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::{Client as StsClient, config::Config as StsConfig};
use tracing::{debug, info};

use super::Credentials;
use crate::constants::DEFAULT_AWS_REGION;

/// STS configuration without a credential chain (federation calls are unsigned)
fn sts_config() -> StsConfig {
    StsConfig::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(DEFAULT_AWS_REGION))
        .build()
}

/// Assume role using a SAML assertion
pub async fn assume_role_with_saml(
    role_arn: &str,
    principal_arn: &str,
    saml_assertion: &str,
    duration_seconds: i32,
) -> Result<Credentials> {
    info!("Calling AWS STS AssumeRoleWithSAML");
    debug!("Role ARN: {}", role_arn);
    debug!("Principal ARN: {}", principal_arn);
    debug!("Duration: {} seconds", duration_seconds);

    let client = StsClient::from_conf(sts_config());

    let response = client
        .assume_role_with_saml()
        .role_arn(role_arn)
        .principal_arn(principal_arn)
        .saml_assertion(saml_assertion)
        .duration_seconds(duration_seconds)
        .send()
        .await
        .context("Failed to assume role with SAML")?;

    let credentials = convert_credentials(response.credentials())?;

    info!("Successfully obtained AWS credentials");
    Ok(credentials)
}

/// Assume role using an OIDC identity token
pub async fn assume_role_with_web_identity(
    role_arn: &str,
    role_session_name: &str,
    web_identity_token: &str,
    duration_seconds: i32,
) -> Result<Credentials> {
    info!("Calling AWS STS AssumeRoleWithWebIdentity");
    debug!("Role ARN: {}", role_arn);
    debug!("Session name: {}", role_session_name);
    debug!("Duration: {} seconds", duration_seconds);

    let client = StsClient::from_conf(sts_config());

    let response = client
        .assume_role_with_web_identity()
        .role_arn(role_arn)
        .role_session_name(role_session_name)
        .web_identity_token(web_identity_token)
        .duration_seconds(duration_seconds)
        .send()
        .await
        .context("Failed to assume role with web identity")?;

    let credentials = convert_credentials(response.credentials())?;

    info!("Successfully obtained AWS credentials");
    Ok(credentials)
}

fn convert_credentials(sts_creds: Option<&aws_sdk_sts::types::Credentials>) -> Result<Credentials> {
    let sts_creds = sts_creds.context("AWS STS returned no credentials")?;

    Ok(Credentials {
        access_key_id: sts_creds.access_key_id().to_string(),
        secret_access_key: sts_creds.secret_access_key().to_string(),
        session_token: sts_creds.session_token().to_string(),
        expiration: *sts_creds.expiration(),
    })
}
