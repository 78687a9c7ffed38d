use anyhow::{Context, Result, bail};
use aws_smithy_types::date_time::Format;
use clap::Args;
use tracing::info;

use crate::{aws, config, provider::OktaProvider, store::KeyringStore};

#[derive(Debug, Clone, Args)]
pub struct AuthCommand {
    #[arg(short = 'd', long, help = "Session duration in hours (1-12)")]
    pub duration_hours: Option<u8>,
}

impl AuthCommand {
    pub async fn execute(self, profile: &str) -> Result<()> {
        info!("Starting authentication for profile: {}", profile);

        let config = config::load(profile).await.with_context(|| {
            format!(
                "Failed to load configuration for profile '{profile}'. Please run 'okaws configure' first."
            )
        })?;

        if config.role_arn.is_empty() {
            bail!("No IAM role ARN configured for profile '{profile}'. Please run 'okaws configure' first.");
        }

        let duration = config.session_duration(self.duration_hours)?;

        let provider = OktaProvider::new(
            KeyringStore::new(),
            &config.role_arn,
            duration,
            &config.okta_saml_url,
            Some(config.okta_oidc_app_id.clone()),
        );

        let (credentials, username) = provider.retrieve().await?;

        aws::credentials::save_credentials(profile, &credentials)
            .await
            .context("Failed to save AWS credentials")?;

        println!("\nAuthenticated as {username}.");
        println!("AWS credentials saved to {profile} profile.");
        println!(
            "Credentials will expire at: {}",
            credentials
                .expiration
                .fmt(Format::DateTime)
                .unwrap_or_else(|_| "unknown".to_string())
        );

        Ok(())
    }
}
