use std::time::Duration;

use tracing::info;

use super::api::OktaApi;
use super::{FederationClient, OktaCreds, OktaError, SessionCookie};
use crate::aws::{Credentials, sts};

/// OIDC federation client for an Okta application
///
/// Performs a full login on every call; the OIDC flow does not
/// participate in session cookie caching.
#[derive(Debug)]
pub struct OidcClient {
    creds: OktaCreds,
    app_id: String,
    api: OktaApi,
}

impl OidcClient {
    pub fn new(creds: OktaCreds, app_id: &str) -> Result<Self, OktaError> {
        if app_id.is_empty() {
            return Err(OktaError::Config(
                "OIDC application id must not be empty".to_string(),
            ));
        }

        let api = OktaApi::new(&creds.organization)?;

        Ok(Self {
            creds,
            app_id: app_id.to_string(),
            api,
        })
    }
}

impl FederationClient for OidcClient {
    async fn authenticate_user(&self) -> Result<(), OktaError> {
        self.api
            .authenticate(&self.creds.username, &self.creds.password)
            .await?;
        Ok(())
    }

    async fn authenticate_profile(
        &self,
        profile_arn: &str,
        duration: Duration,
    ) -> Result<(Credentials, Option<SessionCookie>), OktaError> {
        let token = self
            .api
            .authenticate(&self.creds.username, &self.creds.password)
            .await?;
        let id_token = self.api.authorize_id_token(&self.app_id, &token).await?;

        info!("Assuming {} via OIDC federation", profile_arn);

        let credentials = sts::assume_role_with_web_identity(
            profile_arn,
            &self.creds.username,
            &id_token,
            duration.as_secs() as i32,
        )
        .await
        .map_err(|e| OktaError::Sts(format!("{e:#}")))?;

        Ok((credentials, None))
    }
}
