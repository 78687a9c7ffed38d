use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use super::api::{OktaApi, extract_saml_response};
use super::{FederationClient, OktaCreds, OktaError, SessionCookie};
use crate::aws::{Credentials, sts};
use crate::saml::SamlAssertion;

/// SAML federation client for an Okta AWS application
///
/// Holds the credentials, the application embed URL, and an optional
/// previously cached session cookie to try before a full login.
#[derive(Debug)]
pub struct SamlClient {
    creds: OktaCreds,
    app_url: Option<Url>,
    session: Option<SessionCookie>,
    api: OktaApi,
}

impl SamlClient {
    /// Create a client for the AWS application at `app_url`
    pub fn new(
        creds: OktaCreds,
        app_url: &str,
        session: Option<SessionCookie>,
    ) -> Result<Self, OktaError> {
        if app_url.is_empty() {
            return Err(OktaError::Config(
                "SAML application URL must not be empty".to_string(),
            ));
        }

        let app_url = Url::parse(app_url)
            .map_err(|e| OktaError::Config(format!("invalid SAML application URL: {e}")))?;
        let api = OktaApi::new(&creds.organization)?;

        Ok(Self {
            creds,
            app_url: Some(app_url),
            session,
            api,
        })
    }

    /// Create a client that can only verify the login handshake
    ///
    /// Credential validation needs no application URL and must leave any
    /// cached session untouched.
    pub fn for_user_authentication(creds: OktaCreds) -> Result<Self, OktaError> {
        let api = OktaApi::new(&creds.organization)?;

        Ok(Self {
            creds,
            app_url: None,
            session: None,
            api,
        })
    }

    /// Obtain a SAML assertion, preferring the cached session over a full login
    async fn obtain_assertion(
        &self,
        app_url: &Url,
    ) -> Result<(SamlAssertion, SessionCookie), OktaError> {
        if let Some(cookie) = &self.session {
            let html = self.api.fetch_app_page(app_url, cookie).await?;
            if let Ok(encoded) = extract_saml_response(&html) {
                debug!("Reusing cached Okta session");
                let assertion = parse_assertion(&encoded)?;
                return Ok((assertion, cookie.clone()));
            }
            debug!("Cached Okta session no longer valid, performing full login");
        }

        let token = self
            .api
            .authenticate(&self.creds.username, &self.creds.password)
            .await?;
        let cookie = self.api.create_session(&token).await?;
        let html = self.api.fetch_app_page(app_url, &cookie).await?;
        let encoded = extract_saml_response(&html)?;
        let assertion = parse_assertion(&encoded)?;

        Ok((assertion, cookie))
    }
}

impl FederationClient for SamlClient {
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
        let app_url = self.app_url.as_ref().ok_or_else(|| {
            OktaError::Config("SAML application URL is not configured".to_string())
        })?;

        let (assertion, cookie) = self.obtain_assertion(app_url).await?;

        let role = assertion
            .find_role(profile_arn)
            .map_err(|e| OktaError::Assertion(format!("{e:#}")))?;

        info!("Assuming {} via SAML federation", role.role_arn);

        let credentials = sts::assume_role_with_saml(
            &role.role_arn,
            &role.principal_arn,
            assertion.encoded(),
            duration.as_secs() as i32,
        )
        .await
        .map_err(|e| OktaError::Sts(format!("{e:#}")))?;

        Ok((credentials, Some(cookie)))
    }
}

fn parse_assertion(encoded: &str) -> Result<SamlAssertion, OktaError> {
    SamlAssertion::from_base64(encoded).map_err(|e| OktaError::Assertion(format!("{e:#}")))
}
