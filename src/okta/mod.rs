pub mod api;
pub mod oidc;
pub mod saml;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aws::Credentials;

pub use oidc::OidcClient;
pub use saml::SamlClient;

/// Okta organization credentials as stored in the secret store
///
/// Field names stay PascalCase on the wire so blobs written by earlier
/// releases keep decoding.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OktaCreds {
    pub organization: String,
    pub username: String,
    pub password: String,
}

impl OktaCreds {
    /// Verify the credentials by performing only the Okta login handshake
    ///
    /// No AWS role is assumed and no session cookie is read or written.
    pub async fn validate(&self) -> Result<(), OktaError> {
        let client = SamlClient::for_user_authentication(self.clone())?;
        client.authenticate_user().await
    }
}

impl fmt::Debug for OktaCreds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OktaCreds")
            .field("organization", &self.organization)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Cached Okta session cookie (`sid`), opaque everywhere outside Okta
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie(String);

impl SessionCookie {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Decode a stored blob; empty or non-UTF-8 data yields `None`
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        String::from_utf8(data.to_vec())
            .ok()
            .filter(|value| !value.is_empty())
            .map(Self)
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCookie(<redacted>)")
    }
}

/// Errors raised during the Okta federation handshake
#[derive(Debug, Error)]
pub enum OktaError {
    /// Client construction or configuration problems
    #[error("invalid Okta client configuration: {0}")]
    Config(String),
    /// Transport-level failures talking to Okta
    #[error("HTTP request to Okta failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Okta rejected the username/password login
    #[error("Okta rejected the login: {0}")]
    LoginRejected(String),
    /// The org requires an MFA factor this tool does not implement
    #[error("Okta requires multi-factor authentication, which is not supported")]
    MfaRequired,
    /// Expected artifact missing from an Okta response
    #[error("failed to extract {0} from the Okta response")]
    MissingArtifact(&'static str),
    /// Could not interpret the SAML assertion
    #[error("SAML assertion error: {0}")]
    Assertion(String),
    /// STS refused the federation exchange
    #[error("AWS STS rejected the federation exchange: {0}")]
    Sts(String),
}

/// Federation handshake capability shared by the SAML and OIDC clients
#[allow(async_fn_in_trait)]
pub trait FederationClient {
    /// Perform the Okta login handshake without assuming any AWS role
    async fn authenticate_user(&self) -> Result<(), OktaError>;

    /// Authenticate and exchange the federation artifact for AWS credentials
    ///
    /// The SAML variant also returns the session cookie that is valid after
    /// the exchange; the OIDC variant never returns one.
    async fn authenticate_profile(
        &self,
        profile_arn: &str,
        duration: Duration,
    ) -> Result<(Credentials, Option<SessionCookie>), OktaError>;
}

/// Okta federation client using composition pattern
/// Each variant contains a protocol-specific struct with its own implementation
#[derive(Debug)]
pub enum OktaClient {
    Saml(SamlClient),
    Oidc(OidcClient),
}

impl FederationClient for OktaClient {
    async fn authenticate_user(&self) -> Result<(), OktaError> {
        match self {
            Self::Saml(client) => client.authenticate_user().await,
            Self::Oidc(client) => client.authenticate_user().await,
        }
    }

    async fn authenticate_profile(
        &self,
        profile_arn: &str,
        duration: Duration,
    ) -> Result<(Credentials, Option<SessionCookie>), OktaError> {
        match self {
            Self::Saml(client) => client.authenticate_profile(profile_arn, duration).await,
            Self::Oidc(client) => client.authenticate_profile(profile_arn, duration).await,
        }
    }
}
