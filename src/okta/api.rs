use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::{Client, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::{OktaError, SessionCookie};
use crate::constants::OKTA_SERVER;

/// Timeout for each HTTP round-trip to Okta
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Low-level client for the Okta organization API
#[derive(Debug, Clone)]
pub struct OktaApi {
    client: Client,
    base_url: Url,
}

impl OktaApi {
    /// Create a client for `https://<organization>.okta.com`
    pub fn new(organization: &str) -> Result<Self, OktaError> {
        if organization.is_empty() {
            return Err(OktaError::Config(
                "Okta organization must not be empty".to_string(),
            ));
        }

        let base_url = Url::parse(&format!("https://{organization}.{OKTA_SERVER}"))
            .map_err(|e| OktaError::Config(format!("invalid Okta organization: {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Primary authentication: exchange username/password for a one-time session token
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, OktaError> {
        let url = self.endpoint("/api/v1/authn")?;
        debug!("Authenticating user {} with Okta", username);

        let response = self
            .client
            .post(url)
            .json(&AuthnRequest { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let authn: AuthnResponse = response.json().await?;
        match authn.status.as_str() {
            "SUCCESS" => authn
                .session_token
                .ok_or(OktaError::MissingArtifact("session token")),
            "MFA_REQUIRED" | "MFA_ENROLL" => Err(OktaError::MfaRequired),
            "LOCKED_OUT" => Err(OktaError::LoginRejected("account is locked out".to_string())),
            "PASSWORD_EXPIRED" => {
                Err(OktaError::LoginRejected("password has expired".to_string()))
            }
            other => Err(OktaError::LoginRejected(format!(
                "unexpected authentication status {other}"
            ))),
        }
    }

    /// Trade a one-time session token for a reusable session cookie
    pub async fn create_session(&self, session_token: &str) -> Result<SessionCookie, OktaError> {
        let url = self.endpoint("/api/v1/sessions")?;
        debug!("Creating Okta session");

        let response = self
            .client
            .post(url)
            .json(&SessionRequest { session_token })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let session: SessionResponse = response.json().await?;
        Ok(SessionCookie::new(session.id))
    }

    /// Fetch an application page with the session cookie attached
    pub async fn fetch_app_page(
        &self,
        app_url: &Url,
        session: &SessionCookie,
    ) -> Result<String, OktaError> {
        debug!("Fetching application page from Okta");

        let response = self
            .client
            .get(app_url.clone())
            .header(header::COOKIE, format!("sid={}", session.value()))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    /// Request an OIDC identity token for the application, bootstrapped
    /// from a primary-authentication session token
    pub async fn authorize_id_token(
        &self,
        app_id: &str,
        session_token: &str,
    ) -> Result<String, OktaError> {
        let url = self.endpoint("/oauth2/v1/authorize")?;
        debug!("Requesting OIDC identity token for app {}", app_id);

        let state = Uuid::new_v4().to_string();
        let nonce = Uuid::new_v4().to_string();

        let response = self
            .client
            .get(url)
            .query(&[
                ("client_id", app_id),
                ("redirect_uri", self.base_url.as_str()),
                ("response_type", "id_token"),
                ("response_mode", "okta_post_message"),
                ("scope", "openid"),
                ("state", state.as_str()),
                ("nonce", nonce.as_str()),
                ("sessionToken", session_token),
            ])
            .send()
            .await?
            .error_for_status()?;

        let html = response.text().await?;
        extract_id_token(&html)
    }

    fn endpoint(&self, path: &str) -> Result<Url, OktaError> {
        self.base_url
            .join(path)
            .map_err(|e| OktaError::Config(format!("invalid Okta endpoint {path}: {e}")))
    }
}

/// Turn a non-success Okta response into a login rejection, preferring
/// the API's own error summary when the body carries one
async fn rejection(response: Response) -> OktaError {
    let status = response.status();
    match response.json::<ApiError>().await {
        Ok(err) => OktaError::LoginRejected(err.error_summary),
        Err(_) if status == StatusCode::UNAUTHORIZED => {
            OktaError::LoginRejected("invalid username or password".to_string())
        }
        Err(_) => OktaError::LoginRejected(format!("Okta returned HTTP {status}")),
    }
}

/// Extract the Base64 SAML response from an application page
pub fn extract_saml_response(html: &str) -> Result<String, OktaError> {
    let captures = saml_response_regex()
        .captures(html)
        .ok_or(OktaError::MissingArtifact("SAMLResponse"))?;
    let raw = captures
        .get(1)
        .ok_or(OktaError::MissingArtifact("SAMLResponse"))?;
    Ok(unescape_html(raw.as_str()))
}

/// Extract the OIDC identity token from an `okta_post_message` page
pub fn extract_id_token(html: &str) -> Result<String, OktaError> {
    let captures = id_token_regex()
        .captures(html)
        .ok_or(OktaError::MissingArtifact("id_token"))?;
    let token = captures
        .get(1)
        .ok_or(OktaError::MissingArtifact("id_token"))?;
    Ok(token.as_str().to_string())
}

fn saml_response_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"name="SAMLResponse"[^>]+value="([^"]+)""#).expect("valid pattern")
    })
}

fn id_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"id_token['"]?\s*[:=]\s*['"]([\w.-]+)['"]"#).expect("valid pattern")
    })
}

/// Decode the HTML entities Okta uses when embedding Base64 in form values
fn unescape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        match rest.find(';') {
            Some(end) if end > 1 && end <= 10 => {
                let entity = &rest[1..end];
                let decoded = match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    _ => decode_numeric_entity(entity),
                };
                match decoded {
                    Some(c) => {
                        out.push(c);
                        rest = &rest[end + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()?
    } else {
        return None;
    };
    char::from_u32(code)
}

#[derive(Debug, Serialize)]
struct AuthnRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthnResponse {
    status: String,
    session_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest<'a> {
    session_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    error_summary: String,
}
