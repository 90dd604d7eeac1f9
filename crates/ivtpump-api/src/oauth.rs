// SingleKey ID OAuth2 endpoints
//
// PKCE authorization URL construction, callback parsing, and the two
// token grants (`authorization_code` for first login, `refresh_token` for
// renewal). Both grants go through `request_token` so they share status
// handling and response parsing.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{TimeDelta, Utc};
use secrecy::SecretString;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error};
use url::Url;

use crate::credential::{Credential, DEFAULT_EXPIRES_IN_SECS};
use crate::error::Error;

pub const TOKEN_URL: &str = "https://singlekey-id.com/auth/connect/token";
pub const LOGIN_URL: &str = "https://singlekey-id.com/auth/en-us/login";
pub const AUTHORIZE_CALLBACK_PATH: &str = "/auth/connect/authorize/callback";
pub const CLIENT_ID: &str = "762162C0-FA2D-4540-AE66-6489F189FADC";
pub const REDIRECT_URI: &str = "com.bosch.tt.dashtt.pointt://app/login";
pub const CODE_VERIFIER: &str = "abcdefghijklmnopqrstuvwxyz0123456789abcdefghijklm";
pub const SCOPES: &[&str] = &[
    "openid",
    "email",
    "profile",
    "offline_access",
    "pointt.gateway.claiming",
    "pointt.gateway.removal",
    "pointt.gateway.list",
    "pointt.gateway.users",
    "pointt.gateway.resource.dashapp",
    "pointt.castt.flow.token-exchange",
    "bacon",
];

/// OAuth2 client registration and endpoints.
///
/// The defaults are the mobile app's public client registration; tests
/// override `token_url` to point at a mock server.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub token_url: Url,
    pub login_url: Url,
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// PKCE verifier. Must be identical when building the authorization URL
    /// and when exchanging the resulting code.
    pub code_verifier: String,
}

impl OAuthConfig {
    /// Default registration with a different token endpoint.
    pub fn with_token_url(token_url: Url) -> Self {
        Self {
            token_url,
            ..Self::default()
        }
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            token_url: Url::parse(TOKEN_URL).expect("valid token URL constant"),
            login_url: Url::parse(LOGIN_URL).expect("valid login URL constant"),
            client_id: CLIENT_ID.to_owned(),
            redirect_uri: REDIRECT_URI.to_owned(),
            scopes: SCOPES.iter().map(|s| (*s).to_owned()).collect(),
            code_verifier: CODE_VERIFIER.to_owned(),
        }
    }
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

// ── PKCE ─────────────────────────────────────────────────────────────

/// `S256` code challenge: base64url (no padding) of SHA-256(verifier).
pub fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Build the browser login URL.
///
/// The login page takes a `ReturnUrl` pointing at the authorize callback,
/// which in turn carries the actual OAuth2 authorize parameters.
pub fn authorization_url(oauth: &OAuthConfig) -> Url {
    let state = uuid::Uuid::new_v4().simple().to_string();
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let challenge = code_challenge(&oauth.code_verifier);
    let scope = oauth.scopes.join(" ");

    let authorize_query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect_uri", &oauth.redirect_uri)
        .append_pair("client_id", &oauth.client_id)
        .append_pair("response_type", "code")
        .append_pair("prompt", "login")
        .append_pair("state", &state)
        .append_pair("nonce", &nonce)
        .append_pair("scope", &scope)
        .append_pair("code_challenge", &challenge)
        .append_pair("code_challenge_method", "S256")
        .append_pair("style_id", "tt_bsch")
        .append_pair("suppressed_prompt", "login")
        .finish();

    let mut url = oauth.login_url.clone();
    url.query_pairs_mut().append_pair(
        "ReturnUrl",
        &format!("{AUTHORIZE_CALLBACK_PATH}?{authorize_query}"),
    );
    url
}

/// Extract the authorization code from the redirect URL the browser
/// landed on after login.
pub fn extract_code(callback_url: &str) -> Option<String> {
    let url = Url::parse(callback_url.trim()).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.into_owned())
        .filter(|code| !code.is_empty())
}

// ── Token grants ─────────────────────────────────────────────────────

/// Exchange an authorization code for the initial credential.
pub async fn exchange_code(
    http: &reqwest::Client,
    oauth: &OAuthConfig,
    code: &str,
) -> Result<Credential, Error> {
    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", oauth.redirect_uri.as_str()),
        ("client_id", oauth.client_id.as_str()),
        ("code_verifier", oauth.code_verifier.as_str()),
    ];

    let resp = request_token(http, &oauth.token_url, &form).await?;
    let access_token = resp.access_token.ok_or_else(|| Error::Authentication {
        message: "token response carried no access_token".into(),
    })?;
    let expires_in = resp.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);

    debug!(expires_in, "authorization code exchanged");

    Ok(Credential::new(
        SecretString::from(access_token),
        resp.refresh_token.map(SecretString::from),
        Some(Utc::now() + TimeDelta::seconds(expires_in)),
    ))
}

/// POST a form to the token endpoint and parse the JSON response.
///
/// Any status other than 200 becomes [`Error::TokenRejected`]; transport
/// failures become [`Error::Connection`].
pub(crate) async fn request_token(
    http: &reqwest::Client,
    token_url: &Url,
    form: &[(&str, &str)],
) -> Result<TokenResponse, Error> {
    let grant = form
        .iter()
        .find(|(k, _)| *k == "grant_type")
        .map_or("", |(_, v)| *v);
    debug!(grant, "POST {}", token_url);

    let resp = http
        .post(token_url.clone())
        .form(form)
        .send()
        .await
        .map_err(Error::Connection)?;

    let status = resp.status();
    if status != reqwest::StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        error!(grant, status = status.as_u16(), "token request rejected");
        return Err(Error::TokenRejected {
            status: status.as_u16(),
            body: body.chars().take(300).collect(),
        });
    }

    let body = resp.text().await.map_err(Error::Connection)?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("invalid token response: {e}"),
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn code_challenge_matches_rfc7636_vector() {
        assert_eq!(
            code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn authorization_url_nests_authorize_params_in_return_url() {
        let oauth = OAuthConfig::default();
        let url = authorization_url(&oauth);

        assert!(url.as_str().starts_with(LOGIN_URL));
        let (_, return_url) = url.query_pairs().find(|(k, _)| k == "ReturnUrl").unwrap();
        assert!(return_url.starts_with("/auth/connect/authorize/callback?"));

        let inner = Url::parse(&format!("https://singlekey-id.com{return_url}")).unwrap();
        let get = |key: &str| {
            inner
                .query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        };
        assert_eq!(get("client_id").as_deref(), Some(CLIENT_ID));
        assert_eq!(get("redirect_uri").as_deref(), Some(REDIRECT_URI));
        assert_eq!(get("code_challenge_method").as_deref(), Some("S256"));
        assert_eq!(
            get("code_challenge").unwrap(),
            code_challenge(&oauth.code_verifier)
        );
        assert!(get("scope").unwrap().contains("offline_access"));
    }

    #[test]
    fn extract_code_from_app_redirect() {
        let code = extract_code("com.bosch.tt.dashtt.pointt://app/login?code=ABC123&state=xyz");
        assert_eq!(code.as_deref(), Some("ABC123"));
    }

    #[test]
    fn extract_code_missing_or_empty() {
        assert_eq!(extract_code("com.bosch.tt.dashtt.pointt://app/login?state=xyz"), None);
        assert_eq!(extract_code("com.bosch.tt.dashtt.pointt://app/login?code="), None);
        assert_eq!(extract_code("not a url"), None);
    }
}
