use std::fmt;

use serde_json::Value;

use crate::error::AuthError;

pub const TOKEN_URL: &str =
    "https://identity.dataspace.copernicus.eu/auth/realms/CDSE/protocol/openid-connect/token";

/// Public client id of the CDSE password grant.
pub const CLIENT_ID: &str = "cdse-public";

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token returned by the identity provider. Opaque; treated as valid
/// for the lifetime of one run, never refreshed mid-run.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn secret(&self) -> &str {
        &self.0
    }
}

/// Exchanges credentials for an access token. One round-trip, no retry; a
/// failed login is reported immediately since repeated bad-credential
/// attempts can trigger account lockouts.
pub async fn authenticate(
    http: &reqwest::Client,
    credentials: &Credentials,
) -> Result<AccessToken, AuthError> {
    log::info!(
        "authenticating to the Copernicus Data Space as {}",
        credentials.username
    );
    let params = [
        ("client_id", CLIENT_ID),
        ("grant_type", "password"),
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
    ];
    let response = http.post(TOKEN_URL).form(&params).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::Status(status));
    }
    let body: Value = response.json().await?;
    let token = token_from_body(&body)?;
    log::info!("authentication successful");
    Ok(token)
}

fn token_from_body(body: &Value) -> Result<AccessToken, AuthError> {
    body.get("access_token")
        .and_then(Value::as_str)
        .map(|token| AccessToken(token.to_owned()))
        .ok_or(AuthError::MissingToken)
}
