//! OAuth 2.0 "installed application" flow with a cached token file.
//!
//! Order of preference when an access token is needed:
//! 1. the cached token in `token.json`, if it has not expired,
//! 2. a refresh using the cached refresh token,
//! 3. interactive consent through a loopback redirect on `127.0.0.1`.
//!
//! Whatever token comes out of 2 or 3 is written back to `token.json`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{DeliveryError, Result};

pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

/// Tokens this close to expiry are treated as already expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// OAuth client registration, as downloaded from the Google Cloud Console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DeliveryError::MissingCredentials {
                path: path.to_path_buf(),
            });
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn parse(json: &str) -> Result<Self> {
        let file: ClientSecretsFile =
            serde_json::from_str(json).map_err(|e| DeliveryError::InvalidCredentials {
                what: "credentials file",
                reason: e.to_string(),
            })?;

        file.installed
            .or(file.web)
            .ok_or_else(|| DeliveryError::InvalidCredentials {
                what: "credentials file",
                reason: "expected an \"installed\" or \"web\" client".to_string(),
            })
    }
}

/// Token cached between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Kept so a refresh does not need the credentials file.
    pub token_uri: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl StoredToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => expires_at - Duration::seconds(EXPIRY_SKEW_SECS) > now,
            None => true,
        }
    }

    pub fn covers(&self, scopes: &[String]) -> bool {
        scopes.iter().all(|s| self.scopes.contains(s))
    }

    /// `Ok(None)` when no token has been cached yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let token = serde_json::from_str(&content).map_err(|e| {
            DeliveryError::InvalidCredentials {
                what: "token file",
                reason: e.to_string(),
            }
        })?;
        Ok(Some(token))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

impl TokenResponse {
    fn into_stored(
        self,
        previous_refresh: Option<String>,
        secrets: &ClientSecrets,
        requested: &[String],
        now: DateTime<Utc>,
    ) -> StoredToken {
        let scopes = match self.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => requested.to_vec(),
        };
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
            scopes,
            token_uri: Some(secrets.token_uri.clone()),
            client_id: Some(secrets.client_id.clone()),
            client_secret: Some(secrets.client_secret.clone()),
        }
    }
}

/// Consent screen URL for the given loopback redirect.
pub fn authorization_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
) -> Result<Url> {
    let mut url = Url::parse(&secrets.auth_uri).map_err(|e| DeliveryError::InvalidCredentials {
        what: "auth_uri",
        reason: e.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &secrets.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", &scopes.join(" "))
        .append_pair("state", state)
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");
    Ok(url)
}

/// Pulls the authorization code out of the redirect's request line
/// (`GET /?state=..&code=.. HTTP/1.1`).
pub fn parse_redirect(request_line: &str, expected_state: &str) -> Result<String> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| DeliveryError::Consent("malformed redirect request".to_string()))?;

    let url = Url::parse(&format!("http://127.0.0.1{}", target))
        .map_err(|e| DeliveryError::Consent(format!("malformed redirect target: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => return Err(DeliveryError::Consent(format!("consent denied: {}", value))),
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(DeliveryError::Consent("state mismatch in redirect".to_string()));
    }
    code.ok_or_else(|| DeliveryError::Consent("redirect carried no code".to_string()))
}

/// Resolves a usable access token for the configured scopes.
pub struct Authenticator {
    client: reqwest::blocking::Client,
    credentials_file: PathBuf,
    token_file: PathBuf,
    scopes: Vec<String>,
}

impl Authenticator {
    pub fn new(
        client: reqwest::blocking::Client,
        credentials_file: impl Into<PathBuf>,
        token_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            credentials_file: credentials_file.into(),
            token_file: token_file.into(),
            scopes: vec![GMAIL_SEND_SCOPE.to_string()],
        }
    }

    pub fn access_token(&self) -> Result<String> {
        let cached = StoredToken::load(&self.token_file)?.filter(|t| t.covers(&self.scopes));

        if let Some(token) = &cached {
            if token.is_valid_at(Utc::now()) {
                debug!(path = %self.token_file.display(), "Using cached access token");
                return Ok(token.access_token.clone());
            }
        }

        let token = match cached {
            Some(token) if token.refresh_token.is_some() => {
                info!("Access token expired, refreshing");
                self.refresh(&token)?
            }
            _ => self.consent()?,
        };

        token.save(&self.token_file)?;
        Ok(token.access_token)
    }

    fn secrets_for(&self, token: &StoredToken) -> Result<ClientSecrets> {
        match (&token.client_id, &token.client_secret, &token.token_uri) {
            (Some(id), Some(secret), Some(uri)) => Ok(ClientSecrets {
                client_id: id.clone(),
                client_secret: secret.clone(),
                auth_uri: String::new(),
                token_uri: uri.clone(),
            }),
            _ => ClientSecrets::load(&self.credentials_file),
        }
    }

    fn refresh(&self, token: &StoredToken) -> Result<StoredToken> {
        let secrets = self.secrets_for(token)?;
        let refresh_token = token.refresh_token.clone().unwrap_or_default();

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
        ];
        let response = self.request_token(&secrets.token_uri, &params)?;
        Ok(response.into_stored(Some(refresh_token), &secrets, &self.scopes, Utc::now()))
    }

    fn consent(&self) -> Result<StoredToken> {
        let secrets = ClientSecrets::load(&self.credentials_file)?;

        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let redirect_uri = format!("http://127.0.0.1:{}/", listener.local_addr()?.port());
        let state = Uuid::new_v4().simple().to_string();
        let url = authorization_url(&secrets, &redirect_uri, &self.scopes, &state)?;

        println!("Please visit this URL to authorize this application: {}", url);
        if let Err(e) = open::that(url.as_str()) {
            warn!(error = %e, "Could not open a browser, use the printed URL");
        }

        let (mut stream, _) = listener.accept()?;
        let mut request_line = String::new();
        BufReader::new(stream.try_clone()?).read_line(&mut request_line)?;

        let code = parse_redirect(&request_line, &state);
        let body = match &code {
            Ok(_) => "The authentication flow has completed. You may close this window.",
            Err(_) => "Authorization failed. Check the terminal for details.",
        };
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )?;
        stream.flush()?;

        let code = code?;
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
        ];
        let response = self.request_token(&secrets.token_uri, &params)?;
        info!("Authorization granted");
        Ok(response.into_stored(None, &secrets, &self.scopes, Utc::now()))
    }

    fn request_token(&self, token_uri: &str, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self.client.post(token_uri).form(params).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<TokenResponse>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRETS_JSON: &str = r#"{
        "installed": {
            "client_id": "abc.apps.googleusercontent.com",
            "project_id": "outdoor-jobs",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_secret": "shh",
            "redirect_uris": ["http://localhost"]
        }
    }"#;

    fn token(expires_at: Option<DateTime<Utc>>) -> StoredToken {
        StoredToken {
            access_token: "ya29.token".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expires_at,
            scopes: vec![GMAIL_SEND_SCOPE.to_string()],
            token_uri: None,
            client_id: None,
            client_secret: None,
        }
    }

    #[test]
    fn test_parse_installed_secrets() {
        let secrets = ClientSecrets::parse(SECRETS_JSON).unwrap();
        assert_eq!(secrets.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(secrets.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn test_secrets_without_client_section_rejected() {
        let err = ClientSecrets::parse(r#"{"other": {}}"#).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidCredentials { .. }));
    }

    #[test]
    fn test_missing_credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientSecrets::load(&dir.path().join("credentials.json")).unwrap_err();
        assert!(matches!(err, DeliveryError::MissingCredentials { .. }));
    }

    #[test]
    fn test_token_validity_window() {
        let now = Utc::now();
        assert!(token(Some(now + Duration::minutes(30))).is_valid_at(now));
        assert!(token(None).is_valid_at(now));
        assert!(!token(Some(now - Duration::minutes(1))).is_valid_at(now));
        // inside the skew window
        assert!(!token(Some(now + Duration::seconds(30))).is_valid_at(now));
    }

    #[test]
    fn test_token_scope_coverage() {
        let t = token(None);
        assert!(t.covers(&[GMAIL_SEND_SCOPE.to_string()]));
        assert!(!t.covers(&["https://www.googleapis.com/auth/gmail.readonly".to_string()]));
    }

    #[test]
    fn test_token_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        assert_eq!(StoredToken::load(&path).unwrap(), None);

        let t = token(Some(Utc::now()));
        t.save(&path).unwrap();
        assert_eq!(StoredToken::load(&path).unwrap(), Some(t));
    }

    #[test]
    fn test_token_response_keeps_previous_refresh_token() {
        let secrets = ClientSecrets::parse(SECRETS_JSON).unwrap();
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "new", "expires_in": 3600}"#).unwrap();
        let now = Utc::now();

        let stored = response.into_stored(
            Some("old-refresh".to_string()),
            &secrets,
            &[GMAIL_SEND_SCOPE.to_string()],
            now,
        );
        assert_eq!(stored.access_token, "new");
        assert_eq!(stored.refresh_token.as_deref(), Some("old-refresh"));
        assert_eq!(stored.expires_at, Some(now + Duration::seconds(3600)));
        assert_eq!(stored.client_id.as_deref(), Some("abc.apps.googleusercontent.com"));
    }

    #[test]
    fn test_authorization_url_params() {
        let secrets = ClientSecrets::parse(SECRETS_JSON).unwrap();
        let url = authorization_url(
            &secrets,
            "http://127.0.0.1:8765/",
            &[GMAIL_SEND_SCOPE.to_string()],
            "xyz",
        )
        .unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".into(), "abc.apps.googleusercontent.com".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://127.0.0.1:8765/".into())));
        assert!(pairs.contains(&("scope".into(), GMAIL_SEND_SCOPE.into())));
        assert!(pairs.contains(&("state".into(), "xyz".into())));
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
    }

    #[test]
    fn test_parse_redirect_extracts_code() {
        let code = parse_redirect("GET /?state=xyz&code=4%2Fabc&scope=x HTTP/1.1\r\n", "xyz").unwrap();
        assert_eq!(code, "4/abc");
    }

    #[test]
    fn test_parse_redirect_rejects_state_mismatch() {
        let err = parse_redirect("GET /?state=other&code=abc HTTP/1.1", "xyz").unwrap_err();
        assert!(matches!(err, DeliveryError::Consent(_)));
    }

    #[test]
    fn test_parse_redirect_reports_denial() {
        let err = parse_redirect("GET /?error=access_denied&state=xyz HTTP/1.1", "xyz").unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }
}
