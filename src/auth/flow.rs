use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::config::CatalogSettings;

use super::pkce::{attempt_state, code_challenge, generate_code_verifier};

/// Scopes needed to read the user's top tracks and write private playlists.
pub const SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-top-read",
    "playlist-modify-private",
];

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("failed to encode authorization request: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("callback listener error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed authorization callback: {0}")]
    Callback(String),
    #[error("authorization denied: {0}")]
    Denied(String),
    #[error("token exchange error: {0}")]
    TokenExchange(String),
    #[error("timeout waiting for authorization callback")]
    Timeout,
    #[error("no authorization is in progress")]
    NotAwaiting,
    #[error("already signed in")]
    AlreadySignedIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    /// The browser was sent to the authorize page; `verifier` proves the
    /// callback belongs to this attempt.
    AwaitingCallback { verifier: String },
    Authenticated { access_token: String },
}

/// Tracks where the credential handshake stands.
#[derive(Debug, Clone)]
pub struct AuthFlow {
    state: AuthState,
}

impl AuthFlow {
    /// Resume from persisted values: a stored token wins over a pending verifier.
    pub fn resume(access_token: Option<String>, pending_verifier: Option<String>) -> Self {
        let state = match (access_token, pending_verifier) {
            (Some(access_token), _) => AuthState::Authenticated { access_token },
            (None, Some(verifier)) => AuthState::AwaitingCallback { verifier },
            (None, None) => AuthState::Unauthenticated,
        };
        Self { state }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated { .. })
    }

    pub fn access_token(&self) -> Option<&str> {
        match &self.state {
            AuthState::Authenticated { access_token } => Some(access_token),
            _ => None,
        }
    }

    pub fn pending_verifier(&self) -> Option<&str> {
        match &self.state {
            AuthState::AwaitingCallback { verifier } => Some(verifier),
            _ => None,
        }
    }

    /// Tag of the pending attempt, echoed back by the callback.
    pub fn pending_state(&self) -> Option<String> {
        self.pending_verifier().map(attempt_state)
    }

    /// Start a new attempt and return the URL the user has to visit.
    ///
    /// Restarting while already awaiting a callback replaces the verifier.
    /// A held credential has to be invalidated first.
    pub fn begin(&mut self, settings: &CatalogSettings) -> Result<String, AuthError> {
        if self.is_authenticated() {
            return Err(AuthError::AlreadySignedIn);
        }
        let verifier = generate_code_verifier();
        let url = authorize_url(
            settings,
            &code_challenge(&verifier),
            &attempt_state(&verifier),
        )?;
        self.state = AuthState::AwaitingCallback { verifier };
        info!("authorization started");
        Ok(url)
    }

    /// Accept the token obtained for the pending attempt.
    pub fn complete(&mut self, access_token: String) -> Result<(), AuthError> {
        if !matches!(self.state, AuthState::AwaitingCallback { .. }) {
            return Err(AuthError::NotAwaiting);
        }
        self.state = AuthState::Authenticated { access_token };
        info!("authorization complete");
        Ok(())
    }

    /// Drop the credential after the service rejected it.
    pub fn invalidate(&mut self) {
        if self.is_authenticated() {
            info!("credential rejected, authorization required");
        }
        self.state = AuthState::Unauthenticated;
    }
}

/// Build the authorize URL for the code flow with an S256 challenge.
pub fn authorize_url(
    settings: &CatalogSettings,
    challenge: &str,
    state: &str,
) -> Result<String, AuthError> {
    let params = [
        ("response_type", "code".to_string()),
        ("client_id", settings.client_id.clone()),
        ("scope", SCOPES.join(" ")),
        ("code_challenge_method", "S256".to_string()),
        ("code_challenge", challenge.to_string()),
        ("redirect_uri", settings.redirect_uri()),
        ("state", state.to_string()),
    ];

    Ok(format!(
        "{}/authorize?{}",
        settings.accounts_base.trim_end_matches('/'),
        serde_urlencoded::to_string(params)?
    ))
}

/// Token response from the accounts service (internal deserialization).
#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange an authorization code for an access token.
pub fn exchange_code(
    http: &reqwest::blocking::Client,
    settings: &CatalogSettings,
    code: &str,
    verifier: &str,
) -> Result<String, AuthError> {
    let redirect_uri = settings.redirect_uri();
    let params = [
        ("client_id", settings.client_id.as_str()),
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri.as_str()),
        ("code_verifier", verifier),
    ];

    let url = format!("{}/api/token", settings.accounts_base.trim_end_matches('/'));
    let resp = http.post(url).form(&params).send()?;
    let body: TokenResponse = resp.json()?;
    token_from_response(body)
}

fn token_from_response(body: TokenResponse) -> Result<String, AuthError> {
    if let Some(error) = body.error {
        let desc = body.error_description.unwrap_or(error);
        return Err(AuthError::TokenExchange(desc));
    }
    body.access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::TokenExchange("no access_token in response".to_string()))
}
