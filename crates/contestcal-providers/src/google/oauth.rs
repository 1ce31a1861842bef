//! OAuth 2.0 authorization code flow with PKCE and a loopback redirect.
//!
//! The user's browser is sent to Google's consent page; Google redirects to a
//! short-lived listener on `127.0.0.1`, and the received code is exchanged
//! for an access token and a refresh token.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};

use super::config::{GoogleConfig, OAuthCredentials};
use super::tokens::TokenInfo;

const CALLBACK_PATH: &str = "/callback";

const SUCCESS_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>contestcal is authorized</h1>\
    <p>You can close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>Authorization failed</h1>\
    <p>Check the terminal for details.</p></body></html>";

/// Token endpoint client and browser consent flow.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    auth_url: String,
    token_url: String,
    http_client: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: &GoogleConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            credentials: config.credentials.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            http_client,
        })
    }

    /// Runs the interactive consent flow and returns a fresh token set.
    pub async fn authorize(
        &self,
        scopes: &[String],
        port_range: (u16, u16),
        callback_timeout: Duration,
    ) -> ProviderResult<TokenInfo> {
        let pkce = PkceFlow::new();
        let (listener, port) = bind_loopback(port_range).await?;
        let redirect_uri = format!("http://127.0.0.1:{}{}", port, CALLBACK_PATH);
        let consent_url = pkce.build_auth_url(
            &self.auth_url,
            &self.credentials.client_id,
            &redirect_uri,
            scopes,
        );

        info!("opening browser for Google authorization");
        debug!("authorization URL: {}", consent_url);
        if let Err(e) = open::that(&consent_url) {
            warn!("failed to open browser: {}", e);
            eprintln!("\nOpen this URL in your browser:\n\n{}\n", consent_url);
        }

        let callback = tokio::time::timeout(callback_timeout, accept_callback(&listener))
            .await
            .map_err(|_| ProviderError::authentication("timed out waiting for the OAuth redirect"))??;

        if callback.state != pkce.state {
            return Err(ProviderError::authentication(
                "OAuth state mismatch in redirect",
            ));
        }

        info!("received authorization code");
        let response = self
            .request_token(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("code", callback.code.as_str()),
                ("code_verifier", pkce.verifier.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .await?;

        Ok(TokenInfo::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            scopes.to_vec(),
        ))
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn refresh_token(&self, tokens: TokenInfo) -> ProviderResult<TokenInfo> {
        let refresh_token = tokens.refresh_token.clone().ok_or_else(|| {
            ProviderError::authentication("stored token has no refresh token")
        })?;

        let response = self
            .request_token(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .await?;

        info!("refreshed Google access token");
        Ok(tokens.refreshed(
            response.access_token,
            response.refresh_token,
            response.expires_in,
        ))
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> ProviderResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read token response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "token endpoint returned {}: {}",
                status,
                body.trim()
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

async fn bind_loopback(port_range: (u16, u16)) -> ProviderResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)).await {
            debug!("listening for OAuth redirect on port {}", port);
            return Ok((listener, port));
        }
    }
    Err(ProviderError::configuration(format!(
        "no free loopback port in {}-{}",
        port_range.0, port_range.1
    )))
}

/// Code and state carried by the redirect.
#[derive(Debug, PartialEq, Eq)]
struct Callback {
    code: String,
    state: String,
}

/// Accepts connections until one hits the callback path.
async fn accept_callback(listener: &TcpListener) -> ProviderResult<Callback> {
    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .map_err(|e| ProviderError::internal(format!("failed to accept connection: {}", e)))?;
        debug!("redirect connection from {}", peer);
        if let Some(result) = handle_connection(stream).await {
            return result;
        }
    }
}

async fn handle_connection(mut stream: TcpStream) -> Option<ProviderResult<Callback>> {
    let mut request_line = String::new();
    BufReader::new(&mut stream)
        .read_line(&mut request_line)
        .await
        .ok()?;

    let result = parse_request_line(&request_line)?;
    let page = if result.is_ok() { SUCCESS_PAGE } else { FAILURE_PAGE };
    if let Err(e) = stream.write_all(page.as_bytes()).await {
        debug!("failed to answer browser: {}", e);
    }
    let _ = stream.shutdown().await;
    Some(result)
}

/// Parses `GET /callback?code=..&state=.. HTTP/1.1`.
///
/// Returns `None` for requests that are not the redirect, such as a browser
/// asking for `/favicon.ico`.
fn parse_request_line(line: &str) -> Option<ProviderResult<Callback>> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    let target = Url::parse(&format!("http://127.0.0.1{}", parts.next()?)).ok()?;
    if target.path() != CALLBACK_PATH {
        return None;
    }

    let mut code = None;
    let mut state = None;
    for (key, value) in target.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Some(Err(ProviderError::authentication(format!(
                    "authorization denied: {}",
                    value
                ))));
            }
            _ => {}
        }
    }

    Some(match code {
        Some(code) => Ok(Callback {
            code,
            state: state.unwrap_or_default(),
        }),
        None => Err(ProviderError::authentication(
            "redirect carried no authorization code",
        )),
    })
}

/// PKCE verifier, S256 challenge and anti-forgery state (RFC 7636).
#[derive(Debug)]
pub struct PkceFlow {
    pub verifier: String,
    pub challenge: String,
    pub state: String,
}

impl PkceFlow {
    pub fn new() -> Self {
        let verifier_bytes: [u8; 32] = rand::random();
        let state_bytes: [u8; 16] = rand::random();
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);
        Self {
            challenge: challenge_for(&verifier),
            verifier,
            state: URL_SAFE_NO_PAD.encode(state_bytes),
        }
    }

    /// Consent page URL requesting offline access.
    pub fn build_auth_url(
        &self,
        auth_url: &str,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}\
             &code_challenge={}&code_challenge_method=S256&state={}\
             &access_type=offline&prompt=consent",
            auth_url,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
