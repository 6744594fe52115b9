//! LORIS API client.
//!
//! Blocking HTTP client implementing [`IngestService`]: login for a bearer
//! token, instrument lookup, and multipart instrument data upload.

use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use loris_core::IngestService;
use loris_model::{ApiConfig, RawUploadResponse, ServiceError, SessionMode};
use reqwest::{StatusCode, Url};
use reqwest::blocking::{Client, RequestBuilder, Response, multipart::Form};
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Endpoint that exchanges credentials for a token.
const LOGIN_PATH: &[&str] = &["login"];

/// Endpoint receiving instrument data files.
const UPLOAD_PATH: &[&str] = &["instrument_manager", "upload"];

/// Collection of registered instruments; one segment per instrument follows.
const INSTRUMENTS_PATH: &str = "instruments";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Cached bearer token.
struct CachedToken {
    value: String,
    issued_at: Instant,
}

/// Client for the LORIS REST API.
pub struct LorisClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
    token_lifetime: Duration,
    token: Mutex<Option<CachedToken>>,
}

impl LorisClient {
    /// Build a client from the `api` configuration section.
    pub fn new(config: &ApiConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(network)?;
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ServiceError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(config.base_url.clone()));
        }
        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
            token_lifetime: Duration::from_secs(config.token_lifetime_secs),
            token: Mutex::new(None),
        })
    }

    /// Endpoint URL below the base; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn user_agent() -> String {
        format!("loris-ingest/{}", env!("CARGO_PKG_VERSION"))
    }

    fn login(&self) -> Result<String, ServiceError> {
        let url = self.endpoint(LOGIN_PATH);
        debug!(url = %url, "requesting API token");
        let response = self
            .client
            .post(url)
            .header(USER_AGENT, Self::user_agent())
            .json(&LoginRequest {
                username: &self.username,
                password: &self.password,
            })
            .send()
            .map_err(|e| ServiceError::Authentication(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(ServiceError::Authentication(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message.trim()
            )));
        }
        let login: LoginResponse = response
            .json()
            .map_err(|e| ServiceError::Authentication(format!("invalid login response: {e}")))?;
        Ok(login.token)
    }

    /// Current token, logging in again when it is missing or expired.
    fn bearer(&self) -> Result<String, ServiceError> {
        let mut cached = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = cached.as_ref() {
            if token.issued_at.elapsed() < self.token_lifetime {
                return Ok(token.value.clone());
            }
            debug!("API token expired, refreshing");
        }
        let value = self.login()?;
        *cached = Some(CachedToken {
            value: value.clone(),
            issued_at: Instant::now(),
        });
        Ok(value)
    }

    fn invalidate_token(&self) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Run an authorized request, refreshing the token once on HTTP 401.
    fn authorized<T>(
        &self,
        request: impl Fn(&str) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let token = self.bearer()?;
        match request(&token) {
            Err(err) if err.is_unauthorized() => {
                debug!("token rejected, logging in again");
                self.invalidate_token();
                let token = self.bearer()?;
                request(&token)
            }
            other => other,
        }
    }

    fn send(&self, builder: RequestBuilder, token: &str) -> Result<Response, ServiceError> {
        builder
            .bearer_auth(token)
            .header(USER_AGENT, Self::user_agent())
            .send()
            .map_err(network)
    }
}

impl IngestService for LorisClient {
    fn authenticate(&self) -> Result<(), ServiceError> {
        self.invalidate_token();
        self.bearer().map(|_| ())
    }

    fn instrument_exists(&self, instrument: &str) -> Result<bool, ServiceError> {
        let url = self.endpoint(&[INSTRUMENTS_PATH, instrument]);
        self.authorized(|token| {
            let response = self.send(self.client.get(url.clone()), token)?;
            match response.status() {
                status if status.is_success() => Ok(true),
                StatusCode::NOT_FOUND => Ok(false),
                status => Err(http_error(status, response)),
            }
        })
    }

    fn upload_instrument(
        &self,
        instrument: &str,
        file: &Path,
        mode: SessionMode,
    ) -> Result<RawUploadResponse, ServiceError> {
        let url = self.endpoint(UPLOAD_PATH);
        self.authorized(|token| {
            let form = Form::new()
                .text("instrument", instrument.to_string())
                .text("action", mode.as_str())
                .file("file", file)
                .map_err(|source| ServiceError::File {
                    path: file.to_path_buf(),
                    source,
                })?;
            let response = self.send(self.client.post(url.clone()).multipart(form), token)?;
            decode_upload(response)
        })
    }
}

/// Decode an upload response; rejections carry a JSON body too.
fn decode_upload(response: Response) -> Result<RawUploadResponse, ServiceError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(http_error(status, response));
    }
    let body = response.text().map_err(network)?;
    match serde_json::from_str::<RawUploadResponse>(&body) {
        Ok(parsed) => Ok(parsed),
        Err(_) if !status.is_success() => Err(ServiceError::Http {
            status: status.as_u16(),
            message: body.trim().to_string(),
        }),
        Err(err) => Err(ServiceError::MalformedResponse(err.to_string())),
    }
}

fn http_error(status: StatusCode, response: Response) -> ServiceError {
    ServiceError::Http {
        status: status.as_u16(),
        message: response.text().unwrap_or_default().trim().to_string(),
    }
}

fn network(err: reqwest::Error) -> ServiceError {
    ServiceError::Network(err.to_string())
}
