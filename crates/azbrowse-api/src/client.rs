// ARM HTTP client
//
// Wraps `reqwest::Client` with bearer-token auth, relative-path URL
// construction and ARM error-envelope decoding. Callers get the raw JSON
// body back: the browser displays responses verbatim and lets each
// expander decode only the fields it needs.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorEnvelope;
use crate::transport::TransportConfig;

/// Public ARM endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Path listing every subscription visible to the token.
pub const SUBSCRIPTIONS_PATH: &str = "/subscriptions?api-version=2018-01-01";

/// Raw HTTP client for the Resource Manager API.
///
/// Every request is addressed by a path relative to the endpoint root
/// (e.g. `/subscriptions/{id}/resourceGroups?api-version=2018-05-01`),
/// which is exactly what tree nodes carry as their expand URL.
pub struct ArmClient {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl ArmClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(
        base_url: Url,
        token: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, token: SecretString) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// The endpoint root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve a relative resource path (with optional query) against the
    /// endpoint root.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        if path.starts_with('/') {
            Ok(self.base_url.join(path)?)
        } else {
            Ok(self.base_url.join(&format!("/{path}"))?)
        }
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// `GET` a path and return the response body as text.
    pub async fn get_text(&self, path: &str) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        Self::read_body(resp).await
    }

    /// `POST` an empty body to a path (used to invoke resource actions).
    pub async fn post_text(&self, path: &str) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .bearer_auth(self.token.expose_secret())
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;

        Self::read_body(resp).await
    }

    /// Map non-success statuses to typed errors, returning the body otherwise.
    async fn read_body(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let path = resp.url().path().to_owned();
        let body = resp.text().await?;
        trace!(%status, bytes = body.len(), "response received");

        if status.is_success() {
            return Ok(body);
        }

        let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(ErrorEnvelope { error: Some(err) }) => (
                err.code,
                err.message.unwrap_or_else(|| status.to_string()),
            ),
            _ => (None, preview(&body).to_owned()),
        };

        Err(match status {
            reqwest::StatusCode::UNAUTHORIZED => Error::Authentication { message },
            reqwest::StatusCode::FORBIDDEN => Error::Forbidden { message },
            reqwest::StatusCode::NOT_FOUND => Error::NotFound { path },
            _ => Error::Api {
                message,
                code,
                status: status.as_u16(),
            },
        })
    }
}

/// Decode a JSON body, keeping a preview of it in the error.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
