//! The request wrapper around the authentication API. Every outgoing call
//! goes through [`ApiClient::request`]: it attaches the bearer header from
//! the session store, decodes the response with a raw-text fallback,
//! normalizes failures into [`ApiError`], and detects session expiry. A 401
//! from any endpoint except the configured login path clears the store and
//! surfaces [`ApiError::Unauthenticated`]; navigation policy after that is
//! the caller's decision.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{Instrument, debug, info_span};

use crate::config::AuthConfig;
use crate::errors::ApiError;
use crate::session::SessionStore;

pub struct ApiClient {
    http: Client,
    config: AuthConfig,
    store: Arc<SessionStore>,
}

impl ApiClient {
    /// Builds a client from a validated config and a shared session store.
    ///
    /// # Errors
    /// Returns an error if the config is invalid or the HTTP client cannot
    /// be constructed.
    pub fn new(config: AuthConfig, store: Arc<SessionStore>) -> Result<Self, ApiError> {
        config.validate()?;

        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ApiError::Config(format!("cannot build HTTP client: {err}")))?;

        Ok(Self {
            http,
            config,
            store,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Sends one request and returns the decoded body.
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthenticated`] after clearing the store when a
    /// non-login endpoint answers 401; otherwise a transport, timeout, or
    /// normalized failure error.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.config.url_for(path);

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = self.store.token() {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let span = info_span!(
            "api.request",
            http.method = %method,
            url = %url
        );
        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let decoded = decode_body(response).await;

        if status == StatusCode::UNAUTHORIZED && path != self.config.endpoints.login {
            debug!("session rejected by {path}, clearing stored session");
            self.store.clear();
            return Err(ApiError::Unauthenticated);
        }

        if !status.is_success() {
            return Err(ApiError::from_failure(status.as_u16(), &decoded));
        }

        Ok(decoded)
    }

    /// GETs and deserializes a JSON response.
    ///
    /// # Errors
    /// Propagates [`ApiClient::request`] errors; a body that does not match
    /// `T` yields [`ApiError::Parse`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.request(Method::GET, path, None).await?;
        serde_json::from_value(value).map_err(|err| ApiError::Parse(err.to_string()))
    }

    /// POSTs a JSON body and deserializes the JSON response.
    ///
    /// # Errors
    /// Propagates [`ApiClient::request`] errors; encoding failures yield
    /// [`ApiError::Serialization`], mismatched bodies [`ApiError::Parse`].
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body =
            serde_json::to_value(body).map_err(|err| ApiError::Serialization(err.to_string()))?;
        let value = self.request(Method::POST, path, Some(&body)).await?;
        serde_json::from_value(value).map_err(|err| ApiError::Parse(err.to_string()))
    }
}

/// Decodes a response body as JSON, wrapping unstructured text as
/// `{"message": <text>}` so downstream handling sees one shape.
async fn decode_body(response: Response) -> Value {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    let text = response.text().await.unwrap_or_default();

    if is_json {
        serde_json::from_str(&text).unwrap_or_else(|_| json!({ "message": text }))
    } else {
        json!({ "message": text })
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout(err.to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}
