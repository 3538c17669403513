//! Authenticated JSON transport to the document server.

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Thin JSON client: bearer authentication, status checking and decoding.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
}

impl ApiClient {
    pub fn new(server: &str, api_key: impl Into<String>) -> Result<Self> {
        let base = Url::parse(server).map_err(|_| ClientError::InvalidServer(server.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidServer(server.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            api_key: api_key.into(),
        })
    }

    pub fn server(&self) -> &Url {
        &self.base
    }

    /// Build `{server}/api/{segments...}`, percent-encoding every segment.
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidServer(self.base.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments.iter().map(AsRef::as_ref));
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.call(Method::GET, url, None::<&()>).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        self.call(Method::POST, url, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        self.call(Method::PATCH, url, Some(body)).await
    }

    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T> {
        debug!(%method, %url, "sending request");

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(%method, %url, %status, "request rejected");
            return Err(ClientError::Api { status, body: text });
        }

        // Writes that return nothing still decode as `null`
        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        Ok(serde_json::from_value(value)?)
    }
}
