//! # API Client
//!
//! A thin JSON layer over `reqwest`. Every method takes the caller's
//! [`RequestContext`]; the client itself holds no credentials.

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::error::{ClientError, ClientResult};

/// Longest response body kept in a [`ClientError::Status`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    config: ClientConfig,
}

impl ApiClient {
    /// Builds a client from validated configuration.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        let base = config.base_url()?;

        Ok(ApiClient { http, base, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolves a collection path against the base URL.
    pub fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    // =========================================================================
    // JSON Verbs
    // =========================================================================

    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let request = self.request(ctx, Method::GET, path)?.query(query);
        self.execute(request, Method::GET, path).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.request(ctx, Method::POST, path)?.json(body);
        self.execute(request, Method::POST, path).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.request(ctx, Method::PUT, path)?.json(body);
        self.execute(request, Method::PUT, path).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn request(&self, ctx: &RequestContext, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.url(path)?;
        Ok(ctx.apply(self.http.request(method, url)))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: Method,
        path: &str,
    ) -> ClientResult<T> {
        let response = request.send().await.map_err(|e| {
            error!(%method, path, "Failed to send request: {}", e);
            ClientError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            warn!(%method, path, status = status.as_u16(), "Backend rejected request");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(%method, path, status = status.as_u16(), "Request succeeded");
        let bytes = response.bytes().await?;
        // 204 and empty 200s read as JSON null
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        Ok(serde_json::from_slice(body)?)
    }
}
