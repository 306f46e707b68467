use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use lmsprobe_core::{HttpMethod, HttpResponse, RenderedRequest, RequestBody, TransportError};

/// Sends one rendered request and reports what came back.
///
/// Any HTTP status is a normal result. Only failures to obtain a response
/// (connect, DNS, TLS, timeout, unreadable body) are `TransportError`s.
/// Implementations must not retry.
pub trait HttpExecutor: Send + Sync {
    fn send(
        &self,
        request: &RenderedRequest,
    ) -> impl Future<Output = std::result::Result<HttpResponse, TransportError>> + Send;
}

/// `reqwest`-backed executor with a single timeout applied to every call.
///
/// Requests carry absolute URLs, so the client holds no base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a new client whose connect and overall timeouts are both `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn execute(&self, request: &RenderedRequest) -> reqwest::Result<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Form(pairs) => builder.form(pairs),
        };

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpExecutor for ApiClient {
    async fn send(
        &self,
        request: &RenderedRequest,
    ) -> std::result::Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        match self.execute(request).await {
            Ok(resp) => {
                debug!(status = resp.status, url = %request.url, "received response");
                Ok(resp)
            }
            Err(e) => Err(TransportError {
                method: request.method.to_string(),
                url: request.url.clone(),
                timed_out: e.is_timeout(),
                reason: e.to_string(),
            }),
        }
    }
}
