//! HTTP 传输实现 (Browser transport)
//!
//! Implements the core's `HttpClient` on top of `gloo-net`'s fetch wrapper.

use aqargo_admin::error::{AdminError, AdminResult};
use aqargo_admin::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use gloo_net::http::{Method, RequestBuilder};

fn method(m: HttpMethod) -> Method {
    match m {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
    }
}

/// `fetch`-backed client. Stateless, so clones are free.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchClient;

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
        let mut builder = RequestBuilder::new(&req.url).method(method(req.method));
        for (key, value) in &req.headers {
            builder = builder.header(key, value);
        }

        let request = match req.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| AdminError::Network(format!("request build failed: {}", e)))?;

        let response = request
            .send()
            .await
            .map_err(|e| AdminError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AdminError::Decode(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
