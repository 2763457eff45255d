use crate::error::{AdminError, AdminResult};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::rc::Rc;

pub use aqargo_shared::protocol::HttpMethod;

#[cfg(test)]
use std::cell::RefCell;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: &serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> AdminResult<T> {
        serde_json::from_str(&self.body).map_err(AdminError::from)
    }

    /// Body as JSON; empty or non-JSON bodies (`204`, HTML error pages) read
    /// as `null`.
    pub fn json_or_null(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// HTTP 客户端特性 (Trait)
///
/// `?Send` because the browser transport holds JS handles.
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse>;
}

#[async_trait::async_trait(?Send)]
impl<T: HttpClient + ?Sized> HttpClient for Rc<T> {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
        (**self).send(req).await
    }
}

// =========================================================
// 测试工具: ReqwestHttpClient
// =========================================================

#[cfg(test)]
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

#[cfg(test)]
impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, &req.url);

        for (k, v) in req.headers {
            builder = builder.header(k, v);
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| AdminError::Network(format!("reqwest: {}", e)))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| AdminError::Network(format!("reqwest body: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<serde_json::Value>,
}

#[cfg(test)]
pub struct MockHttpClient {
    // ("METHOD url", (Status, Response Body))
    responses: RefCell<HashMap<String, (u16, String)>>,
    offline: RefCell<bool>,
    pub requests: RefCell<Vec<RecordedRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            offline: RefCell::new(false),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn key(method: HttpMethod, url: &str) -> String {
        format!("{} {}", method, url)
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.responses
            .borrow_mut()
            .insert(Self::key(method, url), (status, body.to_string()));
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.borrow_mut() = offline;
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
        self.requests.borrow_mut().push(RecordedRequest {
            method: req.method,
            url: req.url.clone(),
            headers: req.headers.clone(),
            body: req.body.as_deref().and_then(|b| serde_json::from_str(b).ok()),
        });

        if *self.offline.borrow() {
            return Err(AdminError::Network("connection refused".to_string()));
        }

        let responses = self.responses.borrow();
        match responses.get(&Self::key(req.method, &req.url)) {
            Some((status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP server answering with `status` and `body`, returning the
    /// raw request it received.
    async fn serve_once(status: u16, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let raw = String::from_utf8_lossy(&buf[..n]).to_string();
            let resp = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(resp.as_bytes()).await.unwrap();
            raw
        });
        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn reqwest_transport_round_trip() {
        let (base, server) = serve_once(200, r#"{"data":[]}"#).await;
        let client = ReqwestHttpClient::new();
        let req = HttpRequest::new(&format!("{}/api/plans", base), HttpMethod::Get)
            .with_header("Authorization", "Bearer abc");

        let resp = client.send(req).await.unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.json_or_null(), serde_json::json!({ "data": [] }));

        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("get /api/plans"));
        assert!(raw.contains("authorization: bearer abc"));
    }

    #[tokio::test]
    async fn reqwest_transport_reports_refused_connections() {
        // Bind then drop to get a port nobody listens on.
        let addr = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };
        let client = ReqwestHttpClient::new();
        let err = client
            .send(HttpRequest::new(&format!("http://{}/x", addr), HttpMethod::Get))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Network(_)));
    }

    #[tokio::test]
    async fn mock_defaults_to_404_and_records() {
        let mock = MockHttpClient::new();
        let resp = mock
            .send(HttpRequest::new("http://x/y", HttpMethod::Delete))
            .await
            .unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(resp.json_or_null(), serde_json::Value::Null);
        assert_eq!(mock.request_count(), 1);
        assert_eq!(mock.last_request().unwrap().method, HttpMethod::Delete);
    }
}
