use crate::{Credentials, EntityId, Session, User};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trait that defines the request-response relationship and metadata for a
/// fixed API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type, read out of the response envelope.
    type Response: DeserializeOwned;
    /// The URL path.
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;

    fn endpoint() -> Endpoint {
        Endpoint::new(Self::METHOD, Self::PATH)
    }
}

// =========================================================
// 动态端点 (Endpoints with path parameters)
// =========================================================

/// Method + path (+ query) for endpoints that embed ids or page numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: String,
}

impl Endpoint {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_query(mut self, key: &str, value: impl fmt::Display) -> Self {
        let sep = if self.path.contains('?') { '&' } else { '?' };
        self.path = format!("{}{}{}={}", self.path, sep, key, value);
        self
    }

    /// Page selection travels in the query string for GET and in the body
    /// otherwise.
    pub fn with_page(self, page: u32) -> Self {
        match self.method {
            HttpMethod::Get => self.with_query("page", page),
            _ => self,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

// =========================================================
// Request Definitions
// =========================================================

/// Log in with email + password. Responds `{data: {token, user}}`.
impl ApiRequest for Credentials {
    type Response = Session;
    const PATH: &'static str = "/api/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// Header badge counter.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UnreadCountRequest;

impl ApiRequest for UnreadCountRequest {
    type Response = UnreadCount;
    const PATH: &'static str = "/api/fcm/notifications/unread-count";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    #[serde(alias = "unread_count", alias = "unread", default)]
    pub count: u64,
}

/// Resolve a user by email (subscription form picks the subscriber this way).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserByEmailRequest {
    pub email: String,
}

impl ApiRequest for UserByEmailRequest {
    type Response = User;
    const PATH: &'static str = "/api/user/getUserByEmail";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// Body of `PUT /api/plans/:id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStatusRequest {
    pub status: String,
}

/// Body of `POST /api/report/index`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportIndexRequest {
    pub page: u32,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub reason: Vec<String>,
}

// =========================================================
// 资源端点表 (Resource endpoint table)
// =========================================================

pub fn show_path(prefix: &str, id: EntityId) -> String {
    format!("{prefix}/{id}")
}

pub mod users {
    use super::*;

    pub fn index() -> Endpoint {
        Endpoint::get("/api/user/getUsers")
    }
    pub fn show(id: EntityId) -> Endpoint {
        Endpoint::get(show_path("/api/user/show", id))
    }
    pub fn create() -> Endpoint {
        Endpoint::post("/api/user/create")
    }
    pub fn update(id: EntityId) -> Endpoint {
        Endpoint::post(show_path("/api/user/update", id))
    }
    pub fn delete(id: EntityId) -> Endpoint {
        Endpoint::delete(show_path("/api/user/delete", id))
    }
}

pub mod properties {
    use super::*;

    pub fn index() -> Endpoint {
        Endpoint::get("/api/property/index")
    }
    pub fn show(id: EntityId) -> Endpoint {
        Endpoint::get(show_path("/api/property/show", id))
    }
    pub fn create() -> Endpoint {
        Endpoint::post("/api/property/create")
    }
    pub fn update(id: EntityId) -> Endpoint {
        Endpoint::post(show_path("/api/property/update", id))
    }
    pub fn delete(id: EntityId) -> Endpoint {
        Endpoint::delete(show_path("/api/property/delete", id))
    }
}

pub mod ads {
    use super::*;

    pub fn index() -> Endpoint {
        Endpoint::get("/api/ad/index")
    }
    pub fn show(id: EntityId) -> Endpoint {
        Endpoint::get(show_path("/api/ad/show", id))
    }
    pub fn create() -> Endpoint {
        Endpoint::post("/api/ad/create")
    }
    pub fn update(id: EntityId) -> Endpoint {
        Endpoint::put(show_path("/api/ad/update", id))
    }
    pub fn delete(id: EntityId) -> Endpoint {
        Endpoint::delete(show_path("/api/ad/delete", id))
    }
    pub fn activate(id: EntityId) -> Endpoint {
        Endpoint::get(show_path("/api/ad/activate", id))
    }
    pub fn deactivate(id: EntityId) -> Endpoint {
        Endpoint::get(show_path("/api/ad/unactivate", id))
    }
}

pub mod plans {
    use super::*;

    pub fn index() -> Endpoint {
        Endpoint::get("/api/plans")
    }
    pub fn show(id: EntityId) -> Endpoint {
        Endpoint::get(show_path("/api/plans", id))
    }
    pub fn create() -> Endpoint {
        Endpoint::post("/api/plans")
    }
    pub fn update(id: EntityId) -> Endpoint {
        Endpoint::put(show_path("/api/plans", id))
    }
    pub fn delete(id: EntityId) -> Endpoint {
        Endpoint::delete(show_path("/api/plans", id))
    }
    pub fn status(id: EntityId) -> Endpoint {
        Endpoint::put(format!("/api/plans/{id}/status"))
    }
}

pub mod subscriptions {
    use super::*;

    pub fn index() -> Endpoint {
        Endpoint::get("/api/subscriptions/admin")
    }
    pub fn show(id: EntityId) -> Endpoint {
        Endpoint::get(show_path("/api/subscriptions", id))
    }
    pub fn create() -> Endpoint {
        Endpoint::post("/api/subscriptions/client")
    }
    pub fn update(id: EntityId) -> Endpoint {
        Endpoint::put(show_path("/api/subscriptions", id))
    }
    pub fn delete(id: EntityId) -> Endpoint {
        Endpoint::delete(show_path("/api/subscriptions", id))
    }
    pub fn renew(id: EntityId) -> Endpoint {
        Endpoint::put(format!("/api/subscriptions/{id}/renew"))
    }
    pub fn cancel(id: EntityId) -> Endpoint {
        Endpoint::put(format!("/api/subscriptions/{id}/cancel"))
    }
}

pub mod reports {
    use super::*;

    pub fn index() -> Endpoint {
        Endpoint::post("/api/report/index")
    }
    pub fn create() -> Endpoint {
        Endpoint::post("/api/report/create")
    }
    pub fn delete(id: EntityId) -> Endpoint {
        Endpoint::delete(show_path("/api/report/delete", id))
    }
}

pub mod blocks {
    use super::*;

    pub fn index() -> Endpoint {
        Endpoint::get("/api/block/index")
    }
    pub fn create() -> Endpoint {
        Endpoint::post("/api/block/create")
    }
    pub fn unblock(id: EntityId) -> Endpoint {
        Endpoint::delete(show_path("/api/block/unblock", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_goes_into_query_only_for_get() {
        assert_eq!(users::index().with_page(3).path, "/api/user/getUsers?page=3");
        assert_eq!(reports::index().with_page(3).path, "/api/report/index");
        assert_eq!(
            Endpoint::get("/x?reason=spam").with_page(2).path,
            "/x?reason=spam&page=2"
        );
    }

    #[test]
    fn update_verbs_follow_each_backend_controller() {
        assert_eq!(users::update(1).method, HttpMethod::Post);
        assert_eq!(properties::update(1).method, HttpMethod::Post);
        assert_eq!(ads::update(1).method, HttpMethod::Put);
        assert_eq!(plans::update(1).method, HttpMethod::Put);
        assert_eq!(subscriptions::update(1).method, HttpMethod::Put);
        assert_eq!(ads::deactivate(4).to_string(), "GET /api/ad/unactivate/4");
        assert_eq!(plans::status(2).to_string(), "PUT /api/plans/2/status");
    }

    #[test]
    fn fixed_requests() {
        assert_eq!(Credentials::endpoint().to_string(), "POST /api/auth/login");
        assert_eq!(
            UnreadCountRequest::endpoint().path,
            "/api/fcm/notifications/unread-count"
        );
        let body = serde_json::to_value(ReportIndexRequest { page: 2, reason: vec![] }).unwrap();
        assert_eq!(body, serde_json::json!({ "page": 2 }));
    }
}
