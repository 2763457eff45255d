use crate::config::ClientConfig;
use crate::error::{AdminError, AdminResult};
use crate::request::{HttpClient, HttpRequest, HttpResponse};
use crate::session::SessionGate;
use aqargo_shared::envelope::{self, Page};
use aqargo_shared::protocol::{
    ApiRequest, Endpoint, UnreadCount, UnreadCountRequest, UserByEmailRequest,
};
use aqargo_shared::{Credentials, HEADER_AUTHORIZATION, HEADER_REQUEST_ID, Session, User};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, warn};
use uuid::Uuid;

// =========================================================
// 业务逻辑: 认证 API 客户端
// =========================================================

/// Authenticated client for the marketplace REST API.
///
/// Generic over the transport so the same code runs on `gloo-net` in the
/// browser and on a mock or `reqwest` in tests.
pub struct AdminApi<C> {
    config: Rc<ClientConfig>,
    http: C,
    session: SessionGate,
}

impl<C: Clone> Clone for AdminApi<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            http: self.http.clone(),
            session: self.session.clone(),
        }
    }
}

impl<C: HttpClient> AdminApi<C> {
    pub fn new(config: ClientConfig, http: C, session: SessionGate) -> Self {
        Self {
            config: Rc::new(config),
            http,
            session,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionGate {
        &self.session
    }

    fn build(&self, endpoint: &Endpoint, body: Option<&Value>) -> (HttpRequest, String) {
        let request_id = Uuid::new_v4().to_string();
        let mut req = HttpRequest::new(&self.config.url(&endpoint.path), endpoint.method)
            .with_header("Accept", "application/json")
            .with_header(HEADER_REQUEST_ID, &request_id);
        if let Some(token) = self.session.token() {
            req = req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }
        if let Some(body) = body {
            req = req
                .with_header("Content-Type", "application/json")
                .with_body(body);
        }
        (req, request_id)
    }

    async fn dispatch(&self, endpoint: &Endpoint, body: Option<&Value>) -> AdminResult<HttpResponse> {
        let (req, request_id) = self.build(endpoint, body);
        debug!(method = %endpoint.method, path = %endpoint.path, request_id = %request_id, "api request");
        let resp = self.http.send(req).await.inspect_err(|e| {
            warn!(path = %endpoint.path, request_id = %request_id, error = %e, "transport failure");
        })?;
        debug!(status = resp.status, request_id = %request_id, "api response");
        Ok(resp)
    }

    /// Map a raw response onto the error taxonomy.
    fn interpret(&self, endpoint: &Endpoint, resp: HttpResponse) -> AdminResult<Value> {
        let body = resp.json_or_null();
        let status = resp.status;
        let result = match status {
            200..=299 => match envelope::rejected(&body) {
                Some(message) => Err(AdminError::server(status, message)),
                None => Ok(body),
            },
            401 => {
                self.session.expire();
                Err(AdminError::Unauthorized)
            }
            404 => Err(AdminError::NotFound),
            400 | 422 => {
                let fields = envelope::extract_field_errors(&body);
                if fields.is_empty() {
                    Err(AdminError::server(status, message_or_status(&body, status)))
                } else {
                    Err(AdminError::Validation(fields))
                }
            }
            _ => Err(AdminError::server(status, message_or_status(&body, status))),
        };
        if let Err(e) = &result {
            warn!(path = %endpoint.path, code = e.error_code(), error = %e, "api call failed");
        }
        result
    }

    /// Send and return the decoded JSON body.
    pub async fn execute(&self, endpoint: &Endpoint, body: Option<&Value>) -> AdminResult<Value> {
        let resp = self.dispatch(endpoint, body).await?;
        self.interpret(endpoint, resp)
    }

    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        body: Option<&Value>,
    ) -> AdminResult<Page<T>> {
        let value = self.execute(endpoint, body).await?;
        Ok(envelope::normalize_page(&value)?)
    }

    pub async fn fetch_one<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> AdminResult<T> {
        let value = self.execute(endpoint, None).await?;
        Ok(envelope::normalize_item(&value)?)
    }

    pub async fn send_json(&self, endpoint: &Endpoint, payload: &Value) -> AdminResult<Value> {
        self.execute(endpoint, Some(payload)).await
    }

    pub async fn delete(&self, endpoint: &Endpoint) -> AdminResult<()> {
        self.execute(endpoint, None).await.map(|_| ())
    }

    /// Call a fixed endpoint described by an [`ApiRequest`].
    pub async fn call<R: ApiRequest>(&self, req: &R) -> AdminResult<R::Response> {
        let endpoint = R::endpoint();
        let body = serde_json::to_value(req)?;
        let body = (!body.is_null()).then_some(body);
        let value = self.execute(&endpoint, body.as_ref()).await?;
        Ok(envelope::normalize_item(&value)?)
    }

    // =========================================================
    // 会话操作 (Session)
    // =========================================================

    /// Sign in and persist the session.
    ///
    /// 401/422 answers become `Validation` errors carrying the server's
    /// `email`/`password` messages so the login form can show them.
    pub async fn login(&self, credentials: &Credentials) -> AdminResult<Session> {
        self.session.begin_login()?;
        let result = self.request_session(credentials).await;
        self.session.complete_login(result)
    }

    async fn request_session(&self, credentials: &Credentials) -> AdminResult<Session> {
        let endpoint = Credentials::endpoint();
        let body = serde_json::to_value(credentials)?;
        let resp = self.dispatch(&endpoint, Some(&body)).await?;
        if matches!(resp.status, 401 | 422) {
            let body = resp.json_or_null();
            return Err(AdminError::Validation(envelope::extract_field_errors(&body)));
        }
        let value = self.interpret(&endpoint, resp)?;
        let session: Session = envelope::normalize_item(&value)?;
        if session.token.trim().is_empty() {
            return Err(AdminError::Decode("login response carried no token".into()));
        }
        Ok(session)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    pub async fn unread_count(&self) -> AdminResult<u64> {
        let count: UnreadCount = self.call(&UnreadCountRequest).await?;
        Ok(count.count)
    }

    /// Resolve a subscriber by email. Unknown emails come back as `NotFound`.
    pub async fn user_by_email(&self, email: &str) -> AdminResult<User> {
        let user: User = self
            .call(&UserByEmailRequest {
                email: email.trim().to_string(),
            })
            .await?;
        if user.id == 0 {
            return Err(AdminError::NotFound);
        }
        Ok(user)
    }
}

fn message_or_status(body: &Value, status: u16) -> String {
    envelope::extract_message(body).unwrap_or_else(|| format!("HTTP {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{HttpMethod, MockHttpClient};
    use crate::session::{AuthState, KeyValueStore, MemoryStore};
    use aqargo_shared::protocol::{ads, plans};
    use aqargo_shared::{Ad, Plan};
    use serde_json::json;

    const BASE: &str = "http://api.test";

    fn setup() -> (Rc<MockHttpClient>, AdminApi<Rc<MockHttpClient>>, MemoryStore) {
        let http = Rc::new(MockHttpClient::new());
        let store = MemoryStore::new();
        let gate = SessionGate::new(store.clone(), "auth");
        let config = ClientConfig::default().with_base_url(BASE);
        (http.clone(), AdminApi::new(config, http, gate), store)
    }

    fn url(path: &str) -> String {
        format!("{}{}", BASE, path)
    }

    async fn signed_in() -> (Rc<MockHttpClient>, AdminApi<Rc<MockHttpClient>>, MemoryStore) {
        let (http, api, store) = setup();
        http.mock_response(
            HttpMethod::Post,
            &url("/api/auth/login"),
            200,
            json!({ "data": { "token": "secret-token", "user": { "email": "a@b.sa" } } }),
        );
        api.login(&Credentials {
            email: "a@b.sa".into(),
            password: "password1".into(),
        })
        .await
        .unwrap();
        (http, api, store)
    }

    #[tokio::test]
    async fn login_persists_and_authorizes_later_calls() {
        let (http, api, store) = signed_in().await;
        assert!(store.get("auth").unwrap().contains("secret-token"));

        http.mock_response(HttpMethod::Get, &url("/api/plans"), 200, json!({ "plans": [] }));
        let page: Page<Plan> = api.fetch_page(&plans::index(), None).await.unwrap();
        assert!(page.items.is_empty());

        let req = http.last_request().unwrap();
        assert_eq!(req.headers.get("Authorization").unwrap(), "Bearer secret-token");
        assert_eq!(req.headers.get("Accept").unwrap(), "application/json");
        let request_id = req.headers.get(HEADER_REQUEST_ID).unwrap();
        assert!(Uuid::parse_str(request_id).is_ok());
    }

    #[tokio::test]
    async fn login_rejection_carries_field_messages() {
        let (http, api, store) = setup();
        http.mock_response(
            HttpMethod::Post,
            &url("/api/auth/login"),
            422,
            json!({ "message": "invalid", "data": { "email": ["No account for this email"] } }),
        );
        let err = api
            .login(&Credentials {
                email: "x@y.sa".into(),
                password: "nope".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.field_errors().unwrap().get("email"), Some("No account for this email"));
        assert_eq!(api.session().state(), AuthState::Anonymous);
        assert!(store.get("auth").is_none());
    }

    #[tokio::test]
    async fn any_401_signs_out() {
        let (http, api, store) = signed_in().await;
        http.mock_response(HttpMethod::Get, &url("/api/ad/show/3"), 401, json!({ "message": "Unauthenticated." }));

        let err = api.fetch_one::<Ad>(&ads::show(3)).await.unwrap_err();
        assert_eq!(err, AdminError::Unauthorized);
        assert!(!api.session().is_authenticated());
        assert!(store.get("auth").is_none());

        // next request goes out without a bearer header
        http.mock_response(HttpMethod::Get, &url("/api/plans"), 200, json!([]));
        api.fetch_page::<Plan>(&plans::index(), None).await.unwrap();
        assert!(http.last_request().unwrap().headers.get("Authorization").is_none());
    }

    #[tokio::test]
    async fn show_without_a_record_is_not_found() {
        let (http, api, _) = signed_in().await;
        http.mock_response(HttpMethod::Get, &url("/api/ad/show/9"), 200, json!({ "status": 1, "data": [] }));
        http.mock_response(HttpMethod::Get, &url("/api/plans/4"), 200, json!({ "message": "Plan not found" }));
        http.mock_response(HttpMethod::Get, &url("/api/plans/5"), 200, json!({ "data": { "id": 5, "name": "Gold" } }));

        assert_eq!(api.fetch_one::<Ad>(&ads::show(9)).await, Err(AdminError::NotFound));
        assert_eq!(api.fetch_one::<Plan>(&plans::show(4)).await, Err(AdminError::NotFound));
        assert_eq!(api.fetch_one::<Plan>(&plans::show(5)).await.unwrap().name, "Gold");
    }

    #[tokio::test]
    async fn status_mapping() {
        let (http, api, _) = signed_in().await;
        http.mock_response(HttpMethod::Delete, &url("/api/plans/1"), 500, json!({ "message": "Plan in use" }));
        http.mock_response(
            HttpMethod::Put,
            &url("/api/plans/2"),
            422,
            json!({ "errors": { "name": ["The name field is required."] } }),
        );
        http.mock_response(HttpMethod::Put, &url("/api/plans/3"), 200, json!({ "success": false, "message": "Locked" }));

        assert_eq!(
            api.delete(&plans::delete(1)).await.unwrap_err(),
            AdminError::server(500, "Plan in use")
        );
        let err = api.send_json(&plans::update(2), &json!({})).await.unwrap_err();
        assert_eq!(err.field_errors().unwrap().get("name"), Some("The name field is required."));
        assert_eq!(
            api.send_json(&plans::update(3), &json!({})).await.unwrap_err(),
            AdminError::server(200, "Locked")
        );
        assert_eq!(api.delete(&plans::delete(99)).await.unwrap_err(), AdminError::NotFound);
    }

    #[tokio::test]
    async fn offline_is_a_network_error() {
        let (http, api, _) = signed_in().await;
        http.set_offline(true);
        let err = api.fetch_page::<Plan>(&plans::index(), None).await.unwrap_err();
        assert!(matches!(err, AdminError::Network(_)));
        assert!(api.session().is_authenticated());
    }

    #[tokio::test]
    async fn unread_count_and_user_lookup() {
        let (http, api, _) = signed_in().await;
        http.mock_response(
            HttpMethod::Get,
            &url("/api/fcm/notifications/unread-count"),
            200,
            json!({ "data": { "unread_count": 4 } }),
        );
        assert_eq!(api.unread_count().await.unwrap(), 4);

        http.mock_response(
            HttpMethod::Post,
            &url("/api/user/getUserByEmail"),
            200,
            json!({ "id": 12, "first_name": "Noura", "email": "n@x.sa" }),
        );
        let user = api.user_by_email(" n@x.sa ").await.unwrap();
        assert_eq!(user.id, 12);
        assert_eq!(
            http.last_request().unwrap().body,
            Some(json!({ "email": "n@x.sa" }))
        );
    }
}
