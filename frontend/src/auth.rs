//! 认证模块
//!
//! Bridges the core `SessionGate` into Leptos: the gate owns the session
//! and its persistence, this module mirrors its state into a signal that the
//! router guard and the header read.

use crate::web::{BrowserStorage, FetchClient};
use aqargo_admin::config::{
    ClientConfig, VAR_API_BASE_URL, VAR_PER_PAGE, VAR_SEARCH_DEBOUNCE_MS, VAR_STORAGE_KEY,
};
use aqargo_admin::session::{AuthState, SessionGate, login_failure_message};
use aqargo_admin::AdminApi;
use aqargo_shared::Credentials;
use leptos::prelude::*;

pub type Api = AdminApi<FetchClient>;

/// Settings baked in at build time (`AQARGO_API_BASE_URL=... trunk build`).
pub fn build_config() -> ClientConfig {
    ClientConfig::from_lookup(|key| {
        let value = match key {
            VAR_API_BASE_URL => option_env!("AQARGO_API_BASE_URL"),
            VAR_STORAGE_KEY => option_env!("AQARGO_STORAGE_KEY"),
            VAR_SEARCH_DEBOUNCE_MS => option_env!("AQARGO_SEARCH_DEBOUNCE_MS"),
            VAR_PER_PAGE => option_env!("AQARGO_PER_PAGE"),
            _ => None,
        };
        value.map(str::to_string)
    })
}

/// 认证上下文
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: RwSignal<AuthState>,
    api: StoredValue<Api, LocalStorage>,
}

impl AuthContext {
    /// Build the client, wire the gate to the signal and restore any
    /// persisted session.
    pub fn new(config: ClientConfig) -> Self {
        let gate = SessionGate::new(BrowserStorage, config.storage_key.clone());
        let api = AdminApi::new(config, FetchClient, gate.clone());

        let state = RwSignal::new(AuthState::Anonymous);
        gate.on_change(move |next| state.set(next.clone()));
        gate.restore();

        Self {
            state,
            api: StoredValue::new_local(api),
        }
    }

    pub fn api(&self) -> Api {
        self.api.get_value()
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(AuthState::is_authenticated))
    }

    pub fn display_name(&self) -> Signal<String> {
        let state = self.state;
        Signal::derive(move || {
            state.with(|s| match s {
                AuthState::Authenticated(session) => session.display_name(),
                _ => String::new(),
            })
        })
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// Sign in. The error is the line to show under the form.
pub async fn login(ctx: &AuthContext, credentials: Credentials) -> Result<(), String> {
    ctx.api()
        .login(&credentials)
        .await
        .map(|_| ())
        .map_err(|e| login_failure_message(&e))
}

/// 注销并清除状态
///
/// The router's auth effect performs the redirect.
pub fn logout(ctx: &AuthContext) {
    ctx.api().logout();
}
