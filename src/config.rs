// =========================================================
// 运行时配置 (Client Configuration)
// =========================================================

use aqargo_shared::SESSION_STORAGE_KEY;
use tracing::warn;

/// 默认值，环境变量（或编译期变量）缺失时使用
pub const DEFAULT_API_BASE_URL: &str = "https://aqargo.duckdns.org";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u32 = 500;
pub const DEFAULT_PER_PAGE: u32 = 10;

pub const VAR_API_BASE_URL: &str = "AQARGO_API_BASE_URL";
pub const VAR_STORAGE_KEY: &str = "AQARGO_STORAGE_KEY";
pub const VAR_SEARCH_DEBOUNCE_MS: &str = "AQARGO_SEARCH_DEBOUNCE_MS";
pub const VAR_PER_PAGE: &str = "AQARGO_PER_PAGE";

/// 客户端配置
/// 负责从变量源读取配置，读不到就用默认值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub storage_key: String,
    pub search_debounce_ms: u32,
    pub default_per_page: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ClientConfig {
    /// Build from an arbitrary key lookup. The browser build passes
    /// `option_env!` values captured at compile time.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let number = |key: &str, default: u32| match lookup(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(v) if v > 0 => v,
                _ => {
                    warn!(key, value = %raw, "ignoring invalid numeric setting");
                    default
                }
            },
        };

        Self {
            api_base_url: text(VAR_API_BASE_URL, DEFAULT_API_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            storage_key: text(VAR_STORAGE_KEY, SESSION_STORAGE_KEY),
            search_debounce_ms: number(VAR_SEARCH_DEBOUNCE_MS, DEFAULT_SEARCH_DEBOUNCE_MS),
            default_per_page: number(VAR_PER_PAGE, DEFAULT_PER_PAGE),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base_url, path)
        } else {
            format!("{}/{}", self.api_base_url, path)
        }
    }
}
