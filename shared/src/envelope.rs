//! Response envelope normalization.
//!
//! The backend wraps collections in several shapes depending on the
//! controller that produced them:
//!
//! - `{ "data": { "data": [..], "current_page": 1, ... } }` (Laravel paginator)
//! - `{ "reports": { "data": [..], ... } }` (paginator under a named key)
//! - `{ "data": [..] }` and `{ "plans": [..] }` (unpaged arrays)
//! - a bare `[..]`
//!
//! Everything funnels through [`normalize_page`] so list screens only ever see
//! a [`Page`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Keys that carry status metadata rather than payload.
const META_KEYS: &[&str] = &["message", "status", "success", "code", "errors", "meta", "links"];

#[derive(Debug, Error, PartialEq)]
pub enum EnvelopeError {
    #[error("response contains no collection")]
    MissingCollection,
    #[error("response contains no entity")]
    MissingEntity,
    #[error("malformed entity: {0}")]
    Entity(String),
}

// =========================================================
// 分页信息 (Pagination)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            per_page: 10,
            total: 0,
        }
    }
}

impl PageInfo {
    /// Single synthetic page wrapping an unpaged array.
    pub fn single(len: usize) -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            per_page: len.max(1) as u32,
            total: len as u64,
        }
    }

    fn from_paginator(obj: &Map<String, Value>, len: usize) -> Self {
        let num = |key: &str| -> Option<u64> {
            match obj.get(key)? {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }
        };
        let defaults = PageInfo::default();
        let current_page = num("current_page").map_or(defaults.current_page, |v| v.max(1) as u32);
        let per_page = num("per_page").map_or(defaults.per_page, |v| v.max(1) as u32);
        let total = num("total").unwrap_or(len as u64);
        let last_page = num("last_page")
            .map(|v| v.max(1) as u32)
            .unwrap_or_else(|| (total.div_ceil(per_page as u64)).max(1) as u32);
        Self {
            current_page,
            last_page,
            per_page,
            total,
        }
    }

    fn is_paginator(obj: &Map<String, Value>) -> bool {
        ["current_page", "last_page", "per_page", "total"]
            .iter()
            .any(|k| obj.contains_key(*k))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            info: PageInfo::default(),
        }
    }
}

// =========================================================
// 归一化适配器 (Normalizing Adapter)
// =========================================================

/// Find the item array and the paginator object (if any) describing it.
fn locate(value: &Value) -> Option<(&Vec<Value>, Option<&Map<String, Value>>)> {
    match value {
        Value::Array(items) => Some((items, None)),
        Value::Object(obj) => {
            // Laravel resource collections put pagination under `meta`.
            let meta = obj.get("meta").and_then(Value::as_object);
            if let Some(found) = obj.get("data").and_then(|d| locate_inner(d, obj)) {
                return Some(with_meta(found, meta));
            }
            obj.iter()
                .filter(|(k, _)| k.as_str() != "data" && !META_KEYS.contains(&k.as_str()))
                .find_map(|(_, v)| locate_inner(v, obj))
                .map(|found| with_meta(found, meta))
        }
        _ => None,
    }
}

fn locate_inner<'a>(
    value: &'a Value,
    parent: &'a Map<String, Value>,
) -> Option<(&'a Vec<Value>, Option<&'a Map<String, Value>>)> {
    match value {
        Value::Array(items) => {
            let pager = PageInfo::is_paginator(parent).then_some(parent);
            Some((items, pager))
        }
        Value::Object(inner) => match inner.get("data") {
            Some(Value::Array(items)) => Some((items, Some(inner))),
            _ => None,
        },
        _ => None,
    }
}

fn with_meta<'a>(
    (items, pager): (&'a Vec<Value>, Option<&'a Map<String, Value>>),
    meta: Option<&'a Map<String, Value>>,
) -> (&'a Vec<Value>, Option<&'a Map<String, Value>>) {
    match (pager, meta) {
        (None, Some(m)) if PageInfo::is_paginator(m) => (items, Some(m)),
        other => (items, other.0),
    }
}

/// Normalize any collection envelope into a [`Page`].
pub fn normalize_page<T: DeserializeOwned>(value: &Value) -> Result<Page<T>, EnvelopeError> {
    let (raw, pager) = locate(value).ok_or(EnvelopeError::MissingCollection)?;
    let items = raw
        .iter()
        .map(|v| T::deserialize(v).map_err(|e| EnvelopeError::Entity(e.to_string())))
        .collect::<Result<Vec<T>, _>>()?;
    let info = match pager {
        Some(obj) => PageInfo::from_paginator(obj, items.len()),
        None => PageInfo::single(items.len()),
    };
    Ok(Page { items, info })
}

/// Normalize a single-entity envelope: `{data: {..}}`, `{report: {..}}` or the
/// bare object. A body without exactly one entity is [`EnvelopeError::MissingEntity`].
pub fn normalize_item<T: DeserializeOwned>(value: &Value) -> Result<T, EnvelopeError> {
    let Value::Object(obj) = value else {
        return Err(EnvelopeError::MissingEntity);
    };
    let entity = match obj.get("data") {
        Some(inner @ Value::Object(_)) => inner,
        Some(Value::Array(items)) if items.len() == 1 => &items[0],
        Some(_) => return Err(EnvelopeError::MissingEntity),
        None => {
            // Descend only when the payload is the sole non-meta key.
            let mut payload = obj.iter().filter(|(k, _)| !META_KEYS.contains(&k.as_str()));
            match (payload.next(), payload.next()) {
                (None, _) => return Err(EnvelopeError::MissingEntity),
                (Some((_, only @ Value::Object(_))), None) => only,
                _ => value,
            }
        }
    };
    T::deserialize(entity).map_err(|e| EnvelopeError::Entity(e.to_string()))
}

// =========================================================
// 错误载荷 (Error Payloads)
// =========================================================

/// Ordered field → message map used by forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First message in field order, used as a one-line summary.
    pub fn first_message(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (k, v) in other.0 {
            self.add(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut errors = FieldErrors::new();
        for (k, v) in iter {
            errors.add(k, v);
        }
        errors
    }
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_message),
        _ => None,
    }
}

/// Pull `{field: [msg, ..]}` maps out of `errors` or `data`.
pub fn extract_field_errors(body: &Value) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for key in ["errors", "data"] {
        if let Some(obj) = body.get(key).and_then(Value::as_object) {
            for (field, messages) in obj {
                if let Some(msg) = first_message(messages) {
                    errors.add(field.clone(), msg);
                }
            }
        }
    }
    errors
}

/// Human readable `message` (or `error`) from an error body.
pub fn extract_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|k| body.get(*k).and_then(first_message))
}

/// A 2xx body that nonetheless reports failure (`success: false` or
/// `status: 0`). Returns the server message when one is given.
pub fn rejected(body: &Value) -> Option<String> {
    let failed = matches!(body.get("success"), Some(Value::Bool(false)))
        || matches!(body.get("status"), Some(Value::Bool(false)))
        || body.get("status").and_then(Value::as_i64) == Some(0);
    failed.then(|| extract_message(body).unwrap_or_else(|| "request rejected".to_string()))
}
