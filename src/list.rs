//! 通用列表控制器 (Generic list management)
//!
//! One controller drives every management screen: it fetches a page from
//! the entity's index endpoint, narrows it with client-side search and
//! filter, and applies mutations only once the server has confirmed them.
//!
//! Async work is split into `begin_*` / `finish_*` halves so a UI can hold
//! the controller in a signal, release it across the `await`, and settle the
//! result afterwards. The `load`/`remove`/`perform` helpers chain both halves
//! for callers that own the controller outright.

use crate::api::AdminApi;
use crate::error::{AdminError, AdminResult};
use crate::request::HttpClient;
use aqargo_shared::protocol::Endpoint;
use aqargo_shared::{EntityId, Page, PageInfo};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, warn};

// =========================================================
// 实体抽象 (Entity Traits)
// =========================================================

/// What a list screen needs to know about its entity.
pub trait ListEntity: DeserializeOwned + Clone + 'static {
    /// Used in logs.
    const NAME: &'static str;
    /// The filter also narrows the server query, so changing it reloads.
    const SERVER_FILTER: bool = false;

    fn id(&self) -> EntityId;

    fn index() -> Endpoint;

    /// Body for POST-style index endpoints.
    fn index_body(_page: u32, _filter: &Filter) -> Option<Value> {
        None
    }

    /// Fields searched by the free-text box.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Value compared against the active [`Filter`]; `None` when the entity
    /// has no filterable field.
    fn filter_value(&self) -> Option<Cow<'_, str>> {
        None
    }

    fn delete_endpoint(id: EntityId) -> Endpoint;
}

/// Server call plus the local patch to apply once it succeeds.
pub struct Action<E> {
    pub endpoint: Endpoint,
    pub body: Option<Value>,
    apply: Box<dyn FnOnce(&mut E)>,
}

impl<E> Action<E> {
    pub fn new(endpoint: Endpoint, apply: impl FnOnce(&mut E) + 'static) -> Self {
        Self {
            endpoint,
            body: None,
            apply: Box::new(apply),
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Binary state flipped from the list (ad active flag, plan status).
pub trait Toggle: ListEntity {
    fn is_on(&self) -> bool;
    fn toggle_action(&self) -> Action<Self>;
}

// =========================================================
// 过滤与取消 (Filter & Cancellation)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Value(String),
}

impl Filter {
    pub const ALL: &'static str = "all";

    /// `""` and `"all"` mean no filter.
    pub fn from_choice(choice: &str) -> Self {
        match choice.trim() {
            "" | Self::ALL => Filter::All,
            other => Filter::Value(other.to_string()),
        }
    }

    pub fn as_choice(&self) -> &str {
        match self {
            Filter::All => Self::ALL,
            Filter::Value(v) => v,
        }
    }

    pub fn accepts(&self, value: Option<&str>) -> bool {
        match self {
            Filter::All => true,
            Filter::Value(wanted) => value.is_some_and(|v| v == wanted),
        }
    }
}

/// Set when the owning page unmounts; in-flight results are then dropped.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Identifies one issued load. Only the newest ticket may apply.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    pub page: u32,
    pub endpoint: Endpoint,
    pub body: Option<Value>,
    cancel: CancelToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    /// A newer load was issued meanwhile.
    Stale,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// Already gone locally; nothing was sent.
    NotPresent,
    /// The confirmation callback said no.
    Declined,
    /// Another mutation on the same row is still in flight.
    Busy,
}

pub struct PendingAction<E> {
    pub id: EntityId,
    pub endpoint: Endpoint,
    pub body: Option<Value>,
    apply: Box<dyn FnOnce(&mut E)>,
}

// =========================================================
// 列表控制器 (List Controller)
// =========================================================

pub struct ListController<E> {
    items: Vec<E>,
    pagination: PageInfo,
    loading: bool,
    error: Option<String>,
    search_term: String,
    filter: Filter,
    generation: u64,
    cancel: CancelToken,
    in_flight: HashSet<EntityId>,
}

impl<E: ListEntity> Default for ListController<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ListEntity> ListController<E> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            pagination: PageInfo::default(),
            loading: false,
            error: None,
            search_term: String::new(),
            filter: Filter::All,
            generation: 0,
            cancel: CancelToken::new(),
            in_flight: HashSet::new(),
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn pagination(&self) -> PageInfo {
        self.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn is_busy(&self, id: EntityId) -> bool {
        self.in_flight.contains(&id)
    }

    /// Token the page cancels on unmount.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Returns `true` when the new filter requires a reload.
    pub fn set_filter(&mut self, filter: Filter) -> bool {
        if self.filter == filter {
            return false;
        }
        self.filter = filter;
        E::SERVER_FILTER
    }

    fn matches_search(&self, item: &E) -> bool {
        let needle = self.search_term.trim().to_lowercase();
        needle.is_empty()
            || item
                .search_fields()
                .iter()
                .any(|f| f.to_lowercase().contains(&needle))
    }

    /// `items ∩ search ∩ filter`; never longer than `items`.
    pub fn visible(&self) -> Vec<&E> {
        self.items
            .iter()
            .filter(|item| self.matches_search(item))
            .filter(|item| self.filter.accepts(item.filter_value().as_deref()))
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible().len()
    }

    /// Row count reported by the server for the whole collection.
    pub fn server_total(&self) -> u64 {
        self.pagination.total
    }

    // --- 加载 (Load) ---

    pub fn begin_load(&mut self, page: u32) -> LoadTicket {
        let page = page.max(1);
        self.generation += 1;
        self.loading = true;
        self.error = None;
        LoadTicket {
            generation: self.generation,
            page,
            endpoint: E::index().with_page(page),
            body: E::index_body(page, &self.filter),
            cancel: self.cancel.clone(),
        }
    }

    pub fn apply_load(&mut self, ticket: LoadTicket, result: AdminResult<Page<E>>) -> LoadOutcome {
        if ticket.cancel.is_cancelled() {
            debug!(entity = E::NAME, page = ticket.page, "dropping load for unmounted page");
            return LoadOutcome::Cancelled;
        }
        if ticket.generation != self.generation {
            debug!(entity = E::NAME, page = ticket.page, "dropping stale load");
            return LoadOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(Page { items, info }) => {
                if items.len() > info.per_page as usize {
                    warn!(
                        entity = E::NAME,
                        per_page = info.per_page,
                        received = items.len(),
                        "server returned more rows than per_page"
                    );
                }
                self.items = items;
                self.pagination = info;
                LoadOutcome::Applied
            }
            Err(e) => {
                self.items.clear();
                self.error = Some(e.to_string());
                LoadOutcome::Failed
            }
        }
    }

    pub async fn load<C: HttpClient>(&mut self, api: &AdminApi<C>, page: u32) -> LoadOutcome {
        let ticket = self.begin_load(page);
        let result = api.fetch_page(&ticket.endpoint, ticket.body.as_ref()).await;
        self.apply_load(ticket, result)
    }

    pub async fn refresh<C: HttpClient>(&mut self, api: &AdminApi<C>) -> LoadOutcome {
        let page = self.pagination.current_page;
        self.load(api, page).await
    }

    /// Mutations settling after the page went away touch nothing.
    fn ensure_mounted(&self) -> AdminResult<()> {
        if self.cancel.is_cancelled() {
            debug!(entity = E::NAME, "dropping mutation result for unmounted page");
            return Err(AdminError::Cancelled);
        }
        Ok(())
    }

    // --- 删除 (Remove) ---

    pub fn begin_remove(
        &mut self,
        id: EntityId,
        confirm: impl FnOnce(&E) -> bool,
    ) -> Result<Endpoint, RemoveOutcome> {
        let Some(item) = self.items.iter().find(|i| i.id() == id) else {
            return Err(RemoveOutcome::NotPresent);
        };
        if self.in_flight.contains(&id) {
            return Err(RemoveOutcome::Busy);
        }
        if !confirm(item) {
            return Err(RemoveOutcome::Declined);
        }
        self.in_flight.insert(id);
        Ok(E::delete_endpoint(id))
    }

    pub fn finish_remove(&mut self, id: EntityId, result: AdminResult<()>) -> AdminResult<RemoveOutcome> {
        self.in_flight.remove(&id);
        self.ensure_mounted()?;
        result?;
        match self.items.iter().position(|i| i.id() == id) {
            Some(pos) => {
                self.items.remove(pos);
                self.pagination.total = self.pagination.total.saturating_sub(1);
                Ok(RemoveOutcome::Removed)
            }
            None => Ok(RemoveOutcome::NotPresent),
        }
    }

    pub async fn remove<C: HttpClient>(
        &mut self,
        api: &AdminApi<C>,
        id: EntityId,
        confirm: impl FnOnce(&E) -> bool,
    ) -> AdminResult<RemoveOutcome> {
        let endpoint = match self.begin_remove(id, confirm) {
            Ok(endpoint) => endpoint,
            Err(outcome) => return Ok(outcome),
        };
        let result = api.delete(&endpoint).await;
        self.finish_remove(id, result)
    }

    // --- 生命周期操作 (Lifecycle actions) ---

    /// `None` when the row is gone or already busy.
    pub fn begin_action(
        &mut self,
        id: EntityId,
        make: impl FnOnce(&E) -> Action<E>,
    ) -> Option<PendingAction<E>> {
        if self.in_flight.contains(&id) {
            return None;
        }
        let item = self.items.iter().find(|i| i.id() == id)?;
        let Action {
            endpoint,
            body,
            apply,
        } = make(item);
        self.in_flight.insert(id);
        Some(PendingAction {
            id,
            endpoint,
            body,
            apply,
        })
    }

    /// Patch the row only after the server accepted the action.
    pub fn finish_action(&mut self, pending: PendingAction<E>, result: AdminResult<Value>) -> AdminResult<()> {
        self.in_flight.remove(&pending.id);
        self.ensure_mounted()?;
        result?;
        if let Some(item) = self.items.iter_mut().find(|i| i.id() == pending.id) {
            (pending.apply)(item);
        }
        Ok(())
    }

    /// Returns `Ok(false)` when nothing was sent.
    pub async fn perform<C: HttpClient>(
        &mut self,
        api: &AdminApi<C>,
        id: EntityId,
        make: impl FnOnce(&E) -> Action<E>,
    ) -> AdminResult<bool> {
        let Some(pending) = self.begin_action(id, make) else {
            return Ok(false);
        };
        let result = api.execute(&pending.endpoint, pending.body.as_ref()).await;
        self.finish_action(pending, result).map(|_| true)
    }

    pub async fn toggle<C: HttpClient>(&mut self, api: &AdminApi<C>, id: EntityId) -> AdminResult<bool>
    where
        E: Toggle,
    {
        self.perform(api, id, E::toggle_action).await
    }
}

// =========================================================
// 分页窗口 (Pagination Window)
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<u32>,
    pub current: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

/// `[current-2, current+2] ∩ [1, last]`.
pub fn page_window(current: u32, last: u32) -> PageWindow {
    let last = last.max(1);
    let current = current.clamp(1, last);
    let start = current.saturating_sub(2).max(1);
    let end = current.saturating_add(2).min(last);
    PageWindow {
        pages: (start..=end).collect(),
        current,
        has_prev: current > 1,
        has_next: current < last,
    }
}

#[cfg(test)]
mod tests;
