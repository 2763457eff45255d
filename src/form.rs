//! 通用表单控制器 (Generic edit/create form)
//!
//! A draft holds string-typed editable fields. The controller loads it from
//! the server when editing, validates it locally, sends exactly one create or
//! update request, and maps server-side 422 payloads back onto fields.

use crate::api::AdminApi;
use crate::error::{AdminError, AdminResult};
use crate::list::ListEntity;
use crate::request::HttpClient;
use aqargo_shared::protocol::Endpoint;
use aqargo_shared::{EntityId, FieldErrors};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Per-entity form description.
pub trait Draft: Default + Clone + 'static {
    type Entity: ListEntity;

    const NAME: &'static str;
    /// List route to go back to after a successful save.
    const RETURN_PATH: &'static str;

    fn from_entity(entity: &Self::Entity) -> Self;

    /// Pure: draft in, field errors out.
    fn validate(&self, editing: bool) -> FieldErrors;

    /// Request body for create (`editing == false`) or update.
    fn payload(&self, editing: bool) -> Value;

    fn create_endpoint() -> Endpoint;

    /// `None` for create-only forms.
    fn show_endpoint(_id: EntityId) -> Option<Endpoint> {
        None
    }

    fn update_endpoint(_id: EntityId) -> Option<Endpoint> {
        None
    }

    /// Hook to translate backend-specific failures into field errors.
    fn map_server_error(err: AdminError) -> AdminError {
        err
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub endpoint: Endpoint,
    pub payload: Value,
}

#[derive(Debug, Clone)]
pub struct FormController<D> {
    draft: D,
    errors: FieldErrors,
    submitting: bool,
    editing: Option<EntityId>,
    loading: bool,
    load_error: Option<String>,
    load_retryable: bool,
    form_error: Option<String>,
}

impl<D: Draft> FormController<D> {
    pub fn new_create() -> Self {
        Self {
            draft: D::default(),
            errors: FieldErrors::new(),
            submitting: false,
            editing: None,
            loading: false,
            load_error: None,
            load_retryable: false,
            form_error: None,
        }
    }

    /// Edit form; the draft stays unusable until [`finish_load`](Self::finish_load) succeeds.
    pub fn new_edit(id: EntityId) -> Self {
        Self {
            editing: Some(id),
            loading: true,
            ..Self::new_create()
        }
    }

    /// Create form seeded with a draft (e.g. a block pre-filled from the route).
    pub fn with_draft(draft: D) -> Self {
        Self {
            draft,
            ..Self::new_create()
        }
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn editing(&self) -> Option<EntityId> {
        self.editing
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// The last load failed for a transient reason and may be tried again.
    pub fn can_retry_load(&self) -> bool {
        self.load_retryable && !self.loading
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    /// Change one field; its stale error goes away.
    pub fn edit(&mut self, field: &str, f: impl FnOnce(&mut D)) {
        f(&mut self.draft);
        self.errors.remove(field);
        self.form_error = None;
    }

    /// Record a failure found outside submission (e.g. a lookup) on its field.
    pub fn reject(&mut self, err: AdminError) {
        match err {
            AdminError::Validation(fields) if !fields.is_empty() => self.errors.merge(fields),
            other => self.form_error = Some(other.to_string()),
        }
    }

    // --- 加载 (Load for edit) ---

    pub fn begin_load(&mut self) -> Option<Endpoint> {
        let endpoint = D::show_endpoint(self.editing?)?;
        self.loading = true;
        self.load_error = None;
        self.load_retryable = false;
        Some(endpoint)
    }

    /// Apply a fetched record. A record without an id is treated as missing
    /// so the draft never holds placeholder values.
    pub fn finish_load(&mut self, result: AdminResult<D::Entity>) -> AdminResult<()> {
        self.loading = false;
        let result = result.and_then(|entity| match entity.id() {
            0 => Err(AdminError::NotFound),
            _ => Ok(entity),
        });
        match result {
            Ok(entity) => {
                self.draft = D::from_entity(&entity);
                self.errors.clear();
                self.load_error = None;
                self.load_retryable = false;
                Ok(())
            }
            Err(e) => {
                warn!(form = D::NAME, editing = ?self.editing, error = %e, "record load failed");
                self.load_error = Some(e.to_string());
                self.load_retryable = e.is_retryable();
                Err(e)
            }
        }
    }

    pub async fn load_for_edit<C: HttpClient>(&mut self, api: &AdminApi<C>) -> AdminResult<()> {
        let Some(endpoint) = self.begin_load() else {
            self.loading = false;
            return Err(AdminError::NotFound);
        };
        let result = api.fetch_one::<D::Entity>(&endpoint).await;
        self.finish_load(result)
    }

    // --- 校验与提交 (Validate & Submit) ---

    pub fn validate(&mut self) -> bool {
        self.errors = self.draft.validate(self.editing.is_some());
        self.errors.is_empty()
    }

    /// Validate and build the single request to send. Nothing is sent when
    /// this fails.
    pub fn prepare_submit(&mut self) -> AdminResult<Submission> {
        if self.submitting {
            return Err(AdminError::server(409, "already saving"));
        }
        if self.editing.is_some() && (self.loading || self.load_error.is_some()) {
            return Err(AdminError::server(409, "record not loaded"));
        }
        self.form_error = None;
        if !self.validate() {
            debug!(form = D::NAME, fields = ?self.errors.fields().collect::<Vec<_>>(), "validation failed");
            return Err(AdminError::Validation(self.errors.clone()));
        }
        let endpoint = match self.editing {
            None => D::create_endpoint(),
            Some(id) => D::update_endpoint(id).ok_or(AdminError::NotFound)?,
        };
        self.submitting = true;
        Ok(Submission {
            endpoint,
            payload: self.draft.payload(self.editing.is_some()),
        })
    }

    /// Settle the request. On success returns the route to navigate to.
    pub fn finish_submit(&mut self, result: AdminResult<Value>) -> AdminResult<&'static str> {
        self.submitting = false;
        match result.map_err(D::map_server_error) {
            Ok(_) => {
                info!(form = D::NAME, editing = ?self.editing, "saved");
                Ok(D::RETURN_PATH)
            }
            Err(AdminError::Validation(fields)) if !fields.is_empty() => {
                self.errors = fields.clone();
                Err(AdminError::Validation(fields))
            }
            Err(e) => {
                self.form_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn submit<C: HttpClient>(&mut self, api: &AdminApi<C>) -> AdminResult<&'static str> {
        let submission = self.prepare_submit()?;
        let result = api
            .send_json(&submission.endpoint, &submission.payload)
            .await;
        self.finish_submit(result)
    }
}
