//! Client core of the AqarGo admin console.
//!
//! Everything here is UI-agnostic: the Leptos front end drives these
//! controllers from signals, and tests drive them against a mock transport.

pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod form;
pub mod list;
pub mod request;
pub mod session;
pub mod validate;

pub use api::AdminApi;
pub use config::ClientConfig;
pub use error::{AdminError, AdminResult};
pub use form::{Draft, FormController, Submission};
pub use list::{
    Action, CancelToken, Filter, ListController, ListEntity, LoadOutcome, LoadTicket,
    PageWindow, PendingAction, RemoveOutcome, Toggle, page_window,
};
pub use request::{HttpClient, HttpRequest, HttpResponse};
pub use session::{AuthState, KeyValueStore, MemoryStore, SessionGate};
