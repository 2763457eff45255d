//! 通用列表页 (Generic management table)
//!
//! Renders any [`ListView`] through the core `ListController`. The
//! controller lives in a local signal; every async step releases it across
//! the `await` and settles the result with the matching `finish_*` call.

use crate::auth::{AuthContext, use_auth};
use crate::components::layout::Shell;
use crate::components::toast::{Toasts, use_toasts};
use crate::web::route::{AppRoute, Section};
use crate::web::router::{RouterService, use_router};
use crate::web::timer::Debouncer;
use aqargo_admin::list::{Action, Filter, ListController, ListEntity, RemoveOutcome, page_window};
use aqargo_shared::EntityId;
use leptos::prelude::*;
use leptos::task::spawn_local;

type ListSignal<E> = RwSignal<ListController<E>, LocalStorage>;

// =========================================================
// 列表描述 (Per-entity table description)
// =========================================================

/// Buttons at the end of a row.
pub enum RowAction<E> {
    /// Go to the section's edit form.
    Edit,
    /// Navigate elsewhere (e.g. block the user in this row).
    Open {
        label: &'static str,
        route: fn(&E) -> AppRoute,
    },
    /// Server-confirmed lifecycle action.
    Run {
        label: fn(&E) -> &'static str,
        make: fn(&E) -> Action<E>,
        done: &'static str,
    },
    Delete {
        label: &'static str,
        confirm: &'static str,
    },
}

impl<E> Clone for RowAction<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for RowAction<E> {}

pub trait ListView: ListEntity + Send + Sync {
    const SECTION: Section;
    const COLUMNS: &'static [&'static str];
    const SEARCH_PLACEHOLDER: &'static str = "Search...";

    /// `(value, label)` pairs for the filter select; empty hides it.
    fn filter_choices() -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    fn cells(&self) -> Vec<String>;

    fn actions() -> Vec<RowAction<Self>>;
}

// =========================================================
// 异步操作 (Async steps)
// =========================================================

fn load_page<E: ListView>(list: ListSignal<E>, auth: AuthContext, page: u32) {
    let Some(ticket) = list.try_update(|c| c.begin_load(page)) else {
        return;
    };
    spawn_local(async move {
        let result = auth
            .api()
            .fetch_page::<E>(&ticket.endpoint, ticket.body.as_ref())
            .await;
        list.try_update(|c| c.apply_load(ticket, result));
    });
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

fn remove_row<E: ListView>(
    list: ListSignal<E>,
    auth: AuthContext,
    toasts: Toasts,
    id: EntityId,
    message: &'static str,
) {
    let endpoint = match list.try_update(|c| c.begin_remove(id, |_| confirm(message))) {
        Some(Ok(endpoint)) => endpoint,
        Some(Err(RemoveOutcome::Busy)) => {
            toasts.err("This row is still being updated");
            return;
        }
        _ => return,
    };
    spawn_local(async move {
        let result = auth.api().delete(&endpoint).await;
        match list.try_update(|c| c.finish_remove(id, result)) {
            Some(Ok(RemoveOutcome::Removed)) => toasts.ok("Deleted"),
            Some(Err(e)) => toasts.err(e.to_string()),
            _ => {}
        }
    });
}

fn run_action<E: ListView>(
    list: ListSignal<E>,
    auth: AuthContext,
    toasts: Toasts,
    id: EntityId,
    make: fn(&E) -> Action<E>,
    done: &'static str,
) {
    let Some(pending) = list.try_update(|c| c.begin_action(id, make)).flatten() else {
        return;
    };
    spawn_local(async move {
        let result = auth
            .api()
            .execute(&pending.endpoint, pending.body.as_ref())
            .await;
        match list.try_update(|c| c.finish_action(pending, result)) {
            Some(Ok(())) => toasts.ok(done),
            Some(Err(e)) => toasts.err(e.to_string()),
            None => {}
        }
    });
}

// =========================================================
// UI 组件
// =========================================================

fn action_button<E: ListView>(
    item: &E,
    busy: bool,
    action: RowAction<E>,
    list: ListSignal<E>,
    auth: AuthContext,
    toasts: Toasts,
    router: RouterService,
) -> AnyView {
    let id = item.id();
    match action {
        RowAction::Edit => view! {
            <button
                class="btn btn-ghost btn-xs"
                on:click=move |_| router.navigate_to(AppRoute::Edit(E::SECTION, id))
            >
                "Edit"
            </button>
        }
        .into_any(),
        RowAction::Open { label, route } => {
            let target = route(item);
            view! {
                <button class="btn btn-ghost btn-xs" on:click=move |_| router.navigate_to(target.clone())>
                    {label}
                </button>
            }
            .into_any()
        }
        RowAction::Run { label, make, done } => view! {
            <button
                class="btn btn-outline btn-xs"
                disabled=busy
                on:click=move |_| run_action(list, auth, toasts, id, make, done)
            >
                {label(item)}
            </button>
        }
        .into_any(),
        RowAction::Delete { label, confirm } => view! {
            <button
                class="btn btn-ghost btn-xs text-error"
                disabled=busy
                on:click=move |_| remove_row(list, auth, toasts, id, confirm)
            >
                {label}
            </button>
        }
        .into_any(),
    }
}

fn pagination<E: ListView>(list: ListSignal<E>, load: impl Fn(u32) + Copy + Send + Sync + 'static) -> impl IntoView {
    move || {
        let info = list.with(|c| c.pagination());
        let window = page_window(info.current_page, info.last_page);
        let current = window.current;
        let pages = window
            .pages
            .into_iter()
            .map(|p| {
                let class = if p == current {
                    "join-item btn btn-sm btn-active"
                } else {
                    "join-item btn btn-sm"
                };
                view! { <button class=class on:click=move |_| load(p)>{p}</button> }
            })
            .collect_view();

        view! {
            <div class="join">
                <button
                    class="join-item btn btn-sm"
                    disabled={!window.has_prev}
                    on:click=move |_| load(current.saturating_sub(1))
                >
                    "«"
                </button>
                {pages}
                <button
                    class="join-item btn btn-sm"
                    disabled={!window.has_next}
                    on:click=move |_| load(current + 1)
                >
                    "»"
                </button>
            </div>
        }
    }
}

fn list_body<E: ListView>() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let router = use_router();

    let list: ListSignal<E> = RwSignal::new_local(ListController::new());
    let debouncer = StoredValue::new_local(Debouncer::new(auth.api().config().search_debounce_ms));
    let search = RwSignal::new(String::new());

    let load = move |page: u32| load_page(list, auth, page);
    load(1);

    on_cleanup(move || {
        list.try_with_untracked(|c| c.cancel_token().cancel());
        debouncer.try_with_value(Debouncer::cancel);
    });

    let on_search = move |ev: leptos::ev::Event| {
        let term = event_target_value(&ev);
        search.set(term.clone());
        debouncer.with_value(|d| {
            d.schedule(move || {
                list.try_update(|c| c.set_search(term));
            })
        });
    };

    let on_filter = move |ev: leptos::ev::Event| {
        let filter = Filter::from_choice(&event_target_value(&ev));
        if list.try_update(|c| c.set_filter(filter)) == Some(true) {
            load(1);
        }
    };

    let choices = E::filter_choices();
    let filter_select = (!choices.is_empty()).then(|| {
        let options = choices
            .into_iter()
            .map(|(value, label)| view! { <option value=value>{label}</option> })
            .collect_view();
        view! {
            <select class="select select-bordered" on:change=on_filter>
                <option value={Filter::ALL}>"All"</option>
                {options}
            </select>
        }
    });

    let new_button = E::SECTION.can_create().then(|| {
        view! {
            <button
                class="btn btn-primary btn-sm"
                on:click=move |_| router.navigate_to(AppRoute::Create(E::SECTION))
            >
                "Add"
            </button>
        }
    });

    let headers = E::COLUMNS
        .iter()
        .map(|c| view! { <th>{*c}</th> })
        .collect_view();
    let colspan = (E::COLUMNS.len() + 1).to_string();

    let rows = move || {
        let rows: Vec<(E, bool)> = list.with(|c| {
            c.visible()
                .into_iter()
                .map(|item| (item.clone(), c.is_busy(item.id())))
                .collect()
        });
        if rows.is_empty() {
            let text = if list.with(|c| c.is_loading()) {
                "Loading..."
            } else {
                "Nothing to show"
            };
            return view! {
                <tr>
                    <td colspan=colspan.clone() class="text-center py-8 text-base-content/50">{text}</td>
                </tr>
            }
            .into_any();
        }
        rows.into_iter()
            .map(|(item, busy)| {
                let cells = item
                    .cells()
                    .into_iter()
                    .map(|cell| view! { <td>{cell}</td> })
                    .collect_view();
                let buttons = E::actions()
                    .into_iter()
                    .map(|action| action_button(&item, busy, action, list, auth, toasts, router))
                    .collect_view();
                view! {
                    <tr class=("opacity-50", busy)>
                        {cells}
                        <td>
                            <div class="flex gap-1 justify-end">{buttons}</div>
                        </td>
                    </tr>
                }
            })
            .collect_view()
            .into_any()
    };

    let counts = move || {
        list.with(|c| format!("{} total, {} shown", c.server_total(), c.visible_count()))
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex flex-wrap items-center justify-between gap-3 p-6 pb-2">
                    <div>
                        <h3 class="card-title">{E::SECTION.title()}</h3>
                        <p class="text-base-content/70 text-sm">{counts}</p>
                    </div>
                    <div class="flex flex-wrap gap-2">
                        <input
                            type="text"
                            class="input input-bordered input-sm"
                            placeholder={E::SEARCH_PLACEHOLDER}
                            prop:value=search
                            on:input=on_search
                        />
                        {filter_select}
                        <button
                            class="btn btn-ghost btn-sm"
                            disabled=move || list.with(|c| c.is_loading())
                            on:click=move |_| load(list.with_untracked(|c| c.pagination().current_page))
                        >
                            "Reload"
                        </button>
                        {new_button}
                    </div>
                </div>

                {move || {
                    list.with(|c| c.error().map(str::to_string))
                        .map(|msg| {
                            view! {
                                <div role="alert" class="alert alert-error mx-6">
                                    <span>{msg}</span>
                                </div>
                            }
                        })
                }}

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                {headers}
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>{rows}</tbody>
                    </table>
                </div>

                <div class="flex justify-center p-4">{pagination(list, load)}</div>
            </div>
        </div>
    }
}

/// Management screen for one section.
pub fn list_page<E: ListView>() -> AnyView {
    view! { <Shell>{list_body::<E>()}</Shell> }.into_any()
}
