//! 通用表单页 (Generic create/edit screen)

use crate::auth::{AuthContext, use_auth};
use crate::components::layout::Shell;
use crate::components::toast::use_toasts;
use crate::web::router::use_router;
use aqargo_admin::form::{Draft, FormController};
use aqargo_admin::AdminError;
use leptos::prelude::*;
use leptos::task::spawn_local;

pub type FormSignal<D> = RwSignal<FormController<D>, LocalStorage>;

// =========================================================
// 字段描述 (Field description)
// =========================================================

#[derive(Clone, Copy)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Date,
    TextArea,
    /// `(value, label)` pairs.
    Select(fn() -> Vec<(&'static str, &'static str)>),
    /// Reads and writes `"true"` / `"false"`.
    Checkbox,
}

impl FieldKind {
    fn input_type(&self) -> &'static str {
        match self {
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            _ => "text",
        }
    }
}

/// One input bound to a draft field. `name` is also the key server and
/// validation errors come back under.
pub struct Field<D> {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub get: fn(&D) -> String,
    pub set: fn(&mut D, String),
    pub shown: fn(&D) -> bool,
}

impl<D> Clone for Field<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Field<D> {}

impl<D> Field<D> {
    pub fn new(
        name: &'static str,
        label: &'static str,
        kind: FieldKind,
        get: fn(&D) -> String,
        set: fn(&mut D, String),
    ) -> Self {
        Self {
            name,
            label,
            kind,
            get,
            set,
            shown: |_| true,
        }
    }

    pub fn shown_when(mut self, shown: fn(&D) -> bool) -> Self {
        self.shown = shown;
        self
    }
}

pub trait FormView: Draft {
    /// Singular noun for the page title.
    const TITLE: &'static str;

    fn fields() -> Vec<Field<Self>>;

    /// Entity-specific widgets rendered above the generic fields.
    fn extras(_form: FormSignal<Self>) -> Option<AnyView> {
        None
    }
}

// =========================================================
// UI 组件
// =========================================================

fn field_error<D: Draft>(form: FormSignal<D>, name: &'static str) -> impl IntoView {
    move || {
        form.with(|f| f.error(name).map(str::to_string))
            .map(|msg| view! { <span class="label-text-alt text-error">{msg}</span> })
    }
}

fn render_field<D: FormView>(form: FormSignal<D>, field: Field<D>) -> impl IntoView {
    let Field {
        name,
        label,
        kind,
        get,
        set,
        shown,
    } = field;
    let value = move || form.with(|f| get(f.draft()));
    let on_input = move |ev: leptos::ev::Event| {
        let text = event_target_value(&ev);
        form.update(|f| f.edit(name, |d| set(d, text)));
    };

    let control = match kind {
        FieldKind::TextArea => view! {
            <textarea class="textarea textarea-bordered" rows="4" prop:value=value on:input=on_input></textarea>
        }
        .into_any(),
        FieldKind::Select(choices) => {
            let options = choices()
                .into_iter()
                .map(|(v, l)| {
                    view! { <option value=v selected=move || form.with(|f| get(f.draft()) == v)>{l}</option> }
                })
                .collect_view();
            view! {
                <select class="select select-bordered" on:change=on_input>
                    <option value="">"Choose..."</option>
                    {options}
                </select>
            }
            .into_any()
        }
        FieldKind::Checkbox => view! {
            <input
                type="checkbox"
                class="toggle toggle-primary"
                prop:checked=move || form.with(|f| get(f.draft()) == "true")
                on:change=move |ev| {
                    let on = event_target_checked(&ev);
                    form.update(|f| f.edit(name, |d| set(d, on.to_string())));
                }
            />
        }
        .into_any(),
        other => view! {
            <input
                type=other.input_type()
                class="input input-bordered"
                prop:value=value
                on:input=on_input
            />
        }
        .into_any(),
    };

    view! {
        <div class="form-control" class:hidden=move || !form.with(|f| shown(f.draft()))>
            <label class="label">
                <span class="label-text">{label}</span>
            </label>
            {control}
            <label class="label">{field_error(form, name)}</label>
        </div>
    }
}

/// Fetch the record being edited; a no-op for create forms.
fn load_record<D: FormView>(auth: AuthContext, form: FormSignal<D>) {
    let Some(endpoint) = form.try_update(|f| f.begin_load()).flatten() else {
        return;
    };
    spawn_local(async move {
        let result = auth.api().fetch_one::<D::Entity>(&endpoint).await;
        let _ = form.try_update(|f| f.finish_load(result));
    });
}

fn form_body<D: FormView>(controller: FormController<D>) -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let router = use_router();

    let editing = controller.editing().is_some();
    let form: FormSignal<D> = RwSignal::new_local(controller);

    load_record(auth, form);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let submission = match form.try_update(|f| f.prepare_submit()) {
            Some(Ok(submission)) => submission,
            Some(Err(AdminError::Validation(_))) | None => return,
            Some(Err(e)) => {
                toasts.err(e.to_string());
                return;
            }
        };
        spawn_local(async move {
            let result = auth
                .api()
                .send_json(&submission.endpoint, &submission.payload)
                .await;
            match form.try_update(|f| f.finish_submit(result)) {
                Some(Ok(path)) => {
                    toasts.ok(format!("{} saved", D::TITLE));
                    router.navigate(path);
                }
                Some(Err(AdminError::Validation(_))) | None => {}
                Some(Err(e)) => toasts.err(e.to_string()),
            }
        });
    };

    let title = format!("{} {}", if editing { "Edit" } else { "New" }, D::TITLE);
    let locked = move || form.with(|f| f.is_loading() || f.load_error().is_some());
    let fields = D::fields()
        .into_iter()
        .map(|field| render_field(form, field))
        .collect_view();

    view! {
        <div class="card bg-base-100 shadow-xl max-w-3xl">
            <form class="card-body" on:submit=on_submit>
                <h3 class="card-title">{title}</h3>

                {move || {
                    form.with(|f| f.load_error().or(f.form_error()).map(str::to_string))
                        .map(|msg| {
                            view! {
                                <div role="alert" class="alert alert-error text-sm py-2">
                                    <span>{msg}</span>
                                    <Show when=move || form.with(|f| f.can_retry_load())>
                                        <button
                                            type="button"
                                            class="btn btn-sm btn-ghost"
                                            on:click=move |_| load_record(auth, form)
                                        >
                                            "Retry"
                                        </button>
                                    </Show>
                                </div>
                            }
                        })
                }}
                <Show when=move || form.with(|f| f.is_loading())>
                    <span class="loading loading-spinner loading-md"></span>
                </Show>

                <fieldset disabled=locked class="grid grid-cols-1 md:grid-cols-2 gap-x-6">
                    {D::extras(form)}
                    {fields}
                </fieldset>

                <div class="card-actions justify-end mt-4">
                    <button
                        type="button"
                        class="btn btn-ghost"
                        on:click=move |_| router.navigate(D::RETURN_PATH)
                    >
                        "Cancel"
                    </button>
                    <button
                        type="submit"
                        class="btn btn-primary"
                        disabled=move || locked() || form.with(|f| f.is_submitting())
                    >
                        {move || if form.with(|f| f.is_submitting()) {
                            view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                        } else {
                            "Save".into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}

/// Create or edit screen for one draft type.
pub fn form_page<D: FormView>(controller: FormController<D>) -> AnyView {
    view! { <Shell>{form_body(controller)}</Shell> }.into_any()
}
