//! Inputs for each create/edit screen.

use crate::auth::use_auth;
use crate::components::form_page::{Field, FieldKind, FormSignal, FormView};
use crate::components::toast::use_toasts;
use aqargo_admin::entities::ads::AdDraft;
use aqargo_admin::entities::blocks::BlockDraft;
use aqargo_admin::entities::properties::{
    self, LAND_SLOPES, LAND_TYPES, PROPERTY_TYPES, PropertyDraft, SHOP_TYPES,
};
use aqargo_admin::entities::plans::{PlanDraft, STATUS_ACTIVE, STATUS_INACTIVE};
use aqargo_admin::entities::reports::ReportDraft;
use aqargo_admin::entities::subscriptions::{self, SubscriptionDraft};
use aqargo_admin::entities::users::UserDraft;
use aqargo_admin::list::ListEntity;
use aqargo_shared::protocol::users;
use aqargo_shared::{Plan, PlanType, ReportReason, User};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::warn;

fn same(values: &'static [&'static str]) -> Vec<(&'static str, &'static str)> {
    values.iter().map(|v| (*v, *v)).collect()
}

fn flag(on: bool) -> String {
    on.to_string()
}

// =========================================================
// 用户 (Users)
// =========================================================

impl FormView for UserDraft {
    const TITLE: &'static str = "user";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::<Self>::new("first_name", "First name", FieldKind::Text, |d| d.first_name.clone(), |d, v| d.first_name = v),
            Field::<Self>::new("last_name", "Last name", FieldKind::Text, |d| d.last_name.clone(), |d, v| d.last_name = v),
            Field::<Self>::new("email", "Email", FieldKind::Email, |d| d.email.clone(), |d, v| d.email = v),
            Field::<Self>::new("phone_number", "Phone", FieldKind::Text, |d| d.phone_number.clone(), |d, v| d.phone_number = v),
            Field::<Self>::new("password", "Password", FieldKind::Password, |d| d.password.clone(), |d, v| d.password = v),
            Field::<Self>::new(
                "password_confirmation",
                "Confirm password",
                FieldKind::Password,
                |d| d.password_confirmation.clone(),
                |d, v| d.password_confirmation = v,
            ),
        ]
    }
}

// =========================================================
// 房产 (Properties)
// =========================================================

impl FormView for PropertyDraft {
    const TITLE: &'static str = "property";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::<Self>::new("title", "Title", FieldKind::Text, |d| d.title.clone(), |d, v| d.title = v),
            Field::<Self>::new(
                "type",
                "Type",
                FieldKind::Select(|| same(&PROPERTY_TYPES)),
                |d| d.kind.clone(),
                |d, v| d.kind = v,
            ),
            Field::<Self>::new("price", "Price", FieldKind::Number, |d| d.price.clone(), |d, v| d.price = v),
            Field::<Self>::new("area", "Area (m²)", FieldKind::Number, |d| d.area.clone(), |d, v| d.area = v),
            Field::<Self>::new("city", "City", FieldKind::Text, |d| d.city.clone(), |d, v| d.city = v),
            Field::<Self>::new("district", "District", FieldKind::Text, |d| d.district.clone(), |d, v| d.district = v),
            Field::<Self>::new("address", "Address", FieldKind::Text, |d| d.address.clone(), |d, v| d.address = v),
            Field::<Self>::new(
                "status",
                "Status",
                FieldKind::Select(|| same(&properties::STATUSES)),
                |d| d.status.clone(),
                |d, v| d.status = v,
            ),
            Field::<Self>::new("bedrooms", "Bedrooms", FieldKind::Number, |d| d.bedrooms.clone(), |d, v| d.bedrooms = v)
                .shown_when(|d| !d.is_land()),
            Field::<Self>::new("bathrooms", "Bathrooms", FieldKind::Number, |d| d.bathrooms.clone(), |d, v| d.bathrooms = v)
                .shown_when(|d| !d.is_land()),
            Field::<Self>::new(
                "land_type",
                "Land use",
                FieldKind::Select(|| same(&LAND_TYPES)),
                |d| d.land_type.clone(),
                |d, v| d.land_type = v,
            )
            .shown_when(PropertyDraft::is_land),
            Field::<Self>::new(
                "land_slope",
                "Terrain",
                FieldKind::Select(|| same(&LAND_SLOPES)),
                |d| d.land_slope.clone(),
                |d, v| d.land_slope = v,
            )
            .shown_when(PropertyDraft::is_land),
            Field::<Self>::new(
                "shop_type",
                "Shop type",
                FieldKind::Select(|| same(&SHOP_TYPES)),
                |d| d.shop_type.clone(),
                |d, v| d.shop_type = v,
            )
            .shown_when(PropertyDraft::is_shop),
            Field::<Self>::new(
                "description",
                "Description",
                FieldKind::TextArea,
                |d| d.description.clone(),
                |d, v| d.description = v,
            ),
        ]
    }
}

// =========================================================
// 广告 (Ads)
// =========================================================

impl FormView for AdDraft {
    const TITLE: &'static str = "ad";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::<Self>::new(
                "property_id",
                "Property number",
                FieldKind::Number,
                |d| d.property_id.clone(),
                |d, v| d.property_id = v,
            ),
            Field::<Self>::new("start_date", "Start date", FieldKind::Date, |d| d.start_date.clone(), |d, v| d.start_date = v),
            Field::<Self>::new("end_date", "End date", FieldKind::Date, |d| d.end_date.clone(), |d, v| d.end_date = v),
            Field::<Self>::new("is_active", "Active", FieldKind::Checkbox, |d| flag(d.is_active), |d, v| {
                d.is_active = v == "true"
            }),
        ]
    }
}

// =========================================================
// 套餐 (Plans)
// =========================================================

impl FormView for PlanDraft {
    const TITLE: &'static str = "plan";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::<Self>::new("name", "Name", FieldKind::Text, |d| d.name.clone(), |d, v| d.name = v),
            Field::<Self>::new("price", "Price", FieldKind::Number, |d| d.price.clone(), |d, v| d.price = v),
            Field::<Self>::new(
                "type",
                "Billing",
                FieldKind::Select(|| {
                    vec![
                        (PlanType::Monthly.as_str(), "Monthly"),
                        (PlanType::Yearly.as_str(), "Yearly"),
                    ]
                }),
                |d| d.kind.clone(),
                |d, v| d.kind = v,
            ),
            Field::<Self>::new("duration", "Duration (days)", FieldKind::Number, |d| d.duration.clone(), |d, v| d.duration = v),
            Field::<Self>::new(
                "status",
                "Status",
                FieldKind::Select(|| vec![(STATUS_ACTIVE, "Active"), (STATUS_INACTIVE, "Inactive")]),
                |d| d.status.clone(),
                |d, v| d.status = v,
            ),
            Field::<Self>::new(
                "features",
                "Features (one per line)",
                FieldKind::TextArea,
                |d| d.features.clone(),
                |d, v| d.features = v,
            ),
        ]
    }
}

// =========================================================
// 订阅 (Subscriptions)
// =========================================================

/// Subscriber lookup by email and the plan picker.
#[component]
fn SubscriptionTools(form: FormSignal<SubscriptionDraft>) -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let plans = RwSignal::new(Vec::<Plan>::new());
    let finding = RwSignal::new(false);

    spawn_local(async move {
        match auth.api().fetch_page::<Plan>(&Plan::index(), None).await {
            Ok(page) => plans.set(page.items),
            Err(e) => toasts.err(e.to_string()),
        }
    });

    let find_user = move |_| {
        let mut draft = form.with_untracked(|f| f.draft().clone());
        finding.set(true);
        spawn_local(async move {
            let outcome = draft.resolve_subscriber(&auth.api()).await;
            finding.set(false);
            form.try_update(|f| match outcome {
                Ok(()) => {
                    f.edit("email", |d| d.email = draft.email);
                    f.edit("user_id", |d| d.user_id = draft.user_id);
                }
                Err(e) => {
                    f.edit("user_id", |d| d.user_id.clear());
                    f.reject(e);
                }
            });
        });
    };

    let on_plan = move |ev: leptos::ev::Event| {
        let chosen = event_target_value(&ev).parse::<u64>().ok();
        let plan = chosen.and_then(|id| plans.with_untracked(|ps| ps.iter().find(|p| p.id == id).cloned()));
        if let Some(plan) = plan {
            form.update(|f| f.edit("plan_id", |d| d.apply_plan(&plan)));
        }
    };

    let subscriber = move || {
        form.with(|f| {
            let d = f.draft();
            if d.user_id.is_empty() {
                "No subscriber selected".to_string()
            } else {
                format!("Subscriber #{}", d.user_id)
            }
        })
    };
    let error = move |name: &'static str| {
        move || {
            form.with(|f| f.error(name).map(str::to_string))
                .map(|msg| view! { <span class="label-text-alt text-error">{msg}</span> })
        }
    };

    view! {
        <div class="form-control md:col-span-2">
            <label class="label">
                <span class="label-text">"Subscriber email"</span>
                <span class="label-text-alt">{subscriber}</span>
            </label>
            <div class="join">
                <input
                    type="email"
                    class="input input-bordered join-item flex-1"
                    prop:value=move || form.with(|f| f.draft().email.clone())
                    on:input=move |ev| {
                        let email = event_target_value(&ev);
                        form.update(|f| f.edit("email", |d| {
                            d.email = email;
                            d.user_id.clear();
                        }));
                    }
                />
                <button
                    type="button"
                    class="btn join-item"
                    disabled=move || finding.get()
                    on:click=find_user
                >
                    "Find user"
                </button>
            </div>
            <label class="label">{error("email")} {error("user_id")}</label>
        </div>
        <div class="form-control md:col-span-2">
            <label class="label">
                <span class="label-text">"Plan"</span>
            </label>
            <select class="select select-bordered" on:change=on_plan>
                <option value="">"Choose a plan..."</option>
                {move || {
                    plans
                        .get()
                        .into_iter()
                        .map(|plan| {
                            let id = plan.id.to_string();
                            let selected = {
                                let id = id.clone();
                                move || form.with(|f| f.draft().plan_id == id)
                            };
                            view! { <option value=id selected=selected>{plan.name}</option> }
                        })
                        .collect_view()
                }}
            </select>
            <label class="label">{error("plan_id")}</label>
        </div>
    }
}

impl FormView for SubscriptionDraft {
    const TITLE: &'static str = "subscription";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::<Self>::new("start_date", "Start date", FieldKind::Date, |d| d.start_date.clone(), |d, v| d.start_date = v),
            Field::<Self>::new("end_date", "End date", FieldKind::Date, |d| d.end_date.clone(), |d, v| d.end_date = v),
            Field::<Self>::new("price", "Price", FieldKind::Number, |d| d.price.clone(), |d, v| d.price = v),
            Field::<Self>::new(
                "status",
                "Status",
                FieldKind::Select(|| same(&subscriptions::STATUSES)),
                |d| d.status.clone(),
                |d, v| d.status = v,
            ),
            Field::<Self>::new(
                "payment_method",
                "Payment method",
                FieldKind::Select(|| same(&subscriptions::PAYMENT_METHODS)),
                |d| d.payment_method.clone(),
                |d, v| d.payment_method = v,
            ),
            Field::<Self>::new("auto_renew", "Auto renew", FieldKind::Checkbox, |d| flag(d.auto_renew), |d, v| {
                d.auto_renew = v == "true"
            }),
            Field::<Self>::new("notes", "Notes", FieldKind::TextArea, |d| d.notes.clone(), |d, v| d.notes = v),
        ]
    }

    fn extras(form: FormSignal<Self>) -> Option<AnyView> {
        Some(view! { <SubscriptionTools form=form /> }.into_any())
    }
}

// =========================================================
// 举报 (Reports)
// =========================================================

impl FormView for ReportDraft {
    const TITLE: &'static str = "report";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::<Self>::new("ad_id", "Ad number", FieldKind::Number, |d| d.ad_id.clone(), |d, v| d.ad_id = v),
            Field::<Self>::new(
                "reason",
                "Reason",
                FieldKind::Select(|| {
                    ReportReason::ALL
                        .iter()
                        .map(|r| (r.as_str(), r.label()))
                        .collect()
                }),
                |d| d.reason.clone(),
                |d, v| d.reason = v,
            ),
            Field::<Self>::new(
                "description",
                "Description",
                FieldKind::TextArea,
                |d| d.description.clone(),
                |d, v| d.description = v,
            ),
        ]
    }
}

// =========================================================
// 封禁 (Blocks)
// =========================================================

/// Who is being blocked; duplicate-block errors land here.
#[component]
fn BlockedUser(form: FormSignal<BlockDraft>) -> impl IntoView {
    let auth = use_auth();
    let user = RwSignal::new(None::<User>);
    let id = form.with_untracked(|f| f.draft().blocked_id.clone());

    if let Ok(user_id) = id.parse::<u64>() {
        spawn_local(async move {
            match auth.api().fetch_one::<User>(&users::show(user_id)).await {
                Ok(found) => user.set(Some(found)),
                Err(e) => warn!(user_id, error = %e, "could not load user to block"),
            }
        });
    }

    let who = move || match user.get() {
        Some(u) => format!("{} ({})", u.full_name(), u.email),
        None => format!("User #{id}"),
    };

    view! {
        <div class="md:col-span-2">
            <p class="font-semibold">{who}</p>
            {move || {
                form.with(|f| f.error("blocked_id").map(str::to_string))
                    .map(|msg| view! { <p class="text-error text-sm">{msg}</p> })
            }}
        </div>
    }
}

impl FormView for BlockDraft {
    const TITLE: &'static str = "block";

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::<Self>::new(
                "days",
                "Days (empty for permanent)",
                FieldKind::Number,
                |d| d.days.clone(),
                |d, v| d.days = v,
            ),
            Field::<Self>::new("reason", "Reason", FieldKind::TextArea, |d| d.reason.clone(), |d, v| d.reason = v),
        ]
    }

    fn extras(form: FormSignal<Self>) -> Option<AnyView> {
        Some(view! { <BlockedUser form=form /> }.into_any())
    }
}
