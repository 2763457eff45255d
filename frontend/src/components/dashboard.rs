use crate::auth::{Api, use_auth};
use crate::components::layout::Shell;
use crate::web::route::{AppRoute, Section};
use crate::web::router::Link;
use aqargo_admin::list::{Filter, ListEntity};
use aqargo_admin::AdminResult;
use aqargo_shared::{Ad, Property, Subscription, User};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Server-side total from the first index page.
async fn total_of<E: ListEntity>(api: &Api) -> AdminResult<u64> {
    let body = E::index_body(1, &Filter::All);
    let page = api.fetch_page::<E>(&E::index(), body.as_ref()).await?;
    Ok(page.info.total)
}

#[component]
fn StatCard(section: Section, total: RwSignal<Option<AdminResult<u64>>>) -> impl IntoView {
    let value = move || match total.get() {
        None => view! { <span class="loading loading-spinner loading-md"></span> }.into_any(),
        Some(Ok(n)) => n.to_string().into_any(),
        Some(Err(_)) => "-".into_any(),
    };
    let desc = move || match total.get() {
        Some(Err(e)) => e.to_string(),
        _ => String::new(),
    };

    view! {
        <div class="stat">
            <div class="stat-title">{section.title()}</div>
            <div class="stat-value text-primary">{value}</div>
            <div class="stat-desc text-error">{desc}</div>
            <div class="stat-actions">
                <Link to=AppRoute::List(section).to_path() class="btn btn-xs btn-ghost">
                    "Manage"
                </Link>
            </div>
        </div>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();

    let users = RwSignal::new(None);
    let properties = RwSignal::new(None);
    let ads = RwSignal::new(None);
    let subscriptions = RwSignal::new(None);

    spawn_local(async move {
        let api = auth.api();
        users.set(Some(total_of::<User>(&api).await));
        properties.set(Some(total_of::<Property>(&api).await));
        ads.set(Some(total_of::<Ad>(&api).await));
        subscriptions.set(Some(total_of::<Subscription>(&api).await));
    });

    view! {
        <Shell>
            <div>
                <h2 class="text-2xl font-bold">"Dashboard"</h2>
                <p class="text-base-content/70 text-sm">"Welcome, " {move || auth.display_name().get()}</p>
            </div>
            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <StatCard section=Section::Users total=users />
                <StatCard section=Section::Properties total=properties />
                <StatCard section=Section::Ads total=ads />
                <StatCard section=Section::Subscriptions total=subscriptions />
            </div>
        </Shell>
    }
}
