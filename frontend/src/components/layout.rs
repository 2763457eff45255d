//! 页面框架 (header + sidebar)

use crate::auth::{logout, use_auth};
use crate::web::route::{AppRoute, Section};
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::warn;

#[component]
fn Header() -> impl IntoView {
    let auth = use_auth();
    let name = auth.display_name();
    let unread = RwSignal::new(0u64);

    // 未读通知数，只在挂载时拉取一次
    spawn_local(async move {
        match auth.api().unread_count().await {
            Ok(count) => unread.set(count),
            Err(e) => warn!(error = %e, "unread count unavailable"),
        }
    });

    let on_logout = move |_| logout(&auth);

    view! {
        <div class="navbar bg-base-100 shadow">
            <div class="flex-1">
                <Link to=AppRoute::Dashboard.to_path() class="btn btn-ghost text-xl">
                    "عقار جو"
                </Link>
            </div>
            <div class="flex-none gap-3">
                <div class="indicator">
                    <Show when=move || { unread.get() > 0 }>
                        <span class="indicator-item badge badge-secondary">{move || unread.get()}</span>
                    </Show>
                    <span class="btn btn-ghost btn-sm">"Notifications"</span>
                </div>
                <span class="text-sm opacity-70">{move || name.get()}</span>
                <button on:click=on_logout class="btn btn-outline btn-error btn-sm">
                    "Log out"
                </button>
            </div>
        </div>
    }
}

#[component]
fn Sidebar() -> impl IntoView {
    let router = use_router();
    let active = move || router.current_route().with(AppRoute::section);

    let item = move |section: Section| {
        let class = move || {
            if active() == Some(section) {
                "active".to_string()
            } else {
                String::new()
            }
        };
        view! {
            <li>
                <a
                    href=AppRoute::List(section).to_path()
                    class=class
                    on:click=move |ev: leptos::ev::MouseEvent| {
                        ev.prevent_default();
                        router.navigate_to(AppRoute::List(section));
                    }
                >
                    {section.title()}
                </a>
            </li>
        }
    };

    view! {
        <aside class="w-56 shrink-0">
            <ul class="menu bg-base-100 rounded-box shadow">
                <li>
                    <Link to=AppRoute::Dashboard.to_path()>"Dashboard"</Link>
                </li>
                {Section::ALL.into_iter().map(item).collect_view()}
            </ul>
        </aside>
    }
}

/// Authenticated page frame.
#[component]
pub fn Shell(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <Header />
            <div class="flex gap-6 p-4 md:p-8">
                <Sidebar />
                <main class="flex-1 min-w-0 space-y-6">{children()}</main>
            </div>
        </div>
    }
}
