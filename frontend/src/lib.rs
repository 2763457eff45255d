//! عقار جو 管理后台前端
//!
//! Context-driven layout:
//! - `web::route`: route table (pure domain model)
//! - `web::router`: History-based router with the auth guard
//! - `auth`: session state mirrored from the core `SessionGate`
//! - `components`: UI layer on top of the core list/form controllers

mod auth;
mod components {
    pub mod dashboard;
    pub mod form_page;
    pub mod forms;
    pub mod layout;
    pub mod list_page;
    pub mod login;
    pub mod sections;
    pub mod toast;
}

use crate::auth::{AuthContext, build_config};
use crate::components::dashboard::DashboardPage;
use crate::components::form_page::form_page;
use crate::components::list_page::list_page;
use crate::components::login::LoginPage;
use crate::components::toast::{ToastHost, provide_toasts};

use aqargo_admin::entities::{
    ads::AdDraft, blocks::BlockDraft, plans::PlanDraft, properties::PropertyDraft,
    reports::ReportDraft, subscriptions::SubscriptionDraft, users::UserDraft,
};
use aqargo_admin::form::FormController;
use aqargo_shared::{Ad, Block, Plan, Property, Report, Subscription, User};
use leptos::prelude::*;

// 浏览器 API 封装 (gloo-* + web-sys)
pub(crate) mod web {
    mod console;
    mod http;
    pub mod route;
    pub mod router;
    mod storage;
    pub mod timer;

    pub use console::init_logging;
    pub use http::FetchClient;
    pub use storage::BrowserStorage;
}

pub use web::init_logging;

use web::route::{AppRoute, Section};
use web::router::{Router, RouterOutlet};

fn not_found() -> AnyView {
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"Page not found"</p>
            </div>
        </div>
    }
    .into_any()
}

/// 路由匹配函数
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),

        AppRoute::List(section) => match section {
            Section::Users => list_page::<User>(),
            Section::Properties => list_page::<Property>(),
            Section::Ads => list_page::<Ad>(),
            Section::Plans => list_page::<Plan>(),
            Section::Subscriptions => list_page::<Subscription>(),
            Section::Reports => list_page::<Report>(),
            Section::Blocks => list_page::<Block>(),
        },

        AppRoute::Create(section) => match section {
            Section::Users => form_page(FormController::<UserDraft>::new_create()),
            Section::Properties => form_page(FormController::<PropertyDraft>::new_create()),
            Section::Ads => form_page(FormController::<AdDraft>::new_create()),
            Section::Plans => form_page(FormController::<PlanDraft>::new_create()),
            Section::Subscriptions => form_page(FormController::<SubscriptionDraft>::new_create()),
            Section::Reports => form_page(FormController::<ReportDraft>::new_create()),
            Section::Blocks => not_found(),
        },

        AppRoute::Edit(section, id) => match section {
            Section::Users => form_page(FormController::<UserDraft>::new_edit(id)),
            Section::Properties => form_page(FormController::<PropertyDraft>::new_edit(id)),
            Section::Ads => form_page(FormController::<AdDraft>::new_edit(id)),
            Section::Plans => form_page(FormController::<PlanDraft>::new_edit(id)),
            Section::Subscriptions => form_page(FormController::<SubscriptionDraft>::new_edit(id)),
            Section::Reports | Section::Blocks => not_found(),
        },

        AppRoute::BlockUser(id) => form_page(FormController::with_draft(BlockDraft::for_user(id))),
        AppRoute::NotFound => not_found(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 认证上下文：恢复持久化的会话
    let auth_ctx = AuthContext::new(build_config());
    provide_context(auth_ctx);
    provide_toasts();

    // 2. 认证信号注入路由服务，路由不依赖会话实现
    let is_authenticated = auth_ctx.is_authenticated_signal();

    view! {
        <Router is_authenticated=is_authenticated>
            <ToastHost />
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
