use super::*;
use crate::config::ClientConfig;
use crate::error::AdminError;
use crate::request::{HttpMethod, MockHttpClient};
use crate::session::{MemoryStore, SessionGate};
use aqargo_shared::{Ad, Plan, Property, Report, User};
use serde_json::json;

const BASE: &str = "http://api.test";

fn setup() -> (Rc<MockHttpClient>, AdminApi<Rc<MockHttpClient>>) {
    let http = Rc::new(MockHttpClient::new());
    let gate = SessionGate::new(MemoryStore::new(), "auth");
    let config = ClientConfig::default().with_base_url(BASE);
    (http.clone(), AdminApi::new(config, http, gate))
}

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

fn users_page(http: &MockHttpClient, page: u32, rows: serde_json::Value, total: u64) {
    http.mock_response(
        HttpMethod::Get,
        &url(&format!("/api/user/getUsers?page={}", page)),
        200,
        json!({
            "status": 1,
            "data": {
                "current_page": page,
                "data": rows,
                "last_page": 3,
                "per_page": 2,
                "total": total
            }
        }),
    );
}

fn two_users() -> serde_json::Value {
    json!([
        { "id": 1, "first_name": "Sara", "last_name": "Ahmed", "email": "sara@aqargo.sa", "status": "active" },
        { "id": 2, "first_name": "Omar", "last_name": "Ali", "email": "omar@aqargo.sa", "status": "inactive" }
    ])
}

fn loaded_ads(ads: Vec<Ad>) -> ListController<Ad> {
    let mut list = ListController::<Ad>::new();
    let ticket = list.begin_load(1);
    let info = PageInfo::single(ads.len());
    assert_eq!(list.apply_load(ticket, Ok(Page { items: ads, info })), LoadOutcome::Applied);
    list
}

fn ad(id: EntityId, active: bool) -> Ad {
    Ad {
        id,
        is_active: active,
        ..Ad::default()
    }
}

// =========================================================
// 加载 (Load)
// =========================================================

#[tokio::test]
async fn load_applies_page_and_pagination() {
    let (http, api) = setup();
    users_page(&http, 2, two_users(), 6);

    let mut list = ListController::<User>::new();
    assert_eq!(list.load(&api, 2).await, LoadOutcome::Applied);

    let info = list.pagination();
    assert_eq!(list.items().len(), 2);
    assert!(list.items().len() <= info.per_page as usize);
    assert!(info.current_page >= 1 && info.current_page <= info.last_page);
    assert_eq!(info.current_page, 2);
    assert_eq!(list.server_total(), 6);
    assert!(!list.is_loading());
    assert!(list.error().is_none());
}

#[tokio::test]
async fn oversized_page_keeps_server_per_page() {
    let (http, api) = setup();
    http.mock_response(
        HttpMethod::Get,
        &url("/api/property/index?page=1"),
        200,
        json!({ "data": { "data": [{ "id": 1 }, { "id": 2 }, { "id": 3 }], "per_page": 2, "total": 3 } }),
    );
    let mut list = ListController::<Property>::new();
    list.load(&api, 1).await;
    assert_eq!(list.items().len(), 3);
    assert_eq!(list.pagination().per_page, 2);
    assert_eq!(list.server_total(), 3);
}

#[tokio::test]
async fn failed_load_clears_rows_and_reports() {
    let (http, api) = setup();
    users_page(&http, 1, two_users(), 2);
    let mut list = ListController::<User>::new();
    list.load(&api, 1).await;
    assert_eq!(list.items().len(), 2);

    http.set_offline(true);
    assert_eq!(list.refresh(&api).await, LoadOutcome::Failed);
    assert!(list.items().is_empty());
    assert_eq!(list.error(), Some("network error: connection refused"));
    assert!(!list.is_loading());
}

#[test]
fn stale_and_cancelled_results_are_dropped() {
    let mut list = ListController::<Ad>::new();
    let first = list.begin_load(1);
    let second = list.begin_load(2);

    let rows = Page {
        items: vec![ad(1, true)],
        info: PageInfo::single(1),
    };
    assert_eq!(list.apply_load(first, Ok(rows.clone())), LoadOutcome::Stale);
    assert!(list.items().is_empty());
    assert!(list.is_loading());

    list.cancel_token().cancel();
    assert_eq!(list.apply_load(second, Ok(rows)), LoadOutcome::Cancelled);
    assert!(list.items().is_empty());
}

#[tokio::test]
async fn report_filter_reloads_with_body() {
    let (http, api) = setup();
    http.mock_response(
        HttpMethod::Post,
        &url("/api/report/index"),
        200,
        json!({ "reports": { "data": [{ "id": 4, "reason": "spam" }], "current_page": 1, "total": 1 } }),
    );
    let mut list = ListController::<Report>::new();
    assert!(list.set_filter(Filter::from_choice("spam")));
    assert!(!list.set_filter(Filter::from_choice("spam")));
    list.load(&api, 1).await;

    let sent = http.last_request().unwrap();
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(sent.body, Some(json!({ "page": 1, "reason": ["spam"] })));
    assert_eq!(list.items().len(), 1);

    // Client-side filters never reload.
    let mut ads = ListController::<Ad>::new();
    assert!(!ads.set_filter(Filter::from_choice("active")));
}

// =========================================================
// 搜索与过滤 (Search & Filter)
// =========================================================

#[tokio::test]
async fn visible_is_a_subset_of_items() {
    let (http, api) = setup();
    users_page(&http, 1, two_users(), 2);
    let mut list = ListController::<User>::new();
    list.load(&api, 1).await;

    for (term, filter, expected) in [
        ("", "all", 2),
        ("SARA", "all", 1),
        ("aqargo.sa", "inactive", 1),
        ("nobody", "all", 0),
        ("", "banned", 0),
    ] {
        list.set_search(term);
        list.set_filter(Filter::from_choice(filter));
        assert_eq!(list.visible_count(), expected, "{term}/{filter}");
        assert!(list.visible_count() <= list.items().len());
        assert_eq!(list.server_total(), 2);
    }
}

// =========================================================
// 删除 (Remove)
// =========================================================

#[tokio::test]
async fn remove_is_confirmed_and_idempotent() {
    let (http, api) = setup();
    users_page(&http, 1, two_users(), 6);
    http.mock_response(HttpMethod::Delete, &url("/api/user/delete/1"), 200, json!({ "status": 1 }));

    let mut list = ListController::<User>::new();
    list.load(&api, 1).await;
    let before = http.request_count();

    assert_eq!(list.remove(&api, 1, |_| false).await, Ok(RemoveOutcome::Declined));
    assert_eq!(http.request_count(), before);

    assert_eq!(list.remove(&api, 1, |u| u.email == "sara@aqargo.sa").await, Ok(RemoveOutcome::Removed));
    assert_eq!(list.items().len(), 1);
    assert_eq!(list.server_total(), 5);

    assert_eq!(list.remove(&api, 1, |_| true).await, Ok(RemoveOutcome::NotPresent));
    assert_eq!(http.request_count(), before + 1);
    assert_eq!(list.items().len(), 1);
}

#[tokio::test]
async fn failed_remove_keeps_the_row() {
    let (http, api) = setup();
    users_page(&http, 1, two_users(), 2);
    http.mock_response(
        HttpMethod::Delete,
        &url("/api/user/delete/2"),
        500,
        json!({ "message": "constraint violation" }),
    );
    let mut list = ListController::<User>::new();
    list.load(&api, 1).await;

    let err = list.remove(&api, 2, |_| true).await.unwrap_err();
    assert_eq!(err, AdminError::server(500, "constraint violation"));
    assert_eq!(list.items().len(), 2);
    assert!(!list.is_busy(2));
}

#[test]
fn concurrent_mutations_on_one_row_are_rejected() {
    let mut list = loaded_ads(vec![ad(7, true)]);
    let endpoint = list.begin_remove(7, |_| true).unwrap();
    assert_eq!(endpoint, aqargo_shared::protocol::ads::delete(7));
    assert!(list.is_busy(7));

    assert_eq!(list.begin_remove(7, |_| true), Err(RemoveOutcome::Busy));
    assert!(list.begin_action(7, Ad::toggle_action).is_none());

    assert_eq!(list.finish_remove(7, Ok(())), Ok(RemoveOutcome::Removed));
    assert!(!list.is_busy(7));
    assert!(list.items().is_empty());
}

#[test]
fn mutations_settling_after_unmount_touch_nothing() {
    let mut list = loaded_ads(vec![ad(3, false), ad(4, true)]);
    let endpoint = list.begin_remove(4, |_| true).unwrap();
    let pending = list.begin_action(3, Ad::toggle_action).unwrap();
    assert_eq!(endpoint, aqargo_shared::protocol::ads::delete(4));

    list.cancel_token().cancel();

    assert_eq!(list.finish_remove(4, Ok(())), Err(AdminError::Cancelled));
    assert_eq!(
        list.finish_action(pending, Ok(json!({ "status": 1 }))),
        Err(AdminError::Cancelled)
    );
    assert_eq!(list.items().len(), 2);
    assert!(!list.items()[0].is_active);
    assert_eq!(list.server_total(), 2);
    assert!(!list.is_busy(3) && !list.is_busy(4));
}

// =========================================================
// 切换 (Toggle)
// =========================================================

#[tokio::test]
async fn toggle_patches_only_after_success() {
    let (http, api) = setup();
    let mut list = loaded_ads(vec![ad(5, false)]);

    // No mock registered yet: the server answers 404.
    assert_eq!(list.toggle(&api, 5).await, Err(AdminError::NotFound));
    assert!(!list.items()[0].is_active);

    http.mock_response(HttpMethod::Get, &url("/api/ad/activate/5"), 200, json!({ "status": 1 }));
    assert_eq!(list.toggle(&api, 5).await, Ok(true));
    assert!(list.items()[0].is_active);
    assert!(!list.is_busy(5));

    assert_eq!(list.toggle(&api, 99).await, Ok(false));
}

#[tokio::test]
async fn plan_toggle_rejected_in_body() {
    let (http, api) = setup();
    let mut list = ListController::<Plan>::new();
    let ticket = list.begin_load(1);
    let plan = Plan {
        id: 2,
        status: "active".into(),
        ..Plan::default()
    };
    list.apply_load(
        ticket,
        Ok(Page {
            items: vec![plan],
            info: PageInfo::single(1),
        }),
    );

    http.mock_response(
        HttpMethod::Put,
        &url("/api/plans/2/status"),
        200,
        json!({ "success": false, "message": "Plan has active subscribers" }),
    );
    let err = list.toggle(&api, 2).await.unwrap_err();
    assert_eq!(err, AdminError::server(200, "Plan has active subscribers"));
    assert_eq!(list.items()[0].status, "active");
    assert_eq!(http.last_request().unwrap().body, Some(json!({ "status": "inactive" })));
}

// =========================================================
// 分页窗口 (Pagination Window)
// =========================================================

#[test]
fn page_window_is_clamped() {
    assert_eq!(
        page_window(1, 1),
        PageWindow {
            pages: vec![1],
            current: 1,
            has_prev: false,
            has_next: false
        }
    );
    assert_eq!(page_window(5, 10).pages, vec![3, 4, 5, 6, 7]);
    assert_eq!(page_window(2, 10).pages, vec![1, 2, 3, 4]);
    assert_eq!(page_window(10, 10).pages, vec![8, 9, 10]);
    let w = page_window(12, 3);
    assert_eq!(w.current, 3);
    assert!(w.has_prev && !w.has_next);
    assert_eq!(page_window(0, 0).pages, vec![1]);
}
