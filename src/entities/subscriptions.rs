use super::{id_text, number_text, number_value, optional_text_value};
use crate::api::AdminApi;
use crate::error::{AdminError, AdminResult};
use crate::form::Draft;
use crate::list::{Action, ListEntity};
use crate::request::HttpClient;
use crate::validate::Validator;
use aqargo_shared::date::{format_date, normalize_date, parse_date};
use aqargo_shared::protocol::{Endpoint, subscriptions};
use aqargo_shared::{EntityId, FieldErrors, Plan, Subscription, User};
use chrono::{Days, Local};
use serde_json::{Value, json};
use std::borrow::Cow;

pub const STATUSES: [&str; 4] = ["active", "expired", "cancelled", "pending"];
pub const PAYMENT_METHODS: [&str; 3] = ["credit_card", "bank_transfer", "cash"];
const DEFAULT_PLAN_DAYS: u64 = 30;

impl ListEntity for Subscription {
    const NAME: &'static str = "subscription";

    fn id(&self) -> EntityId {
        self.id
    }

    fn index() -> Endpoint {
        subscriptions::index()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = Vec::with_capacity(3);
        if let Some(user) = &self.user {
            fields.push(Cow::Borrowed(user.first_name.as_str()));
            fields.push(Cow::Borrowed(user.email.as_str()));
        }
        if let Some(plan) = &self.plan {
            fields.push(Cow::Borrowed(plan.name.as_str()));
        }
        fields
    }

    fn filter_value(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.status))
    }

    fn delete_endpoint(id: EntityId) -> Endpoint {
        subscriptions::delete(id)
    }
}

/// Extend the subscription; the row shows as active once the server agrees.
pub fn renew_action(sub: &Subscription) -> Action<Subscription> {
    Action::new(subscriptions::renew(sub.id), |s: &mut Subscription| {
        s.status = "active".to_string();
    })
    .with_body(json!({}))
}

pub fn cancel_action(sub: &Subscription) -> Action<Subscription> {
    Action::new(subscriptions::cancel(sub.id), |s: &mut Subscription| {
        s.status = "cancelled".to_string();
        s.auto_renew = false;
    })
    .with_body(json!({}))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionDraft {
    /// Subscriber email; resolved into `user_id` before saving.
    pub email: String,
    pub user_id: String,
    pub plan_id: String,
    pub start_date: String,
    pub end_date: String,
    pub price: String,
    pub status: String,
    pub auto_renew: bool,
    pub payment_method: String,
    pub notes: String,
}

impl Default for SubscriptionDraft {
    fn default() -> Self {
        Self {
            email: String::new(),
            user_id: String::new(),
            plan_id: String::new(),
            start_date: format_date(Local::now().date_naive()),
            end_date: String::new(),
            price: String::new(),
            status: "active".to_string(),
            auto_renew: false,
            payment_method: "credit_card".to_string(),
            notes: String::new(),
        }
    }
}

impl SubscriptionDraft {
    /// Picking a plan fills in its id, price and the end date it implies.
    pub fn apply_plan(&mut self, plan: &Plan) {
        self.plan_id = id_text(Some(plan.id));
        self.price = number_text(plan.price);
        let days = plan
            .duration
            .filter(|d| *d >= 1.0)
            .map(|d| d as u64)
            .unwrap_or(DEFAULT_PLAN_DAYS);
        if let Some(end) = parse_date(&self.start_date).and_then(|s| s.checked_add_days(Days::new(days))) {
            self.end_date = format_date(end);
        }
    }

    pub fn set_subscriber(&mut self, user: &User) {
        self.user_id = id_text(Some(user.id));
        self.email = user.email.clone();
    }

    /// Resolve `email` to a user id. A miss lands on the email field.
    pub async fn resolve_subscriber<C: HttpClient>(&mut self, api: &AdminApi<C>) -> AdminResult<()> {
        let email = self.email.trim().to_string();
        match api.user_by_email(&email).await {
            Ok(user) => {
                self.set_subscriber(&user);
                Ok(())
            }
            Err(AdminError::NotFound) => {
                self.user_id.clear();
                let mut errors = FieldErrors::new();
                errors.add("email", "No user found with this email");
                Err(AdminError::Validation(errors))
            }
            Err(e) => Err(e),
        }
    }
}

impl Draft for SubscriptionDraft {
    type Entity = Subscription;

    const NAME: &'static str = "subscription";
    const RETURN_PATH: &'static str = "/subscriptions";

    fn from_entity(sub: &Subscription) -> Self {
        Self {
            email: sub.user.as_ref().map(|u| u.email.clone()).unwrap_or_default(),
            user_id: id_text(sub.subscriber_id()),
            plan_id: id_text(sub.plan_ref()),
            start_date: normalize_date(&sub.start_date),
            end_date: normalize_date(&sub.end_date),
            price: number_text(sub.price),
            status: if sub.status.is_empty() {
                "active".to_string()
            } else {
                sub.status.clone()
            },
            auto_renew: sub.auto_renew,
            payment_method: sub.payment_method.clone(),
            notes: sub.notes.clone(),
        }
    }

    fn validate(&self, _editing: bool) -> FieldErrors {
        Validator::new()
            .email("email", &self.email)
            .reference("user_id", &self.user_id)
            .reference("plan_id", &self.plan_id)
            .date("start_date", &self.start_date)
            .date("end_date", &self.end_date)
            .date_after("end_date", &self.end_date, &self.start_date)
            .non_negative("price", &self.price)
            .one_of("status", &self.status, &STATUSES)
            .finish()
    }

    fn payload(&self, _editing: bool) -> Value {
        json!({
            "user_id": number_value(&self.user_id),
            "plan_id": number_value(&self.plan_id),
            "start_date": normalize_date(&self.start_date),
            "end_date": normalize_date(&self.end_date),
            "price": number_value(&self.price),
            "status": self.status,
            "auto_renew": self.auto_renew,
            "payment_method": optional_text_value(&self.payment_method),
            "notes": optional_text_value(&self.notes),
        })
    }

    fn create_endpoint() -> Endpoint {
        subscriptions::create()
    }

    fn show_endpoint(id: EntityId) -> Option<Endpoint> {
        Some(subscriptions::show(id))
    }

    fn update_endpoint(id: EntityId) -> Option<Endpoint> {
        Some(subscriptions::update(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_fills_price_and_end_date() {
        let mut draft = SubscriptionDraft {
            start_date: "2024-03-01".into(),
            ..SubscriptionDraft::default()
        };
        draft.apply_plan(&Plan {
            id: 7,
            price: Some(150.0),
            duration: Some(30.0),
            ..Plan::default()
        });
        assert_eq!(draft.plan_id, "7");
        assert_eq!(draft.price, "150");
        assert_eq!(draft.end_date, "2024-03-31");

        draft.apply_plan(&Plan {
            id: 8,
            duration: None,
            ..Plan::default()
        });
        assert_eq!(draft.end_date, "2024-03-31");
        assert_eq!(draft.price, "");
    }

    #[test]
    fn subscriber_must_be_resolved() {
        let draft = SubscriptionDraft {
            email: "buyer@aqargo.sa".into(),
            plan_id: "2".into(),
            start_date: "2024-01-01".into(),
            end_date: "2024-02-01".into(),
            price: "10".into(),
            ..SubscriptionDraft::default()
        };
        let errors = draft.validate(false);
        assert!(errors.contains("user_id"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn actions_patch_status() {
        let mut sub = Subscription {
            id: 4,
            status: "expired".into(),
            auto_renew: true,
            ..Subscription::default()
        };
        let renew = renew_action(&sub);
        assert_eq!(renew.endpoint, subscriptions::renew(4));
        assert_eq!(renew.body, Some(json!({})));

        let cancel = cancel_action(&sub);
        assert_eq!(cancel.endpoint, subscriptions::cancel(4));
        let mut list = crate::list::ListController::<Subscription>::new();
        let ticket = list.begin_load(1);
        list.apply_load(
            ticket,
            Ok(aqargo_shared::Page {
                items: vec![sub.clone()],
                info: aqargo_shared::PageInfo::single(1),
            }),
        );
        let pending = list.begin_action(4, cancel_action).expect("row present");
        list.finish_action(pending, Ok(json!({}))).expect("accepted");
        sub = list.items()[0].clone();
        assert_eq!(sub.status, "cancelled");
        assert!(!sub.auto_renew);
    }
}
