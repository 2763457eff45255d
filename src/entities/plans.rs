use super::{number_text, number_value};
use crate::form::Draft;
use crate::list::{Action, ListEntity, Toggle};
use crate::validate::Validator;
use aqargo_shared::protocol::{Endpoint, PlanStatusRequest, plans};
use aqargo_shared::{EntityId, FieldErrors, Plan, PlanType};
use serde_json::{Value, json};
use std::borrow::Cow;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_FEATURES_LEN: usize = 65_535;
pub const DEFAULT_DURATION_DAYS: &str = "30";

impl ListEntity for Plan {
    const NAME: &'static str = "plan";

    fn id(&self) -> EntityId {
        self.id
    }

    fn index() -> Endpoint {
        plans::index()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.name)]
    }

    fn filter_value(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.status))
    }

    fn delete_endpoint(id: EntityId) -> Endpoint {
        plans::delete(id)
    }
}

impl Toggle for Plan {
    fn is_on(&self) -> bool {
        self.is_active()
    }

    fn toggle_action(&self) -> Action<Self> {
        let next = if self.is_active() {
            STATUS_INACTIVE
        } else {
            STATUS_ACTIVE
        };
        let body = json!(PlanStatusRequest {
            status: next.to_string(),
        });
        Action::new(plans::status(self.id), move |plan: &mut Plan| {
            plan.status = next.to_string();
        })
        .with_body(body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanDraft {
    pub name: String,
    pub price: String,
    pub kind: String,
    pub duration: String,
    /// One feature per line.
    pub features: String,
    pub status: String,
}

impl Default for PlanDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            price: String::new(),
            kind: PlanType::Monthly.as_str().to_string(),
            duration: DEFAULT_DURATION_DAYS.to_string(),
            features: String::new(),
            status: STATUS_ACTIVE.to_string(),
        }
    }
}

impl Draft for PlanDraft {
    type Entity = Plan;

    const NAME: &'static str = "plan";
    const RETURN_PATH: &'static str = "/plans";

    fn from_entity(plan: &Plan) -> Self {
        let defaults = Self::default();
        Self {
            name: plan.name.clone(),
            price: number_text(plan.price),
            kind: PlanType::parse(&plan.kind)
                .map(|t| t.as_str().to_string())
                .unwrap_or(defaults.kind),
            duration: match plan.duration {
                Some(_) => number_text(plan.duration),
                None => defaults.duration,
            },
            features: plan.features.clone(),
            status: if plan.status.is_empty() {
                defaults.status
            } else {
                plan.status.clone()
            },
        }
    }

    fn validate(&self, _editing: bool) -> FieldErrors {
        Validator::new()
            .required("name", &self.name)
            .max_len("name", &self.name, MAX_NAME_LEN)
            .non_negative("price", &self.price)
            .positive_integer("duration", &self.duration)
            .required("features", &self.features)
            .max_len("features", &self.features, MAX_FEATURES_LEN)
            .one_of(
                "type",
                &self.kind,
                &[PlanType::Monthly.as_str(), PlanType::Yearly.as_str()],
            )
            .one_of("status", &self.status, &[STATUS_ACTIVE, STATUS_INACTIVE])
            .finish()
    }

    fn payload(&self, _editing: bool) -> Value {
        json!({
            "name": self.name.trim(),
            "price": number_value(&self.price),
            "type": self.kind,
            "duration": number_value(&self.duration),
            "features": self.features.trim(),
            "status": self.status,
        })
    }

    fn create_endpoint() -> Endpoint {
        plans::create()
    }

    fn show_endpoint(id: EntityId) -> Option<Endpoint> {
        Some(plans::show(id))
    }

    fn update_endpoint(id: EntityId) -> Option<Endpoint> {
        Some(plans::update(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_sends_the_next_status() {
        let plan = Plan {
            id: 3,
            status: STATUS_ACTIVE.into(),
            ..Plan::default()
        };
        let action = plan.toggle_action();
        assert_eq!(action.endpoint, plans::status(3));
        assert_eq!(action.body, Some(json!({ "status": "inactive" })));
        assert!(plan.is_on());
    }

    #[test]
    fn free_plan_is_allowed_but_duration_must_be_whole() {
        let draft = PlanDraft {
            name: "Basic".into(),
            price: "0".into(),
            features: "5 listings\nSupport".into(),
            ..PlanDraft::default()
        };
        assert!(draft.validate(false).is_empty());
        let body = draft.payload(false);
        assert_eq!(body["price"], json!(0));
        assert_eq!(body["duration"], json!(30));
        assert_eq!(body["type"], "monthly");

        let fractional = PlanDraft {
            duration: "1.5".into(),
            kind: "weekly".into(),
            ..draft
        };
        let errors = fractional.validate(false);
        assert!(errors.contains("duration"));
        assert!(errors.contains("type"));
    }

    #[test]
    fn loaded_plan_keeps_its_values() {
        let plan = Plan {
            id: 1,
            name: "Gold".into(),
            price: Some(99.5),
            kind: "yearly".into(),
            duration: Some(365.0),
            features: "a\nb".into(),
            status: "inactive".into(),
        };
        let draft = PlanDraft::from_entity(&plan);
        assert_eq!(draft.price, "99.5");
        assert_eq!(draft.duration, "365");
        assert_eq!(draft.kind, "yearly");
        assert_eq!(draft.status, "inactive");
    }
}
