use super::id_text;
use crate::form::Draft;
use crate::list::{Action, ListEntity, Toggle};
use crate::validate::Validator;
use aqargo_shared::date::normalize_date;
use aqargo_shared::protocol::{Endpoint, ads};
use aqargo_shared::{Ad, EntityId, FieldErrors};
use serde_json::{Value, json};
use std::borrow::Cow;

pub const FILTER_ACTIVE: &str = "active";
pub const FILTER_INACTIVE: &str = "inactive";

impl ListEntity for Ad {
    const NAME: &'static str = "ad";

    fn id(&self) -> EntityId {
        self.id
    }

    fn index() -> Endpoint {
        ads::index()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.title()), Cow::Owned(self.id.to_string())]
    }

    fn filter_value(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(if self.is_active {
            FILTER_ACTIVE
        } else {
            FILTER_INACTIVE
        }))
    }

    fn delete_endpoint(id: EntityId) -> Endpoint {
        ads::delete(id)
    }
}

impl Toggle for Ad {
    fn is_on(&self) -> bool {
        self.is_active
    }

    fn toggle_action(&self) -> Action<Self> {
        let activate = !self.is_active;
        let endpoint = if activate {
            ads::activate(self.id)
        } else {
            ads::deactivate(self.id)
        };
        Action::new(endpoint, move |ad: &mut Ad| ad.is_active = activate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdDraft {
    pub property_id: String,
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
}

impl Default for AdDraft {
    fn default() -> Self {
        Self {
            property_id: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            is_active: true,
        }
    }
}

impl Draft for AdDraft {
    type Entity = Ad;

    const NAME: &'static str = "ad";
    const RETURN_PATH: &'static str = "/ads";

    fn from_entity(ad: &Ad) -> Self {
        let property_id = if ad.property_id > 0 {
            Some(ad.property_id)
        } else {
            ad.property.as_ref().map(|p| p.id)
        };
        Self {
            property_id: id_text(property_id),
            start_date: normalize_date(&ad.start_date),
            end_date: normalize_date(&ad.end_date),
            is_active: ad.is_active,
        }
    }

    fn validate(&self, _editing: bool) -> FieldErrors {
        Validator::new()
            .reference("property_id", &self.property_id)
            .date("start_date", &self.start_date)
            .date("end_date", &self.end_date)
            .date_after("end_date", &self.end_date, &self.start_date)
            .finish()
    }

    fn payload(&self, _editing: bool) -> Value {
        json!({
            "property_id": self.property_id.trim().parse::<u64>().unwrap_or_default(),
            "start_date": normalize_date(&self.start_date),
            "end_date": normalize_date(&self.end_date),
            "is_active": self.is_active,
        })
    }

    fn create_endpoint() -> Endpoint {
        ads::create()
    }

    fn show_endpoint(id: EntityId) -> Option<Endpoint> {
        Some(ads::show(id))
    }

    fn update_endpoint(id: EntityId) -> Option<Endpoint> {
        Some(ads::update(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqargo_shared::Property;

    #[test]
    fn toggle_picks_endpoint_from_current_state() {
        let ad = Ad {
            id: 5,
            is_active: true,
            ..Ad::default()
        };
        let action = ad.toggle_action();
        assert_eq!(action.endpoint, ads::deactivate(5));

        let inactive = Ad {
            is_active: false,
            ..ad
        };
        assert_eq!(inactive.toggle_action().endpoint, ads::activate(5));
    }

    #[test]
    fn property_id_falls_back_to_embedded_property() {
        let ad = Ad {
            id: 1,
            property_id: 0,
            start_date: "2024-01-01T00:00:00.000000Z".into(),
            end_date: "2024-01-31 00:00:00".into(),
            is_active: false,
            property: Some(Property {
                id: 42,
                ..Property::default()
            }),
        };
        let draft = AdDraft::from_entity(&ad);
        assert_eq!(draft.property_id, "42");
        assert_eq!(draft.start_date, "2024-01-01");
        assert_eq!(draft.end_date, "2024-01-31");
        assert!(!draft.is_active);
    }
}
