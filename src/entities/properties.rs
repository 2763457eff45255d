use super::{number_text, number_value, optional_number_value, optional_text_value};
use crate::form::Draft;
use crate::list::ListEntity;
use crate::validate::Validator;
use aqargo_shared::protocol::{Endpoint, properties};
use aqargo_shared::{EntityId, FieldErrors, Property};
use serde_json::{Value, json};
use std::borrow::Cow;

/// Property type values as stored by the backend.
pub const PROPERTY_TYPES: [&str; 6] = ["شقة", "محل", "مكتب", "قطعة أرض", "فيلا", "استوديو"];
pub const TYPE_LAND: &str = "قطعة أرض";
pub const TYPE_SHOP: &str = "محل";

pub const LAND_TYPES: [&str; 4] = ["سكني", "تجاري", "صناعي", "زراعي"];
pub const LAND_SLOPES: [&str; 3] = ["مسطحة", "منحدرة", "جبلية"];
pub const SHOP_TYPES: [&str; 6] = ["تجاري", "مطعم", "مكتبة", "صيدلية", "ملابس", "إلكترونيات"];

pub const STATUSES: [&str; 5] = ["active", "inactive", "sold", "rented", "pending"];

impl ListEntity for Property {
    const NAME: &'static str = "property";

    fn id(&self) -> EntityId {
        self.id
    }

    fn index() -> Endpoint {
        properties::index()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.title),
            Cow::Borrowed(&self.owner),
            Cow::Borrowed(&self.address),
        ]
    }

    fn filter_value(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.status))
    }

    fn delete_endpoint(id: EntityId) -> Endpoint {
        properties::delete(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub kind: String,
    pub price: String,
    pub city: String,
    pub district: String,
    pub address: String,
    pub area: String,
    pub status: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub land_type: String,
    pub land_slope: String,
    pub shop_type: String,
}

impl Default for PropertyDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            kind: String::new(),
            price: String::new(),
            city: String::new(),
            district: String::new(),
            address: String::new(),
            area: String::new(),
            status: "pending".to_string(),
            bedrooms: String::new(),
            bathrooms: String::new(),
            land_type: String::new(),
            land_slope: String::new(),
            shop_type: String::new(),
        }
    }
}

impl PropertyDraft {
    pub fn is_land(&self) -> bool {
        self.kind == TYPE_LAND
    }

    pub fn is_shop(&self) -> bool {
        self.kind == TYPE_SHOP
    }
}

impl Draft for PropertyDraft {
    type Entity = Property;

    const NAME: &'static str = "property";
    const RETURN_PATH: &'static str = "/properties";

    fn from_entity(p: &Property) -> Self {
        Self {
            title: p.title.clone(),
            description: p.description.clone(),
            kind: p.kind.clone(),
            price: number_text(p.price),
            city: p.city.clone(),
            district: p.district.clone(),
            address: p.address.clone(),
            area: number_text(p.area),
            status: if p.status.is_empty() {
                "pending".to_string()
            } else {
                p.status.clone()
            },
            bedrooms: number_text(p.bedrooms),
            bathrooms: number_text(p.bathrooms),
            land_type: p.land_type.clone().unwrap_or_default(),
            land_slope: p.land_slope.clone().unwrap_or_default(),
            shop_type: p.shop_type.clone().unwrap_or_default(),
        }
    }

    fn validate(&self, _editing: bool) -> FieldErrors {
        let mut v = Validator::new();
        v.required("title", &self.title)
            .required("type", &self.kind)
            .positive("price", &self.price)
            .required("city", &self.city)
            .positive("area", &self.area)
            .one_of("status", &self.status, &STATUSES)
            .optional_positive_integer("bedrooms", &self.bedrooms)
            .optional_positive_integer("bathrooms", &self.bathrooms);
        if self.is_land() {
            v.required("land_type", &self.land_type)
                .required("land_slope", &self.land_slope);
        }
        if self.is_shop() {
            v.required("shop_type", &self.shop_type);
        }
        v.finish()
    }

    fn payload(&self, _editing: bool) -> Value {
        let mut body = json!({
            "title": self.title.trim(),
            "description": self.description.trim(),
            "type": self.kind,
            "price": number_value(&self.price),
            "city": self.city,
            "district": self.district.trim(),
            "address": self.address.trim(),
            "area": number_value(&self.area),
            "status": self.status,
            "bedrooms": optional_number_value(&self.bedrooms),
            "bathrooms": optional_number_value(&self.bathrooms),
        });
        if self.is_land() {
            body["land_type"] = optional_text_value(&self.land_type);
            body["land_slope"] = optional_text_value(&self.land_slope);
        }
        if self.is_shop() {
            body["shop_type"] = optional_text_value(&self.shop_type);
        }
        body
    }

    fn create_endpoint() -> Endpoint {
        properties::create()
    }

    fn show_endpoint(id: EntityId) -> Option<Endpoint> {
        Some(properties::show(id))
    }

    fn update_endpoint(id: EntityId) -> Option<Endpoint> {
        Some(properties::update(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apartment() -> PropertyDraft {
        PropertyDraft {
            title: "شقة فاخرة".into(),
            kind: "شقة".into(),
            price: "500000".into(),
            city: "الرياض".into(),
            area: "120".into(),
            ..PropertyDraft::default()
        }
    }

    #[test]
    fn type_specific_fields_are_required_only_for_their_type() {
        assert!(apartment().validate(false).is_empty());

        let land = PropertyDraft {
            kind: TYPE_LAND.into(),
            ..apartment()
        };
        let errors = land.validate(false);
        assert!(errors.contains("land_type"));
        assert!(errors.contains("land_slope"));
        assert!(!errors.contains("shop_type"));

        let shop = PropertyDraft {
            kind: TYPE_SHOP.into(),
            shop_type: "مطعم".into(),
            ..apartment()
        };
        assert!(shop.validate(false).is_empty());
        assert_eq!(shop.payload(false)["shop_type"], "مطعم");
        assert!(shop.payload(false).get("land_type").is_none());
    }

    #[test]
    fn price_and_area_must_be_positive() {
        let draft = PropertyDraft {
            price: "0".into(),
            area: "-3".into(),
            ..apartment()
        };
        let errors = draft.validate(false);
        assert!(errors.contains("price"));
        assert!(errors.contains("area"));
    }
}
