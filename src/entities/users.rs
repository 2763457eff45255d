use crate::form::Draft;
use crate::list::ListEntity;
use crate::validate::Validator;
use aqargo_shared::protocol::{Endpoint, users};
use aqargo_shared::{EntityId, FieldErrors, User};
use serde_json::{Value, json};
use std::borrow::Cow;

pub const MIN_PASSWORD_LEN: usize = 8;

impl ListEntity for User {
    const NAME: &'static str = "user";

    fn id(&self) -> EntityId {
        self.id
    }

    fn index() -> Endpoint {
        users::index()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.first_name),
            Cow::Borrowed(&self.last_name),
            Cow::Borrowed(&self.email),
        ]
    }

    fn filter_value(&self) -> Option<Cow<'_, str>> {
        self.status.as_deref().map(Cow::Borrowed)
    }

    fn delete_endpoint(id: EntityId) -> Endpoint {
        users::delete(id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// Blank on edit means "keep the current password".
    pub password: String,
    pub password_confirmation: String,
}

impl Draft for UserDraft {
    type Entity = User;

    const NAME: &'static str = "user";
    const RETURN_PATH: &'static str = "/users";

    fn from_entity(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            ..Self::default()
        }
    }

    fn validate(&self, editing: bool) -> FieldErrors {
        let mut v = Validator::new();
        v.required("first_name", &self.first_name)
            .required("last_name", &self.last_name)
            .email("email", &self.email)
            .phone("phone_number", &self.phone_number);
        if !editing || !self.password.is_empty() {
            v.required("password", &self.password)
                .min_len("password", &self.password, MIN_PASSWORD_LEN)
                .matches(
                    "password_confirmation",
                    &self.password_confirmation,
                    &self.password,
                );
        }
        v.finish()
    }

    fn payload(&self, _editing: bool) -> Value {
        let mut body = json!({
            "first_name": self.first_name.trim(),
            "last_name": self.last_name.trim(),
            "email": self.email.trim(),
            "phone_number": self.phone_number.trim(),
        });
        if !self.password.is_empty() {
            body["password"] = json!(self.password);
            body["password_confirmation"] = json!(self.password_confirmation);
        }
        body
    }

    fn create_endpoint() -> Endpoint {
        users::create()
    }

    fn show_endpoint(id: EntityId) -> Option<Endpoint> {
        Some(users::show(id))
    }

    fn update_endpoint(id: EntityId) -> Option<Endpoint> {
        Some(users::update(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> UserDraft {
        UserDraft {
            first_name: "Sara".into(),
            last_name: "Ahmed".into(),
            email: "sara@aqargo.sa".into(),
            phone_number: "0551234567".into(),
            password: "longenough".into(),
            password_confirmation: "longenough".into(),
        }
    }

    #[test]
    fn password_rules_on_create() {
        assert!(filled().validate(false).is_empty());

        let short = UserDraft {
            password: "short".into(),
            password_confirmation: "short".into(),
            ..filled()
        };
        assert!(short.validate(false).contains("password"));

        let mismatch = UserDraft {
            password_confirmation: "different1".into(),
            ..filled()
        };
        let errors = mismatch.validate(false);
        assert!(errors.contains("password_confirmation"));
        assert!(!errors.contains("password"));
    }

    #[test]
    fn password_optional_on_edit_and_omitted_from_payload() {
        let draft = UserDraft {
            password: String::new(),
            password_confirmation: String::new(),
            ..filled()
        };
        assert!(draft.validate(true).is_empty());
        assert!(draft.validate(false).contains("password"));
        assert!(draft.payload(true).get("password").is_none());
    }

    #[test]
    fn bad_contact_details() {
        let draft = UserDraft {
            email: "not-an-email".into(),
            phone_number: "12345".into(),
            ..filled()
        };
        let errors = draft.validate(false);
        assert!(errors.contains("email"));
        assert!(errors.contains("phone_number"));
    }
}
