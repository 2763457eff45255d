use super::{id_text, optional_number_value, optional_text_value};
use crate::error::AdminError;
use crate::form::Draft;
use crate::list::ListEntity;
use crate::validate::Validator;
use aqargo_shared::protocol::{Endpoint, blocks};
use aqargo_shared::{Block, EntityId, FieldErrors};
use serde_json::{Value, json};
use std::borrow::Cow;

pub const MAX_REASON_LEN: usize = 255;
pub const ALREADY_BLOCKED: &str = "This user is already blocked";

impl ListEntity for Block {
    const NAME: &'static str = "block";

    fn id(&self) -> EntityId {
        self.id
    }

    fn index() -> Endpoint {
        blocks::index()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Borrowed(self.blocked_email())];
        if let Some(user) = &self.blocked {
            fields.push(Cow::Owned(user.full_name()));
        }
        if let Some(reason) = &self.reason {
            fields.push(Cow::Borrowed(reason.as_str()));
        }
        fields
    }

    /// Lifting a block goes through the unblock endpoint.
    fn delete_endpoint(id: EntityId) -> Endpoint {
        blocks::unblock(id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockDraft {
    pub blocked_id: String,
    pub reason: String,
    /// Empty means permanent.
    pub days: String,
}

impl BlockDraft {
    /// Pre-filled from the "block" button on a user row.
    pub fn for_user(user_id: EntityId) -> Self {
        Self {
            blocked_id: id_text(Some(user_id)),
            ..Self::default()
        }
    }
}

impl Draft for BlockDraft {
    type Entity = Block;

    const NAME: &'static str = "block";
    const RETURN_PATH: &'static str = "/blocks";

    fn from_entity(block: &Block) -> Self {
        Self {
            blocked_id: id_text(block.blocked_id),
            reason: block.reason.clone().unwrap_or_default(),
            days: id_text(block.days),
        }
    }

    fn validate(&self, _editing: bool) -> FieldErrors {
        Validator::new()
            .reference("blocked_id", &self.blocked_id)
            .optional_positive_integer("days", &self.days)
            .max_len("reason", &self.reason, MAX_REASON_LEN)
            .finish()
    }

    fn payload(&self, _editing: bool) -> Value {
        json!({
            "blocked_id": super::number_value(&self.blocked_id),
            "reason": optional_text_value(&self.reason),
            "days": optional_number_value(&self.days),
        })
    }

    fn create_endpoint() -> Endpoint {
        blocks::create()
    }

    /// Duplicate blocks come back as a generic validation or unique-key
    /// failure; surface them on the user field.
    fn map_server_error(err: AdminError) -> AdminError {
        let duplicate = match &err {
            AdminError::Server { message, .. } => {
                message.contains("unique") || message.contains("Validation Error")
            }
            AdminError::Validation(fields) => {
                fields.contains("blocked_id")
                    || fields
                        .first_message()
                        .is_some_and(|m| m.contains("unique") || m.contains("Validation Error"))
            }
            _ => false,
        };
        if !duplicate {
            return err;
        }
        let mut fields = FieldErrors::new();
        fields.add("blocked_id", ALREADY_BLOCKED);
        AdminError::Validation(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_optional_fields_become_null() {
        let draft = BlockDraft::for_user(12);
        assert!(draft.validate(false).is_empty());
        assert_eq!(
            draft.payload(false),
            json!({ "blocked_id": 12, "reason": null, "days": null })
        );

        let timed = BlockDraft {
            days: "0".into(),
            ..draft
        };
        assert!(timed.validate(false).contains("days"));
    }

    #[test]
    fn duplicate_block_maps_onto_user_field() {
        let mapped = BlockDraft::map_server_error(AdminError::server(
            400,
            "Validation Error: blocked_id has already been taken",
        ));
        assert_eq!(
            mapped.field_errors().and_then(|f| f.get("blocked_id")),
            Some(ALREADY_BLOCKED)
        );

        let other = BlockDraft::map_server_error(AdminError::server(500, "boom"));
        assert_eq!(other, AdminError::server(500, "boom"));
    }

    #[test]
    fn unblock_uses_dedicated_endpoint() {
        assert_eq!(Block::delete_endpoint(3), blocks::unblock(3));
    }
}
