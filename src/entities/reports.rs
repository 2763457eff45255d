use crate::form::Draft;
use crate::list::{Filter, ListEntity};
use crate::validate::Validator;
use aqargo_shared::protocol::{Endpoint, ReportIndexRequest, reports};
use aqargo_shared::{EntityId, FieldErrors, Report, ReportReason};
use serde_json::{Value, json};
use std::borrow::Cow;

pub const MAX_DESCRIPTION_LEN: usize = 1000;

impl ListEntity for Report {
    const NAME: &'static str = "report";
    // The reason filter is sent to `/api/report/index` as well.
    const SERVER_FILTER: bool = true;

    fn id(&self) -> EntityId {
        self.id
    }

    fn index() -> Endpoint {
        reports::index()
    }

    fn index_body(page: u32, filter: &Filter) -> Option<Value> {
        let reason = match filter {
            Filter::All => Vec::new(),
            Filter::Value(v) => vec![v.clone()],
        };
        Some(json!(ReportIndexRequest { page, reason }))
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.description.as_str()),
            Cow::Borrowed(self.reason.as_str()),
        ];
        if let Some(label) = ReportReason::parse(&self.reason).map(|r| r.label()) {
            fields.push(Cow::Borrowed(label));
        }
        fields
    }

    fn filter_value(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.reason))
    }

    fn delete_endpoint(id: EntityId) -> Endpoint {
        reports::delete(id)
    }
}

/// Create-only: moderators file reports against an ad.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDraft {
    pub ad_id: String,
    pub reason: String,
    pub description: String,
}

impl Draft for ReportDraft {
    type Entity = Report;

    const NAME: &'static str = "report";
    const RETURN_PATH: &'static str = "/reports";

    fn from_entity(report: &Report) -> Self {
        Self {
            ad_id: super::id_text(report.ad_id),
            reason: report.reason.clone(),
            description: report.description.clone(),
        }
    }

    fn validate(&self, _editing: bool) -> FieldErrors {
        let reasons: Vec<&str> = ReportReason::ALL.iter().map(ReportReason::as_str).collect();
        Validator::new()
            .reference("ad_id", &self.ad_id)
            .required("reason", &self.reason)
            .one_of("reason", &self.reason, &reasons)
            .max_len("description", &self.description, MAX_DESCRIPTION_LEN)
            .finish()
    }

    fn payload(&self, _editing: bool) -> Value {
        json!({
            "ad_id": super::number_value(&self.ad_id),
            "reason": self.reason.trim(),
            "description": super::optional_text_value(&self.description),
        })
    }

    fn create_endpoint() -> Endpoint {
        reports::create()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_goes_into_the_index_body() {
        assert_eq!(
            Report::index_body(2, &Filter::Value("spam".into())),
            Some(json!({ "page": 2, "reason": ["spam"] }))
        );
        assert_eq!(Report::index_body(1, &Filter::All), Some(json!({ "page": 1 })));
    }

    #[test]
    fn reason_must_be_known() {
        let draft = ReportDraft {
            ad_id: "9".into(),
            reason: "boring".into(),
            description: String::new(),
        };
        assert!(draft.validate(false).contains("reason"));

        let ok = ReportDraft {
            reason: ReportReason::Scam.as_str().into(),
            ..draft
        };
        assert!(ok.validate(false).is_empty());
        assert_eq!(ok.payload(false)["description"], Value::Null);
        assert_eq!(ok.payload(false)["ad_id"], json!(9));
    }

    #[test]
    fn search_matches_reason_label() {
        let report = Report {
            id: 1,
            reason: "fake_information".into(),
            ..Report::default()
        };
        assert!(report.search_fields().iter().any(|f| f == "Fake information"));
    }
}
