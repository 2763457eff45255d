use serde::{Deserialize, Serialize};

pub mod date;
pub mod envelope;
pub mod protocol;
pub mod serde_helper;

pub use envelope::{FieldErrors, Page, PageInfo};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_REQUEST_ID: &str = "X-Request-Id";
/// localStorage key the session is persisted under.
pub const SESSION_STORAGE_KEY: &str = "auth";

pub type EntityId = u64;

// =========================================================
// 会话 (Session)
// =========================================================

/// Authenticated session returned by `/api/auth/login`.
///
/// `user` is kept opaque; the console only reads a display name out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: serde_json::Value,
}

impl Session {
    pub fn display_name(&self) -> String {
        let field = |k: &str| {
            self.user
                .get(k)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        let full = format!("{} {}", field("first_name"), field("last_name"));
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        let name = field("name");
        if !name.is_empty() {
            return name;
        }
        field("email")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: EntityId,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub first_name: String,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub last_name: String,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub email: String,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub phone_number: String,
    pub status: Option<String>,
    pub role: Option<String>,
    pub created_at: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyImage {
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Property {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: EntityId,
    #[serde(alias = "name", deserialize_with = "serde_helper::null_default")]
    pub title: String,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub description: String,
    #[serde(rename = "type", deserialize_with = "serde_helper::null_default")]
    pub kind: String,
    #[serde(deserialize_with = "serde_helper::opt_number")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub city: String,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub district: String,
    #[serde(alias = "location", deserialize_with = "serde_helper::null_default")]
    pub address: String,
    #[serde(deserialize_with = "serde_helper::opt_number")]
    pub area: Option<f64>,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub owner: String,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub status: String,
    pub land_type: Option<String>,
    pub land_slope: Option<String>,
    pub shop_type: Option<String>,
    #[serde(deserialize_with = "serde_helper::opt_number")]
    pub bedrooms: Option<f64>,
    #[serde(deserialize_with = "serde_helper::opt_number")]
    pub bathrooms: Option<f64>,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub images: Vec<PropertyImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ad {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: EntityId,
    #[serde(deserialize_with = "serde_helper::id")]
    pub property_id: EntityId,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub start_date: String,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub end_date: String,
    #[serde(deserialize_with = "serde_helper::flag")]
    pub is_active: bool,
    pub property: Option<Property>,
}

impl Ad {
    pub fn title(&self) -> &str {
        self.property
            .as_ref()
            .map(|p| p.title.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    #[default]
    Monthly,
    Yearly,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Monthly => "monthly",
            PlanType::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "monthly" => Some(PlanType::Monthly),
            "yearly" => Some(PlanType::Yearly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: EntityId,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub name: String,
    #[serde(deserialize_with = "serde_helper::opt_number")]
    pub price: Option<f64>,
    #[serde(rename = "type", deserialize_with = "serde_helper::null_default")]
    pub kind: String,
    #[serde(deserialize_with = "serde_helper::opt_number")]
    pub duration: Option<f64>,
    #[serde(deserialize_with = "serde_helper::joined_list")]
    pub features: String,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub status: String,
}

impl Plan {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: EntityId,
    #[serde(deserialize_with = "serde_helper::opt_id")]
    pub user_id: Option<EntityId>,
    #[serde(deserialize_with = "serde_helper::opt_id")]
    pub plan_id: Option<EntityId>,
    pub user: Option<User>,
    pub plan: Option<Plan>,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub start_date: String,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub end_date: String,
    #[serde(deserialize_with = "serde_helper::opt_number")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub status: String,
    #[serde(deserialize_with = "serde_helper::flag")]
    pub auto_renew: bool,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub payment_method: String,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub notes: String,
}

impl Subscription {
    /// `user_id`, falling back to the embedded user.
    pub fn subscriber_id(&self) -> Option<EntityId> {
        self.user_id.or_else(|| self.user.as_ref().map(|u| u.id))
    }

    pub fn plan_ref(&self) -> Option<EntityId> {
        self.plan_id.or_else(|| self.plan.as_ref().map(|p| p.id))
    }
}

/// Reasons accepted by `/api/report/create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    SexualContent,
    Harassment,
    Spam,
    HateSpeech,
    Violence,
    Scam,
    FakeInformation,
    Other,
}

impl ReportReason {
    pub const ALL: [ReportReason; 8] = [
        ReportReason::SexualContent,
        ReportReason::Harassment,
        ReportReason::Spam,
        ReportReason::HateSpeech,
        ReportReason::Violence,
        ReportReason::Scam,
        ReportReason::FakeInformation,
        ReportReason::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportReason::SexualContent => "sexual_content",
            ReportReason::Harassment => "harassment",
            ReportReason::Spam => "spam",
            ReportReason::HateSpeech => "hate_speech",
            ReportReason::Violence => "violence",
            ReportReason::Scam => "scam",
            ReportReason::FakeInformation => "fake_information",
            ReportReason::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportReason::SexualContent => "Sexual content",
            ReportReason::Harassment => "Harassment",
            ReportReason::Spam => "Spam",
            ReportReason::HateSpeech => "Hate speech",
            ReportReason::Violence => "Violence",
            ReportReason::Scam => "Scam",
            ReportReason::FakeInformation => "Fake information",
            ReportReason::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: EntityId,
    #[serde(deserialize_with = "serde_helper::opt_id")]
    pub ad_id: Option<EntityId>,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub reason: String,
    #[serde(deserialize_with = "serde_helper::null_default")]
    pub description: String,
    #[serde(alias = "reporter")]
    pub user: Option<User>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: EntityId,
    #[serde(deserialize_with = "serde_helper::opt_id")]
    pub blocked_id: Option<EntityId>,
    pub blocked: Option<User>,
    pub reason: Option<String>,
    #[serde(deserialize_with = "serde_helper::opt_id")]
    pub days: Option<u64>,
    pub created_at: Option<String>,
}

impl Block {
    pub fn blocked_email(&self) -> &str {
        self.blocked
            .as_ref()
            .map(|u| u.email.as_str())
            .unwrap_or_default()
    }

    /// Block expiry, `None` for permanent blocks or unparseable timestamps.
    pub fn ends_on(&self) -> Option<chrono::NaiveDate> {
        let days = self.days?;
        let start = date::parse_date(self.created_at.as_deref()?)?;
        start.checked_add_days(chrono::Days::new(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ad_reads_embedded_property_name() {
        let ad: Ad = serde_json::from_value(json!({
            "id": 7,
            "property_id": "42",
            "start_date": "2024-01-01T00:00:00.000000Z",
            "end_date": null,
            "is_active": 1,
            "property": { "id": 42, "name": "Villa in Riyadh", "images": null }
        }))
        .unwrap();
        assert_eq!(ad.property_id, 42);
        assert!(ad.is_active);
        assert_eq!(ad.title(), "Villa in Riyadh");
        assert_eq!(ad.end_date, "");
    }

    #[test]
    fn session_display_name_prefers_full_name() {
        let s = Session {
            token: "t".into(),
            user: json!({ "first_name": "Sara", "last_name": "Ahmed", "email": "s@x.sa" }),
        };
        assert_eq!(s.display_name(), "Sara Ahmed");

        let s = Session {
            token: "t".into(),
            user: json!({ "email": "s@x.sa" }),
        };
        assert_eq!(s.display_name(), "s@x.sa");
    }

    #[test]
    fn block_end_date_is_start_plus_days() {
        let b = Block {
            days: Some(10),
            created_at: Some("2024-01-25T08:00:00Z".into()),
            ..Default::default()
        };
        assert_eq!(b.ends_on().unwrap().to_string(), "2024-02-04");

        let permanent = Block {
            created_at: Some("2024-01-25".into()),
            ..Default::default()
        };
        assert!(permanent.ends_on().is_none());
    }

    #[test]
    fn report_reason_roundtrips_through_wire_names() {
        for r in ReportReason::ALL {
            assert_eq!(ReportReason::parse(r.as_str()), Some(r));
        }
        assert_eq!(ReportReason::parse("nonsense"), None);
    }
}
