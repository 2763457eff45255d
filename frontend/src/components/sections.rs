//! Table columns and row buttons for each management screen.

use crate::components::list_page::{ListView, RowAction};
use crate::web::route::{AppRoute, Section};
use aqargo_admin::entities::{properties, subscriptions};
use aqargo_admin::list::Toggle;
use aqargo_shared::date::{format_date, normalize_date};
use aqargo_shared::{Ad, Block, Plan, Property, Report, ReportReason, Subscription, User};

fn money(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{} SAR", v as i64),
        Some(v) => format!("{v:.2} SAR"),
        None => "-".to_string(),
    }
}

fn or_dash(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

fn day(value: Option<&str>) -> String {
    or_dash(value.map(normalize_date).as_deref())
}

fn toggle_label<E: Toggle>(item: &E) -> &'static str {
    if item.is_on() { "Deactivate" } else { "Activate" }
}

const ACTIVE_CHOICES: [(&str, &str); 2] = [("active", "Active"), ("inactive", "Inactive")];

impl ListView for User {
    const SECTION: Section = Section::Users;
    const COLUMNS: &'static [&'static str] = &["#", "Name", "Email", "Phone", "Status", "Joined"];
    const SEARCH_PLACEHOLDER: &'static str = "Search by name or email";

    fn filter_choices() -> Vec<(&'static str, &'static str)> {
        ACTIVE_CHOICES.to_vec()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name(),
            self.email.clone(),
            or_dash(Some(&self.phone_number)),
            or_dash(self.status.as_deref()),
            day(self.created_at.as_deref()),
        ]
    }

    fn actions() -> Vec<RowAction<Self>> {
        vec![
            RowAction::Edit,
            RowAction::Open {
                label: "Block",
                route: |user| AppRoute::BlockUser(user.id),
            },
            RowAction::Delete {
                label: "Delete",
                confirm: "Delete this user?",
            },
        ]
    }
}

impl ListView for Property {
    const SECTION: Section = Section::Properties;
    const COLUMNS: &'static [&'static str] =
        &["#", "Title", "Type", "City", "Price", "Owner", "Status"];
    const SEARCH_PLACEHOLDER: &'static str = "Search by title, owner or address";

    fn filter_choices() -> Vec<(&'static str, &'static str)> {
        properties::STATUSES.iter().map(|s| (*s, *s)).collect()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            or_dash(Some(&self.kind)),
            or_dash(Some(&self.city)),
            money(self.price),
            or_dash(Some(&self.owner)),
            or_dash(Some(&self.status)),
        ]
    }

    fn actions() -> Vec<RowAction<Self>> {
        vec![
            RowAction::Edit,
            RowAction::Delete {
                label: "Delete",
                confirm: "Delete this property?",
            },
        ]
    }
}

impl ListView for Ad {
    const SECTION: Section = Section::Ads;
    const COLUMNS: &'static [&'static str] = &["#", "Property", "Start", "End", "Active"];
    const SEARCH_PLACEHOLDER: &'static str = "Search by property or ad number";

    fn filter_choices() -> Vec<(&'static str, &'static str)> {
        ACTIVE_CHOICES.to_vec()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            or_dash(Some(self.title())),
            day(Some(&self.start_date)),
            day(Some(&self.end_date)),
            if self.is_active { "yes" } else { "no" }.to_string(),
        ]
    }

    fn actions() -> Vec<RowAction<Self>> {
        vec![
            RowAction::Edit,
            RowAction::Run {
                label: toggle_label::<Ad>,
                make: <Ad as Toggle>::toggle_action,
                done: "Ad updated",
            },
            RowAction::Delete {
                label: "Delete",
                confirm: "Delete this ad?",
            },
        ]
    }
}

impl ListView for Plan {
    const SECTION: Section = Section::Plans;
    const COLUMNS: &'static [&'static str] =
        &["#", "Name", "Type", "Price", "Duration (days)", "Status"];

    fn filter_choices() -> Vec<(&'static str, &'static str)> {
        ACTIVE_CHOICES.to_vec()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            or_dash(Some(&self.kind)),
            money(self.price),
            self.duration
                .map(|d| (d as i64).to_string())
                .unwrap_or_else(|| "-".to_string()),
            or_dash(Some(&self.status)),
        ]
    }

    fn actions() -> Vec<RowAction<Self>> {
        vec![
            RowAction::Edit,
            RowAction::Run {
                label: toggle_label::<Plan>,
                make: <Plan as Toggle>::toggle_action,
                done: "Plan status updated",
            },
            RowAction::Delete {
                label: "Delete",
                confirm: "Delete this plan?",
            },
        ]
    }
}

impl ListView for Subscription {
    const SECTION: Section = Section::Subscriptions;
    const COLUMNS: &'static [&'static str] = &[
        "#",
        "Subscriber",
        "Plan",
        "Start",
        "End",
        "Price",
        "Status",
        "Auto renew",
    ];
    const SEARCH_PLACEHOLDER: &'static str = "Search by subscriber or plan";

    fn filter_choices() -> Vec<(&'static str, &'static str)> {
        subscriptions::STATUSES.iter().map(|s| (*s, *s)).collect()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            or_dash(self.user.as_ref().map(|u| u.email.as_str())),
            or_dash(self.plan.as_ref().map(|p| p.name.as_str())),
            day(Some(&self.start_date)),
            day(Some(&self.end_date)),
            money(self.price),
            or_dash(Some(&self.status)),
            if self.auto_renew { "yes" } else { "no" }.to_string(),
        ]
    }

    fn actions() -> Vec<RowAction<Self>> {
        vec![
            RowAction::Edit,
            RowAction::Run {
                label: |_| "Renew",
                make: subscriptions::renew_action,
                done: "Subscription renewed",
            },
            RowAction::Run {
                label: |_| "Cancel",
                make: subscriptions::cancel_action,
                done: "Subscription cancelled",
            },
            RowAction::Delete {
                label: "Delete",
                confirm: "Delete this subscription?",
            },
        ]
    }
}

impl ListView for Report {
    const SECTION: Section = Section::Reports;
    const COLUMNS: &'static [&'static str] =
        &["#", "Ad", "Reason", "Description", "Reporter", "Date"];

    fn filter_choices() -> Vec<(&'static str, &'static str)> {
        ReportReason::ALL
            .iter()
            .map(|r| (r.as_str(), r.label()))
            .collect()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.ad_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            ReportReason::parse(&self.reason)
                .map(|r| r.label().to_string())
                .unwrap_or_else(|| self.reason.clone()),
            or_dash(Some(&self.description)),
            or_dash(self.user.as_ref().map(|u| u.email.as_str())),
            day(self.created_at.as_deref()),
        ]
    }

    fn actions() -> Vec<RowAction<Self>> {
        vec![RowAction::Delete {
            label: "Delete",
            confirm: "Delete this report?",
        }]
    }
}

impl ListView for Block {
    const SECTION: Section = Section::Blocks;
    const COLUMNS: &'static [&'static str] = &["#", "User", "Reason", "Since", "Ends"];
    const SEARCH_PLACEHOLDER: &'static str = "Search by email or reason";

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            or_dash(Some(self.blocked_email())),
            or_dash(self.reason.as_deref()),
            day(self.created_at.as_deref()),
            match (self.days, self.ends_on()) {
                (None, _) => "permanent".to_string(),
                (Some(_), Some(end)) => format_date(end),
                (Some(days), None) => format!("{days} days"),
            },
        ]
    }

    fn actions() -> Vec<RowAction<Self>> {
        vec![RowAction::Delete {
            label: "Unblock",
            confirm: "Lift this block?",
        }]
    }
}
