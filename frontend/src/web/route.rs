//! 路由定义模块 - 领域模型
//!
//! Pure routing table with no DOM access, so it is unit-tested natively.

use aqargo_shared::EntityId;
use std::fmt::Display;

/// Entity families with a list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Users,
    Properties,
    Ads,
    Plans,
    Subscriptions,
    Reports,
    Blocks,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Users,
        Section::Properties,
        Section::Ads,
        Section::Plans,
        Section::Subscriptions,
        Section::Reports,
        Section::Blocks,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Section::Users => "users",
            Section::Properties => "properties",
            Section::Ads => "ads",
            Section::Plans => "plans",
            Section::Subscriptions => "subscriptions",
            Section::Reports => "reports",
            Section::Blocks => "blocks",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Users => "Users",
            Section::Properties => "Properties",
            Section::Ads => "Ads",
            Section::Plans => "Plans",
            Section::Subscriptions => "Subscriptions",
            Section::Reports => "Reports",
            Section::Blocks => "Blocks",
        }
    }

    fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }

    /// Sections with a `/new` form. Blocks are created from a user row.
    pub fn can_create(&self) -> bool {
        !matches!(self, Section::Blocks)
    }

    /// Sections with an `/edit/:id` form.
    pub fn can_edit(&self) -> bool {
        !matches!(self, Section::Reports | Section::Blocks)
    }
}

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    #[default]
    Login,
    Dashboard,
    List(Section),
    Create(Section),
    Edit(Section, EntityId),
    /// `/blocks/new/:blocked_id`, opened from a user row.
    BlockUser(EntityId),
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Dashboard,
            ["login"] => Self::Login,
            ["dashboard"] => Self::Dashboard,
            ["blocks", "new", id] => id.parse().map_or(Self::NotFound, Self::BlockUser),
            [slug] => Section::from_slug(slug).map_or(Self::NotFound, Self::List),
            [slug, "new"] => match Section::from_slug(slug) {
                Some(s) if s.can_create() => Self::Create(s),
                _ => Self::NotFound,
            },
            [slug, "edit", id] => match (Section::from_slug(slug), id.parse::<EntityId>()) {
                (Some(s), Ok(id)) if s.can_edit() && id > 0 => Self::Edit(s, id),
                _ => Self::NotFound,
            },
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::List(s) => format!("/{}", s.slug()),
            Self::Create(s) => format!("/{}/new", s.slug()),
            Self::Edit(s, id) => format!("/{}/edit/{}", s.slug(), id),
            Self::BlockUser(id) => format!("/blocks/new/{}", id),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// Section highlighted in the sidebar.
    pub fn section(&self) -> Option<Section> {
        match self {
            Self::List(s) | Self::Create(s) | Self::Edit(s, _) => Some(*s),
            Self::BlockUser(_) => Some(Section::Blocks),
            _ => None,
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::NotFound)
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        let routes = [
            AppRoute::Login,
            AppRoute::Dashboard,
            AppRoute::List(Section::Reports),
            AppRoute::Create(Section::Ads),
            AppRoute::Edit(Section::Subscriptions, 12),
            AppRoute::BlockUser(5),
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn unknown_or_malformed_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/users/"), AppRoute::List(Section::Users));
        assert_eq!(AppRoute::from_path("/users/edit/abc"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/users/edit/0"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/reports/new"), AppRoute::Create(Section::Reports));
        assert_eq!(AppRoute::from_path("/reports/edit/3"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/blocks/new"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
    }

    #[test]
    fn guard_rules() {
        assert!(!AppRoute::Login.requires_auth());
        assert!(AppRoute::List(Section::Blocks).requires_auth());
        assert!(AppRoute::BlockUser(1).requires_auth());
        assert!(AppRoute::Login.should_redirect_when_authenticated());
        assert_eq!(AppRoute::BlockUser(3).section(), Some(Section::Blocks));
    }
}
