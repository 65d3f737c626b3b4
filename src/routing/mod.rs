//! Page routes.
//!
//! The hub's pages are a closed set. Paths match on exact segments; a single
//! trailing slash is tolerated. Everything except the landing page requires
//! a session.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "page", content = "id", rename_all = "snake_case")]
pub enum Page {
    Landing,
    Import,
    Dashboard,
    Seo,
    Rank,
    Social,
    Analytics,
    Settings,
    Product(Uuid),
}

impl Page {
    /// Pages reachable from the navigation bar, in display order.
    pub const NAV: [Page; 8] = [
        Page::Landing,
        Page::Import,
        Page::Dashboard,
        Page::Seo,
        Page::Rank,
        Page::Social,
        Page::Analytics,
        Page::Settings,
    ];

    pub fn from_path(path: &str) -> Option<Page> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = match path.strip_suffix('/') {
            Some(rest) if !rest.is_empty() => rest,
            _ => path,
        };
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();
        match segments.as_slice() {
            [""] => Some(Page::Landing),
            ["import"] => Some(Page::Import),
            ["dashboard"] => Some(Page::Dashboard),
            ["seo"] => Some(Page::Seo),
            ["rank"] => Some(Page::Rank),
            ["social"] => Some(Page::Social),
            ["analytics"] => Some(Page::Analytics),
            ["settings"] => Some(Page::Settings),
            ["products", id] => id.parse().ok().map(Page::Product),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Page::Landing => "/".to_string(),
            Page::Import => "/import".to_string(),
            Page::Dashboard => "/dashboard".to_string(),
            Page::Seo => "/seo".to_string(),
            Page::Rank => "/rank".to_string(),
            Page::Social => "/social".to_string(),
            Page::Analytics => "/analytics".to_string(),
            Page::Settings => "/settings".to_string(),
            Page::Product(id) => format!("/products/{}", id),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Landing => "Seller Hub",
            Page::Import => "Import",
            Page::Dashboard => "Dashboard",
            Page::Seo => "SEO",
            Page::Rank => "Rank Tracker",
            Page::Social => "Social",
            Page::Analytics => "Analytics",
            Page::Settings => "Settings",
            Page::Product(_) => "Product",
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Page::Landing)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_round_trips() {
        for page in Page::NAV {
            assert_eq!(Page::from_path(&page.path()), Some(page));
        }
        let id = Uuid::new_v4();
        assert_eq!(Page::from_path(&Page::Product(id).path()), Some(Page::Product(id)));
    }

    #[test]
    fn test_trailing_slash_and_query() {
        assert_eq!(Page::from_path("/rank/"), Some(Page::Rank));
        assert_eq!(Page::from_path("/seo?product=1"), Some(Page::Seo));
        assert_eq!(Page::from_path("/"), Some(Page::Landing));
    }

    #[test]
    fn test_exact_segments() {
        assert_eq!(Page::from_path("/ranking"), None);
        assert_eq!(Page::from_path("/rank/keywords"), None);
        assert_eq!(Page::from_path("/products/not-a-uuid"), None);
        assert_eq!(Page::from_path("/products"), None);
        assert_eq!(Page::from_path("/rank//"), None);
        assert_eq!(Page::from_path(""), None);
    }

    #[test]
    fn test_only_landing_is_public() {
        assert!(!Page::Landing.requires_session());
        assert!(Page::NAV[1..].iter().all(Page::requires_session));
    }
}
