//! Page identification and URL signals.

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Which page of the app is showing. `Unknown` disables the tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageId {
    Signin,
    Home,
    Workers,
    Tasks,
    Reports,
    Attendance,
    Unknown,
}

impl PageId {
    /// Pages that can carry a flow.
    pub const KNOWN: [PageId; 6] = [
        PageId::Signin,
        PageId::Home,
        PageId::Workers,
        PageId::Tasks,
        PageId::Reports,
        PageId::Attendance,
    ];

    /// Map a navigation path to a page. Total: anything unmatched is `Unknown`.
    ///
    /// Query strings and fragments are ignored, as are trailing slashes.
    pub fn from_path(path: &str) -> PageId {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };

        if path.contains("/attendance") {
            return PageId::Attendance;
        }

        match path {
            "/signin" | "/login" | "/signup" => PageId::Signin,
            "/" | "/home" | "/dashboard" => PageId::Home,
            _ if has_segment_prefix(path, "/workers") => PageId::Workers,
            _ if has_segment_prefix(path, "/tasks") => PageId::Tasks,
            _ if has_segment_prefix(path, "/reports") => PageId::Reports,
            _ => PageId::Unknown,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Parse a snake_case page name as used in flow definitions.
    pub fn from_name(name: &str) -> Option<PageId> {
        Self::KNOWN
            .into_iter()
            .chain(std::iter::once(PageId::Unknown))
            .find(|p| p.to_string() == name)
    }
}

/// `/workers` and `/workers/12` match `/workers`; `/workersfoo` doesn't.
fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Signin => "signin",
            Self::Home => "home",
            Self::Workers => "workers",
            Self::Tasks => "tasks",
            Self::Reports => "reports",
            Self::Attendance => "attendance",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Explicit tour overrides carried in the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlSignals {
    /// `?tour=skip` or `?skip_tour`
    pub skip: bool,
    /// `?tour=show`, `?tour=force` or `?show_tour`
    pub force_show: bool,
}

impl UrlSignals {
    pub fn from_url(url: &Url) -> Self {
        let mut signals = Self::default();
        for (key, value) in url.query_pairs() {
            let enabled = !matches!(value.as_ref(), "0" | "false");
            match key.as_ref() {
                "tour" => match value.as_ref() {
                    "skip" => signals.skip = true,
                    "show" | "force" => signals.force_show = true,
                    _ => {}
                },
                "skip_tour" if enabled => signals.skip = true,
                "show_tour" if enabled => signals.force_show = true,
                _ => {}
            }
        }
        signals
    }
}

/// Everything the tour derives from the current location. Built fresh on
/// every page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub page: PageId,
    pub signals: UrlSignals,
}

impl PageContext {
    pub fn new(page: PageId, signals: UrlSignals) -> Self {
        Self { page, signals }
    }

    /// Derive the context from `location.href`. An unparseable location
    /// yields `Unknown` with no signals.
    pub fn from_location(href: &str) -> Self {
        match Url::parse(href) {
            Ok(url) => Self {
                page: PageId::from_path(url.path()),
                signals: UrlSignals::from_url(&url),
            },
            Err(e) => {
                tracing::debug!("Unparseable location {:?}: {}", href, e);
                Self::new(PageId::Unknown, UrlSignals::default())
            }
        }
    }
}
