//! Application context — everything the tour needs from the page, built once
//! per page load and handed to constructors.

use std::sync::Arc;

use crate::config::TourConfig;
use crate::status::StatusSource;
use crate::storage::TourFlags;
use crate::tour::flows::FlowRegistry;
use crate::tour::overlay::TourOverlay;
use crate::tour::page::PageContext;
use crate::tour::placement::ElementLocator;
use crate::tour::theme::TourTheme;

#[derive(Clone)]
pub struct AppContext {
    pub config: TourConfig,
    /// Derived from the current location; never reused across navigations.
    pub page: PageContext,
    pub flags: TourFlags,
    pub flows: Arc<FlowRegistry>,
    pub theme: TourTheme,
    pub locator: Arc<dyn ElementLocator>,
    pub overlay: Arc<dyn TourOverlay>,
    /// Optional backend check; `None` runs the policy on local flags only.
    pub status: Option<Arc<dyn StatusSource>>,
}

impl AppContext {
    /// Context with the built-in flows, default theme and config.
    pub fn new(
        location: &str,
        flags: TourFlags,
        locator: Arc<dyn ElementLocator>,
        overlay: Arc<dyn TourOverlay>,
    ) -> Self {
        Self {
            config: TourConfig::default(),
            page: PageContext::from_location(location),
            flags,
            flows: Arc::new(FlowRegistry::builtin()),
            theme: TourTheme::default(),
            locator,
            overlay,
            status: None,
        }
    }

    pub fn with_config(mut self, config: TourConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_flows(mut self, flows: FlowRegistry) -> Self {
        self.flows = Arc::new(flows);
        self
    }

    pub fn with_theme(mut self, theme: TourTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_status(mut self, status: Arc<dyn StatusSource>) -> Self {
        self.status = Some(status);
        self
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("page", &self.page)
            .field("flags", &self.flags)
            .field("status", &self.status.is_some())
            .finish_non_exhaustive()
    }
}
