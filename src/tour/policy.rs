//! Visibility policy — should the tour start on this page load?
//!
//! Local rules run first and in order; the first match decides:
//!
//! 1. completed before -> no
//! 2. `?tour=skip` -> no
//! 3. unknown page -> no
//! 4. first evaluation this session -> yes (and remember the session)
//! 5. `?tour=show` -> yes, otherwise no
//!
//! When a status source is configured, the backend may refine the outcome of
//! rules 4 and 5 only: a backend "completed" cancels a first-in-session
//! start, and a backend "first time" turns a plain "no" into a welcome
//! prompt. Any error or timeout keeps the local answer.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::error::StatusError;
use crate::status::{OnboardingStatus, StatusSource};
use crate::storage::TourFlags;

use super::page::PageContext;

/// What to do on page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Start,
    Skip,
    /// Ask first; start only if the user accepts.
    WelcomePrompt,
}

/// Which local rule decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalRule {
    AlreadyCompleted,
    SkipSignal,
    UnknownPage,
    FirstInSession,
    ForceShow,
    NotForced,
}

impl LocalRule {
    pub fn shows_tour(&self) -> bool {
        matches!(self, Self::FirstInSession | Self::ForceShow)
    }

    /// Rules the backend answer is allowed to refine.
    fn is_advisable(&self) -> bool {
        matches!(self, Self::FirstInSession | Self::NotForced)
    }
}

impl From<LocalRule> for Decision {
    fn from(rule: LocalRule) -> Self {
        if rule.shows_tour() {
            Decision::Start
        } else {
            Decision::Skip
        }
    }
}

pub struct VisibilityPolicy {
    page: PageContext,
    flags: TourFlags,
    status: Option<Arc<dyn StatusSource>>,
    status_timeout: Duration,
}

impl VisibilityPolicy {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            page: ctx.page.clone(),
            flags: ctx.flags.clone(),
            status: ctx.status.clone(),
            status_timeout: ctx.config.status_timeout,
        }
    }

    /// Run the local rules. Marks the session as started when rule 4 fires,
    /// so call it once per page load.
    pub fn local_decision(&self) -> LocalRule {
        let rule = if self.flags.is_completed() {
            LocalRule::AlreadyCompleted
        } else if self.page.signals.skip {
            LocalRule::SkipSignal
        } else if self.page.page.is_unknown() {
            LocalRule::UnknownPage
        } else if !self.flags.session_started() {
            self.flags.mark_session_started();
            LocalRule::FirstInSession
        } else if self.page.signals.force_show {
            LocalRule::ForceShow
        } else {
            LocalRule::NotForced
        };
        debug!(page = %self.page.page, ?rule, "Local tour decision");
        rule
    }

    /// Local rules plus the advisory backend check.
    pub async fn evaluate(&self) -> Decision {
        let rule = self.local_decision();
        let Some(status) = &self.status else {
            return rule.into();
        };
        if !rule.is_advisable() {
            return rule.into();
        }

        match self.check_status(status.as_ref()).await {
            Ok(remote) => self.reconcile(rule, remote),
            Err(e) => {
                warn!("Onboarding status check failed, using local decision: {}", e);
                rule.into()
            }
        }
    }

    /// Remote check bounded by the configured timeout.
    async fn check_status(
        &self,
        status: &dyn StatusSource,
    ) -> Result<OnboardingStatus, StatusError> {
        tokio::time::timeout(self.status_timeout, status.fetch_status())
            .await
            .map_err(|_| StatusError::Timeout {
                timeout: self.status_timeout,
            })?
    }

    pub async fn should_auto_start(&self) -> bool {
        self.evaluate().await == Decision::Start
    }

    fn reconcile(&self, rule: LocalRule, remote: OnboardingStatus) -> Decision {
        match rule {
            LocalRule::FirstInSession if remote.completed => {
                info!("Backend reports onboarding completed; not starting tour");
                self.flags.mark_completed();
                Decision::Skip
            }
            LocalRule::NotForced if remote.is_first_time && !remote.completed => {
                info!("Backend reports first visit; offering welcome prompt");
                Decision::WelcomePrompt
            }
            _ => rule.into(),
        }
    }
}
