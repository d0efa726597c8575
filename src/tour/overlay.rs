//! Overlay surface — what the controller asks the page to draw.

use serde::Serialize;

use super::page::PageId;
use super::placement::{Placement, Size};

/// Everything needed to draw one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub page: PageId,
    pub index: usize,
    pub total: usize,
    pub title: String,
    pub description: String,
    /// e.g. "2 of 4"
    pub progress: String,
    pub placement: Placement,
    /// `None` on the first step (no back button).
    pub prev_label: Option<String>,
    /// "Next", or the finish label on the last step.
    pub next_label: String,
    pub skip_label: String,
}

impl StepView {
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

/// Shown once after the tour completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionSummary {
    pub title: String,
    pub body: String,
    /// Titles of the steps the user just walked through.
    pub highlights: Vec<String>,
    pub dismiss_label: String,
}

/// Deferred "want a tour?" prompt for first-time users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelcomePrompt {
    pub title: String,
    pub body: String,
    pub accept_label: String,
    pub decline_label: String,
}

/// Page-side rendering of the tour.
///
/// `render` replaces any previous step content and creates the overlay
/// elements on first use, so repeated calls never duplicate DOM.
pub trait TourOverlay: Send + Sync {
    fn render(&self, view: &StepView);

    /// Remove the overlay elements.
    fn clear(&self);

    /// Toggle the overflow lock on the document.
    fn set_scroll_lock(&self, locked: bool);

    /// Attach or detach the capture-phase scroll/wheel/touchmove listeners.
    /// Those listeners consult a [`ScrollGate`](super::controller::ScrollGate).
    fn set_scroll_suppression(&self, attached: bool);

    fn show_summary(&self, summary: &CompletionSummary);

    fn hide_summary(&self);

    fn show_welcome(&self, prompt: &WelcomePrompt);

    fn hide_welcome(&self);

    /// Measured tooltip size, when the overlay can measure it.
    fn tooltip_size(&self) -> Option<Size> {
        None
    }
}
