//! Tour copy and summary content.
//!
//! Variants of the tour (richer completion screens, different wording) are
//! expressed as themes, not as separate controllers.

use super::flows::Flow;
use super::overlay::{CompletionSummary, StepView, WelcomePrompt};
use super::page::PageId;
use super::placement::Placement;
use super::step::StepDescriptor;

#[derive(Debug, Clone)]
pub struct TourTheme {
    pub next_label: String,
    pub prev_label: String,
    pub finish_label: String,
    pub skip_label: String,
    /// `{current}` and `{total}` are substituted.
    pub progress_template: String,
    pub completion_title: String,
    pub completion_body: String,
    /// List the finished steps in the completion summary.
    pub list_highlights: bool,
    pub dismiss_label: String,
    pub welcome_title: String,
    pub welcome_body: String,
    pub welcome_accept_label: String,
    pub welcome_decline_label: String,
}

impl Default for TourTheme {
    fn default() -> Self {
        Self {
            next_label: "Next".to_string(),
            prev_label: "Back".to_string(),
            finish_label: "Finish".to_string(),
            skip_label: "Skip tour".to_string(),
            progress_template: "{current} of {total}".to_string(),
            completion_title: "You're all set!".to_string(),
            completion_body: "You can replay this tour any time from the help button.".to_string(),
            list_highlights: true,
            dismiss_label: "Got it".to_string(),
            welcome_title: "Welcome aboard".to_string(),
            welcome_body: "Take a quick tour of your workspace?".to_string(),
            welcome_accept_label: "Show me around".to_string(),
            welcome_decline_label: "Maybe later".to_string(),
        }
    }
}

impl TourTheme {
    /// Plain variant: no step list in the completion summary.
    pub fn compact() -> Self {
        Self {
            list_highlights: false,
            ..Self::default()
        }
    }

    pub fn progress(&self, index: usize, total: usize) -> String {
        self.progress_template
            .replace("{current}", &(index + 1).to_string())
            .replace("{total}", &total.to_string())
    }

    pub fn step_view(
        &self,
        page: PageId,
        step: &StepDescriptor,
        index: usize,
        total: usize,
        placement: Placement,
    ) -> StepView {
        let is_last = index + 1 >= total;
        StepView {
            page,
            index,
            total,
            title: step.title.clone(),
            description: step.description.clone(),
            progress: self.progress(index, total),
            placement,
            prev_label: (index > 0).then(|| self.prev_label.clone()),
            next_label: if is_last {
                self.finish_label.clone()
            } else {
                self.next_label.clone()
            },
            skip_label: self.skip_label.clone(),
        }
    }

    pub fn summary(&self, flow: Option<&Flow>) -> CompletionSummary {
        let highlights = match flow {
            Some(flow) if self.list_highlights => {
                flow.steps().iter().map(|s| s.title.clone()).collect()
            }
            _ => Vec::new(),
        };
        CompletionSummary {
            title: self.completion_title.clone(),
            body: self.completion_body.clone(),
            highlights,
            dismiss_label: self.dismiss_label.clone(),
        }
    }

    pub fn welcome_prompt(&self) -> WelcomePrompt {
        WelcomePrompt {
            title: self.welcome_title.clone(),
            body: self.welcome_body.clone(),
            accept_label: self.welcome_accept_label.clone(),
            decline_label: self.welcome_decline_label.clone(),
        }
    }
}
