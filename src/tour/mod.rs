//! Guided onboarding tour.
//!
//! A tour is a per-page sequence of steps, each highlighting one element of
//! the page with a spotlight and explaining it in a tooltip. The pieces:
//!
//! - [`flows`]: which steps each page has
//! - [`controller`]: the step state machine and its side effects on the page
//! - [`placement`]: spotlight and tooltip geometry
//! - [`policy`]: whether the tour starts by itself on page load

pub mod controller;
pub mod flows;
pub mod overlay;
pub mod page;
pub mod placement;
pub mod policy;
pub mod state;
pub mod step;
pub mod theme;

#[cfg(test)]
pub(crate) mod fakes;

pub use controller::{Key, ScrollDecision, ScrollGate, ScrollKind, TourController};
pub use flows::{Flow, FlowRegistry};
pub use overlay::{CompletionSummary, StepView, TourOverlay, WelcomePrompt};
pub use page::{PageContext, PageId, UrlSignals};
pub use placement::{ElementHandle, ElementLocator, Placement, PlacementEngine, Rect, Size};
pub use policy::{Decision, LocalRule, VisibilityPolicy};
pub use state::{TourPhase, TourState, Transition};
pub use step::{Position, StepDescriptor, StepHook};
pub use theme::TourTheme;

use crate::context::AppContext;

/// Page-load entry point: evaluate the policy once, then start the tour or
/// offer the welcome prompt. The returned controller stays alive for the
/// page and also serves the help button (`restart`).
pub async fn on_page_load(ctx: &AppContext) -> TourController {
    let mut controller = TourController::new(ctx);
    match VisibilityPolicy::new(ctx).evaluate().await {
        Decision::Start => {
            controller.start().await;
        }
        Decision::WelcomePrompt => controller.offer_welcome(),
        Decision::Skip => {}
    }
    controller
}
