//! Tour controller — drives the state machine and the overlay.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::TourConfig;
use crate::context::AppContext;
use crate::storage::TourFlags;

use super::flows::{Flow, FlowRegistry};
use super::overlay::TourOverlay;
use super::page::PageId;
use super::placement::{Placement, PlacementEngine, Size};
use super::state::{TourPhase, TourState, Transition};
use super::theme::TourTheme;

/// Keys the tour reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    /// Map a `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Key {
        match key {
            "Escape" | "Esc" => Key::Escape,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKind {
    Scroll,
    Wheel,
    TouchMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    Allow,
    /// `preventDefault` the event.
    Suppress,
}

/// Shared view of "is user scrolling allowed right now", held by the page's
/// capture-phase listeners.
#[derive(Debug, Clone, Default)]
pub struct ScrollGate {
    active: Arc<AtomicBool>,
    programmatic: Arc<AtomicBool>,
}

impl ScrollGate {
    /// While the tour is active only the controller's own scroll-into-view
    /// gets through. Wheel and touch input are user gestures and stay
    /// suppressed even mid-scroll.
    pub fn filter(&self, kind: ScrollKind) -> ScrollDecision {
        if !self.active.load(Ordering::SeqCst) {
            return ScrollDecision::Allow;
        }
        if kind == ScrollKind::Scroll && self.programmatic.load(Ordering::SeqCst) {
            return ScrollDecision::Allow;
        }
        debug!("Suppressing {:?} while tour is active", kind);
        ScrollDecision::Suppress
    }
}

/// Auto-dismiss timer for the completion summary. Whichever of the timer
/// and an explicit dismissal comes first hides the summary; the other is a
/// no-op.
struct SummaryTimer {
    dismissed: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl SummaryTimer {
    fn start(overlay: Arc<dyn TourOverlay>, timeout: Duration) -> Self {
        let dismissed = Arc::new(AtomicBool::new(false));
        let task = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let flag = Arc::clone(&dismissed);
                Some(handle.spawn(async move {
                    tokio::time::sleep(timeout).await;
                    if !flag.swap(true, Ordering::SeqCst) {
                        debug!("Completion summary timed out");
                        overlay.hide_summary();
                    }
                }))
            }
            Err(_) => {
                warn!("No runtime for summary timer; summary stays until dismissed");
                None
            }
        };
        Self { dismissed, task }
    }

    /// Returns true if this call is the one that dismissed the summary.
    fn dismiss(self) -> bool {
        if let Some(task) = self.task {
            task.abort();
        }
        !self.dismissed.swap(true, Ordering::SeqCst)
    }
}

/// Owns the tour state for one page load.
pub struct TourController {
    config: TourConfig,
    flows: Arc<FlowRegistry>,
    flags: TourFlags,
    theme: TourTheme,
    overlay: Arc<dyn TourOverlay>,
    placement: PlacementEngine,
    state: TourState,
    gate: ScrollGate,
    /// Scroll lock and suppressors are attached.
    page_locked: bool,
    welcome_visible: bool,
    summary: Option<SummaryTimer>,
    last_placement: Option<Placement>,
}

impl TourController {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            config: ctx.config.clone(),
            flows: Arc::clone(&ctx.flows),
            flags: ctx.flags.clone(),
            theme: ctx.theme.clone(),
            overlay: Arc::clone(&ctx.overlay),
            placement: PlacementEngine::new(Arc::clone(&ctx.locator), ctx.config.clone()),
            state: TourState::new(ctx.page.page),
            gate: ScrollGate::default(),
            page_locked: false,
            welcome_visible: false,
            summary: None,
            last_placement: None,
        }
    }

    pub fn page(&self) -> PageId {
        self.state.page()
    }

    pub fn phase(&self) -> TourPhase {
        self.state.phase()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn current_step_index(&self) -> Option<usize> {
        self.state.current_step()
    }

    /// Geometry of the step currently shown.
    pub fn last_placement(&self) -> Option<Placement> {
        self.last_placement
    }

    pub fn summary_visible(&self) -> bool {
        self.summary
            .as_ref()
            .is_some_and(|s| !s.dismissed.load(Ordering::SeqCst))
    }

    /// Handle for the page's scroll listeners.
    pub fn scroll_gate(&self) -> ScrollGate {
        self.gate.clone()
    }

    fn flow(&self) -> Option<&Flow> {
        self.flows.get_flow(self.state.page())
    }

    fn step_count(&self) -> usize {
        self.flow().map(Flow::len).unwrap_or(0)
    }

    /// Start at step 0. Returns false (and does nothing) when the page has no
    /// steps. Calling it while active restarts from step 0 in place.
    pub async fn start(&mut self) -> bool {
        let count = self.step_count();
        if count == 0 {
            info!("No tour steps for page {}; not starting", self.state.page());
            return false;
        }

        self.dismiss_summary();
        self.hide_welcome();

        self.state.start(count);
        self.lock_page();
        info!(page = %self.state.page(), steps = count, "Tour started");
        self.render_current().await;
        true
    }

    /// Advance, or complete the tour from the last step.
    pub async fn next(&mut self) {
        let count = self.step_count();
        match self.state.next(count) {
            Transition::Moved { to } => {
                debug!("Tour step {} -> {}", to - 1, to);
                self.render_current().await;
            }
            Transition::Completed => self.finish(true),
            Transition::Unchanged => {}
        }
    }

    /// Go back one step. No-op on the first step.
    pub async fn prev(&mut self) {
        if let Transition::Moved { to } = self.state.prev() {
            debug!("Tour step {} -> {}", to + 1, to);
            self.render_current().await;
        }
    }

    /// Stop the tour. `completed` persists the completion flag and shows the
    /// summary. No-op when inactive.
    pub fn end(&mut self, completed: bool) {
        if self.state.stop() {
            self.finish(completed);
        }
    }

    /// Forget completion and run the tour again.
    pub async fn restart(&mut self) -> bool {
        info!("Restarting tour on page {}", self.state.page());
        self.flags.clear_completed();
        self.start().await
    }

    /// Keyboard contract while active. Returns whether the key was consumed.
    pub async fn handle_key(&mut self, key: Key) -> bool {
        if !self.state.is_active() {
            return false;
        }
        match key {
            Key::Escape => self.end(false),
            Key::ArrowLeft => self.prev().await,
            Key::ArrowRight => self.next().await,
            Key::Other => return false,
        }
        true
    }

    /// Re-measure the current step after a resize or page scroll.
    pub fn reposition(&mut self) -> Option<Placement> {
        let index = self.state.current_step()?;
        let flows = Arc::clone(&self.flows);
        let flow = flows.get_flow(self.state.page())?;
        let step = flow.step(index)?;

        let tooltip = self.tooltip_size();
        let placement = self.placement.layout(step, tooltip);
        let view = self
            .theme
            .step_view(self.state.page(), step, index, flow.len(), placement);
        self.overlay.render(&view);
        self.last_placement = Some(placement);
        Some(placement)
    }

    /// Hide the completion summary before its timer fires.
    pub fn dismiss_summary(&mut self) {
        if let Some(timer) = self.summary.take() {
            if timer.dismiss() {
                self.overlay.hide_summary();
            }
        }
    }

    /// Show the deferred welcome prompt.
    pub fn offer_welcome(&mut self) {
        if self.state.is_active() || self.welcome_visible {
            return;
        }
        self.overlay.show_welcome(&self.theme.welcome_prompt());
        self.welcome_visible = true;
    }

    pub async fn accept_welcome(&mut self) -> bool {
        self.hide_welcome();
        self.start().await
    }

    /// Declining counts as done so the prompt isn't offered again.
    pub fn decline_welcome(&mut self) {
        self.hide_welcome();
        self.flags.mark_completed();
        info!("Welcome prompt declined");
    }

    fn hide_welcome(&mut self) {
        if self.welcome_visible {
            self.overlay.hide_welcome();
            self.welcome_visible = false;
        }
    }

    fn tooltip_size(&self) -> Size {
        self.overlay
            .tooltip_size()
            .unwrap_or(self.config.tooltip_size)
    }

    async fn render_current(&mut self) {
        let Some(index) = self.state.current_step() else {
            return;
        };
        let flows = Arc::clone(&self.flows);
        let Some(flow) = flows.get_flow(self.state.page()) else {
            return;
        };
        let Some(step) = flow.step(index) else {
            return;
        };

        step.enter();

        let tooltip = self.tooltip_size();
        self.gate.programmatic.store(true, Ordering::SeqCst);
        let placement = self.placement.position(step, tooltip).await;
        self.gate.programmatic.store(false, Ordering::SeqCst);

        let view = self
            .theme
            .step_view(self.state.page(), step, index, flow.len(), placement);
        self.overlay.render(&view);
        self.last_placement = Some(placement);
    }

    fn lock_page(&mut self) {
        if self.page_locked {
            return;
        }
        self.overlay.set_scroll_lock(true);
        self.overlay.set_scroll_suppression(true);
        self.gate.active.store(true, Ordering::SeqCst);
        self.page_locked = true;
    }

    fn unlock_page(&mut self) {
        if !self.page_locked {
            return;
        }
        self.gate.active.store(false, Ordering::SeqCst);
        self.overlay.set_scroll_suppression(false);
        self.overlay.set_scroll_lock(false);
        self.page_locked = false;
    }

    /// Tear down after the state machine has gone inactive.
    fn finish(&mut self, completed: bool) {
        self.overlay.clear();
        self.unlock_page();
        self.last_placement = None;
        info!(page = %self.state.page(), completed, "Tour ended");

        if completed {
            self.dismiss_summary();
            self.flags.mark_completed();
            let summary = self.theme.summary(self.flow());
            self.overlay.show_summary(&summary);
            self.summary = Some(SummaryTimer::start(
                Arc::clone(&self.overlay),
                self.config.summary_timeout,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tour::fakes::{FakePage, OverlayEvent};
    use crate::tour::placement::Rect;
    use crate::tour::step::StepDescriptor;

    fn context(location: &str, page: &Arc<FakePage>) -> AppContext {
        let config = TourConfig {
            settle_delay: Duration::ZERO,
            summary_timeout: Duration::from_millis(50),
            ..TourConfig::default()
        };
        AppContext::new(location, TourFlags::in_memory(), page.clone(), page.clone())
            .with_config(config)
    }

    fn workers_page() -> Arc<FakePage> {
        let page = Arc::new(FakePage::new(Size::new(1280.0, 800.0)));
        page.add("[data-tour=\"add-worker\"]", Rect::new(40.0, 80.0, 140.0, 36.0));
        page.add("[data-tour=\"import-excel\"]", Rect::new(200.0, 80.0, 140.0, 36.0));
        page.add("[data-tour=\"workers-table\"]", Rect::new(40.0, 1400.0, 1000.0, 400.0));
        // team-members intentionally missing
        page
    }

    #[tokio::test]
    async fn start_begins_at_first_step_and_locks_page() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));

        assert!(tour.start().await);

        assert_eq!(tour.current_step_index(), Some(0));
        assert!(page.scroll_locked());
        assert!(page.suppression_attached());
        assert_eq!(page.last_view().unwrap().title, "Add a worker");
        assert_eq!(tour.scroll_gate().filter(ScrollKind::Wheel), ScrollDecision::Suppress);
    }

    #[tokio::test]
    async fn start_without_flow_is_silent_noop() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/settings", &page));

        assert!(!tour.start().await);
        assert!(!tour.is_active());
        assert!(page.events().is_empty());
    }

    #[tokio::test]
    async fn empty_flow_does_not_start() {
        let page = workers_page();
        let mut flows = FlowRegistry::builtin();
        flows.insert(PageId::Workers, Flow::default());
        let ctx = context("https://app.test/workers", &page).with_flows(flows);
        let mut tour = TourController::new(&ctx);

        assert!(!tour.start().await);
        assert_eq!(tour.phase(), TourPhase::Inactive);
    }

    #[tokio::test]
    async fn start_twice_does_not_duplicate_side_effects() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));

        tour.start().await;
        tour.next().await;
        tour.start().await;

        assert_eq!(tour.current_step_index(), Some(0));
        assert_eq!(page.count(|e| matches!(e, OverlayEvent::ScrollLock(true))), 1);
        assert_eq!(page.count(|e| matches!(e, OverlayEvent::Suppression(true))), 1);
    }

    #[tokio::test]
    async fn next_three_prev_one_lands_on_third_step() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));

        tour.start().await;
        for _ in 0..3 {
            tour.next().await;
        }
        tour.prev().await;

        assert_eq!(tour.current_step_index(), Some(2));
        assert_eq!(page.last_view().unwrap().progress, "3 of 4");
    }

    #[tokio::test]
    async fn prev_on_first_step_changes_nothing() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));
        tour.start().await;
        let renders = page.count(|e| matches!(e, OverlayEvent::Render(_)));

        tour.prev().await;

        assert_eq!(tour.current_step_index(), Some(0));
        assert_eq!(page.count(|e| matches!(e, OverlayEvent::Render(_))), renders);
    }

    #[tokio::test]
    async fn walking_every_step_completes_exactly_once() {
        let page = workers_page();
        let ctx = context("https://app.test/workers", &page);
        let mut tour = TourController::new(&ctx);

        tour.start().await;
        for _ in 0..4 {
            assert!(tour.is_active());
            tour.next().await;
        }
        // extra presses after completion do nothing
        tour.next().await;
        tour.end(true);

        assert!(!tour.is_active());
        assert!(ctx.flags.is_completed());
        assert_eq!(page.count(|e| matches!(e, OverlayEvent::ShowSummary(_))), 1);
        assert!(!page.scroll_locked());
        assert!(!page.suppression_attached());
        assert_eq!(tour.scroll_gate().filter(ScrollKind::Wheel), ScrollDecision::Allow);
    }

    #[tokio::test]
    async fn missing_target_step_is_centered_and_passable() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));
        tour.start().await;
        for _ in 0..3 {
            tour.next().await;
        }

        let view = page.last_view().unwrap();
        assert_eq!(view.title, "Team members");
        assert!(view.placement.is_centered());
        assert_eq!(view.next_label, "Finish");

        tour.next().await;
        assert!(!tour.is_active());
    }

    #[tokio::test]
    async fn offscreen_step_scrolls_once_and_is_allowed_through_gate() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));
        let gate = tour.scroll_gate();
        page.watch_gate(gate.clone());

        tour.start().await;
        tour.next().await;
        tour.next().await;

        assert_eq!(page.scroll_count(), 1);
        assert_eq!(page.gate_decisions(), vec![ScrollDecision::Allow]);
        assert_eq!(gate.filter(ScrollKind::TouchMove), ScrollDecision::Suppress);
    }

    #[tokio::test]
    async fn user_gestures_stay_suppressed_during_scroll_into_view() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));
        page.watch_gate(tour.scroll_gate());

        tour.start().await;
        tour.next().await;
        tour.next().await;

        assert_eq!(
            page.gesture_decisions(),
            vec![ScrollDecision::Suppress, ScrollDecision::Suppress]
        );
    }

    #[tokio::test]
    async fn reposition_never_scrolls() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));
        tour.start().await;
        let scrolls = page.scroll_count();

        page.move_element("[data-tour=\"add-worker\"]", Rect::new(40.0, 2400.0, 140.0, 36.0));
        let placement = tour.reposition().unwrap();

        assert_eq!(page.scroll_count(), scrolls);
        assert_eq!(placement.spotlight.unwrap().top, 2390.0);
    }

    #[tokio::test]
    async fn escape_skips_without_completing() {
        let page = workers_page();
        let ctx = context("https://app.test/workers", &page);
        let mut tour = TourController::new(&ctx);
        tour.start().await;

        assert!(tour.handle_key(Key::ArrowRight).await);
        assert_eq!(tour.current_step_index(), Some(1));
        assert!(tour.handle_key(Key::ArrowLeft).await);
        assert_eq!(tour.current_step_index(), Some(0));
        assert!(!tour.handle_key(Key::Other).await);
        assert!(tour.handle_key(Key::Escape).await);

        assert!(!tour.is_active());
        assert!(!ctx.flags.is_completed());
        assert_eq!(page.count(|e| matches!(e, OverlayEvent::ShowSummary(_))), 0);
        assert!(page.events().contains(&OverlayEvent::Clear));
        assert!(!tour.handle_key(Key::Escape).await);
    }

    #[tokio::test]
    async fn restart_clears_completion_and_starts_over() {
        let page = workers_page();
        let ctx = context("https://app.test/workers", &page);
        let mut tour = TourController::new(&ctx);
        ctx.flags.mark_completed();

        assert!(tour.restart().await);

        assert!(!ctx.flags.is_completed());
        assert_eq!(tour.current_step_index(), Some(0));
    }

    #[tokio::test]
    async fn summary_auto_dismisses_once() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));
        tour.start().await;
        for _ in 0..4 {
            tour.next().await;
        }
        assert!(tour.summary_visible());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!tour.summary_visible());
        tour.dismiss_summary();

        assert_eq!(page.count(|e| matches!(e, OverlayEvent::HideSummary)), 1);
    }

    #[tokio::test]
    async fn explicit_dismissal_beats_timer() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));
        tour.start().await;
        for _ in 0..4 {
            tour.next().await;
        }

        tour.dismiss_summary();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(page.count(|e| matches!(e, OverlayEvent::HideSummary)), 1);
    }

    #[tokio::test]
    async fn reposition_tracks_layout_changes() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));
        tour.start().await;
        let before = tour.last_placement().unwrap().spotlight.unwrap();

        page.move_element("[data-tour=\"add-worker\"]", Rect::new(300.0, 200.0, 140.0, 36.0));
        let after = tour.reposition().unwrap().spotlight.unwrap();

        assert_ne!(before, after);
        assert_eq!(after.left, 290.0);
    }

    #[tokio::test]
    async fn reposition_when_inactive_is_none() {
        let page = workers_page();
        let mut tour = TourController::new(&context("https://app.test/workers", &page));
        assert!(tour.reposition().is_none());
    }

    #[tokio::test]
    async fn enter_hook_runs_on_each_activation() {
        use std::sync::atomic::AtomicUsize;

        let page = workers_page();
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        let mut flows = FlowRegistry::empty();
        flows.insert(
            PageId::Tasks,
            Flow::new(vec![
                StepDescriptor::new("Open", "opens panel").on_enter(move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                }),
                StepDescriptor::new("Done", "done"),
            ]),
        );
        let ctx = context("https://app.test/tasks", &page).with_flows(flows);
        let mut tour = TourController::new(&ctx);

        tour.start().await;
        tour.next().await;
        tour.prev().await;

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn welcome_prompt_accept_and_decline() {
        let page = workers_page();
        let ctx = context("https://app.test/workers", &page);

        let mut tour = TourController::new(&ctx);
        tour.offer_welcome();
        tour.offer_welcome();
        assert_eq!(page.count(|e| matches!(e, OverlayEvent::ShowWelcome)), 1);
        assert!(tour.accept_welcome().await);
        assert!(tour.is_active());
        assert_eq!(page.count(|e| matches!(e, OverlayEvent::HideWelcome)), 1);

        let mut other = TourController::new(&ctx);
        other.offer_welcome();
        other.decline_welcome();
        assert!(!other.is_active());
        assert!(ctx.flags.is_completed());
    }

    #[test]
    fn dom_key_mapping() {
        assert_eq!(Key::from_dom_key("Escape"), Key::Escape);
        assert_eq!(Key::from_dom_key("ArrowRight"), Key::ArrowRight);
        assert_eq!(Key::from_dom_key("Left"), Key::ArrowLeft);
        assert_eq!(Key::from_dom_key("Enter"), Key::Other);
    }
}
