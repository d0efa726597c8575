//! In-memory page double: element layout plus a recording overlay.

use std::sync::Mutex;

use super::controller::{ScrollDecision, ScrollGate, ScrollKind};
use super::overlay::{CompletionSummary, StepView, TourOverlay, WelcomePrompt};
use super::placement::{ElementHandle, ElementLocator, Rect, Size};

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    Render(StepView),
    Clear,
    ScrollLock(bool),
    Suppression(bool),
    ShowSummary(CompletionSummary),
    HideSummary,
    ShowWelcome,
    HideWelcome,
}

struct Element {
    selector: String,
    rect: Rect,
    rendered: bool,
}

#[derive(Default)]
struct Inner {
    elements: Vec<Element>,
    events: Vec<OverlayEvent>,
    scrolls: usize,
    gate: Option<ScrollGate>,
    gate_decisions: Vec<ScrollDecision>,
    gesture_decisions: Vec<ScrollDecision>,
}

pub struct FakePage {
    viewport: Size,
    inner: Mutex<Inner>,
}

impl FakePage {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn add(&self, selector: &str, rect: Rect) {
        self.push(selector, rect, true);
    }

    /// Present in the document but not rendered.
    pub fn add_hidden(&self, selector: &str, rect: Rect) {
        self.push(selector, rect, false);
    }

    fn push(&self, selector: &str, rect: Rect, rendered: bool) {
        self.inner.lock().unwrap().elements.push(Element {
            selector: selector.to_string(),
            rect,
            rendered,
        });
    }

    pub fn move_element(&self, selector: &str, rect: Rect) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(el) = inner.elements.iter_mut().find(|e| e.selector == selector) {
            el.rect = rect;
        }
    }

    /// Record what the gate says whenever the page scrolls.
    pub fn watch_gate(&self, gate: ScrollGate) {
        self.inner.lock().unwrap().gate = Some(gate);
    }

    pub fn gate_decisions(&self) -> Vec<ScrollDecision> {
        self.inner.lock().unwrap().gate_decisions.clone()
    }

    /// What the gate said about wheel and touch input arriving mid-scroll.
    pub fn gesture_decisions(&self) -> Vec<ScrollDecision> {
        self.inner.lock().unwrap().gesture_decisions.clone()
    }

    pub fn scroll_count(&self) -> usize {
        self.inner.lock().unwrap().scrolls
    }

    pub fn events(&self) -> Vec<OverlayEvent> {
        self.inner.lock().unwrap().events.clone()
    }

    pub fn count(&self, pred: impl Fn(&OverlayEvent) -> bool) -> usize {
        self.inner.lock().unwrap().events.iter().filter(|e| pred(e)).count()
    }

    pub fn last_view(&self) -> Option<StepView> {
        self.inner
            .lock()
            .unwrap()
            .events
            .iter()
            .rev()
            .find_map(|e| match e {
                OverlayEvent::Render(view) => Some(view.clone()),
                _ => None,
            })
    }

    pub fn scroll_locked(&self) -> bool {
        self.last_toggle(|e| match e {
            OverlayEvent::ScrollLock(on) => Some(*on),
            _ => None,
        })
    }

    pub fn suppression_attached(&self) -> bool {
        self.last_toggle(|e| match e {
            OverlayEvent::Suppression(on) => Some(*on),
            _ => None,
        })
    }

    fn last_toggle(&self, pick: impl Fn(&OverlayEvent) -> Option<bool>) -> bool {
        self.inner
            .lock()
            .unwrap()
            .events
            .iter()
            .rev()
            .find_map(pick)
            .unwrap_or(false)
    }

    fn record(&self, event: OverlayEvent) {
        self.inner.lock().unwrap().events.push(event);
    }
}

impl ElementLocator for FakePage {
    fn locate(&self, selector: &str) -> Option<ElementHandle> {
        let inner = self.inner.lock().unwrap();
        inner
            .elements
            .iter()
            .position(|e| e.selector == selector)
            .map(|i| ElementHandle::new(i as u64))
    }

    fn bounding_rect(&self, element: &ElementHandle) -> Option<Rect> {
        let inner = self.inner.lock().unwrap();
        inner.elements.get(element.id() as usize).map(|e| e.rect)
    }

    fn is_rendered(&self, element: &ElementHandle) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .elements
            .get(element.id() as usize)
            .is_some_and(|e| e.rendered)
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn scroll_to_center(&self, element: &ElementHandle) {
        let mut inner = self.inner.lock().unwrap();
        let Some(target) = inner.elements.get(element.id() as usize).map(|e| e.rect) else {
            return;
        };
        let shift = self.viewport.height / 2.0 - target.center_y();
        for el in &mut inner.elements {
            el.rect.top += shift;
        }
        inner.scrolls += 1;
        if let Some(gate) = inner.gate.clone() {
            let decision = gate.filter(ScrollKind::Scroll);
            inner.gate_decisions.push(decision);
            for kind in [ScrollKind::Wheel, ScrollKind::TouchMove] {
                let decision = gate.filter(kind);
                inner.gesture_decisions.push(decision);
            }
        }
    }
}

impl TourOverlay for FakePage {
    fn render(&self, view: &StepView) {
        self.record(OverlayEvent::Render(view.clone()));
    }

    fn clear(&self) {
        self.record(OverlayEvent::Clear);
    }

    fn set_scroll_lock(&self, locked: bool) {
        self.record(OverlayEvent::ScrollLock(locked));
    }

    fn set_scroll_suppression(&self, attached: bool) {
        self.record(OverlayEvent::Suppression(attached));
    }

    fn show_summary(&self, summary: &CompletionSummary) {
        self.record(OverlayEvent::ShowSummary(summary.clone()));
    }

    fn hide_summary(&self) {
        self.record(OverlayEvent::HideSummary);
    }

    fn show_welcome(&self, _prompt: &WelcomePrompt) {
        self.record(OverlayEvent::ShowWelcome);
    }

    fn hide_welcome(&self) {
        self.record(OverlayEvent::HideWelcome);
    }
}
