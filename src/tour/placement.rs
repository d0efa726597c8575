//! Placement engine — spotlight and tooltip geometry.
//!
//! Given a step, the engine finds the target element through an
//! [`ElementLocator`], optionally scrolls it into view, and computes:
//!
//! - the spotlight: the target's box grown by the step padding
//! - the tooltip: placed on the step's preferred side at a fixed gap,
//!   flipped to the opposite side when it doesn't fit, then clamped inside
//!   the viewport with a fixed margin
//!
//! A step with no selector, or whose selector matches nothing visible, gets a
//! centered tooltip and no spotlight. Placement never fails.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TourConfig;

use super::step::{Position, StepDescriptor};

/// Width and height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The viewport itself.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Zero-area boxes belong to elements that are present but not laid out.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn expand(&self, by: f64) -> Rect {
        Rect::new(
            self.left - by,
            self.top - by,
            self.width + 2.0 * by,
            self.height + 2.0 * by,
        )
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Opaque reference to an element found by an [`ElementLocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Read access to page layout, plus the one scroll the tour is allowed to make.
pub trait ElementLocator: Send + Sync {
    /// First element matching `selector`. Invalid selectors match nothing.
    fn locate(&self, selector: &str) -> Option<ElementHandle>;

    /// Current bounding box in viewport coordinates, `None` once detached.
    fn bounding_rect(&self, element: &ElementHandle) -> Option<Rect>;

    /// False for `display: none`, `visibility: hidden` and similar.
    fn is_rendered(&self, element: &ElementHandle) -> bool;

    fn viewport(&self) -> Size;

    /// Smooth-scroll so the element is vertically centered.
    fn scroll_to_center(&self, element: &ElementHandle);
}

/// Computed geometry for one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// `None` when the step has no usable target.
    pub spotlight: Option<Rect>,
    pub tooltip: Rect,
    /// Side the tooltip ended up on, `None` when centered.
    pub side: Option<Position>,
}

impl Placement {
    pub fn is_centered(&self) -> bool {
        self.spotlight.is_none()
    }
}

pub struct PlacementEngine {
    locator: Arc<dyn ElementLocator>,
    config: TourConfig,
}

impl PlacementEngine {
    pub fn new(locator: Arc<dyn ElementLocator>, config: TourConfig) -> Self {
        Self { locator, config }
    }

    /// Full placement: resolve, scroll into view if needed, wait for the
    /// scroll to settle, then lay out.
    pub async fn position(&self, step: &StepDescriptor, tooltip: Size) -> Placement {
        let Some((element, rect)) = self.resolve_target(step) else {
            return self.centered(tooltip);
        };

        let viewport = Rect::from_size(self.locator.viewport());
        if step.scroll_into_view && !viewport.contains(&rect) {
            debug!("Scrolling {:?} into view", step.selector);
            self.locator.scroll_to_center(&element);
            if !self.config.settle_delay.is_zero() {
                tokio::time::sleep(self.config.settle_delay).await;
            }
            return self.layout(step, tooltip);
        }

        self.around(rect, step, tooltip)
    }

    /// Re-measure and lay out without scrolling. Used on resize/scroll.
    pub fn layout(&self, step: &StepDescriptor, tooltip: Size) -> Placement {
        match self.resolve_target(step) {
            Some((_, rect)) => self.around(rect, step, tooltip),
            None => self.centered(tooltip),
        }
    }

    /// The step's target if it is matched, rendered and has a non-empty box.
    pub fn resolve_target(&self, step: &StepDescriptor) -> Option<(ElementHandle, Rect)> {
        let selector = step.selector.as_deref()?;
        let Some(element) = self.locator.locate(selector) else {
            debug!("No element for selector {selector}");
            return None;
        };
        if !self.locator.is_rendered(&element) {
            debug!("Element for {selector} is not rendered");
            return None;
        }
        let rect = self.locator.bounding_rect(&element)?;
        if rect.is_empty() {
            debug!("Element for {selector} has an empty box");
            return None;
        }
        Some((element, rect))
    }

    fn centered(&self, tooltip: Size) -> Placement {
        let viewport = self.locator.viewport();
        let rect = Rect::new(
            (viewport.width - tooltip.width) / 2.0,
            (viewport.height - tooltip.height) / 2.0,
            tooltip.width,
            tooltip.height,
        );
        Placement {
            spotlight: None,
            tooltip: clamp_to_viewport(rect, viewport, self.config.viewport_margin),
            side: None,
        }
    }

    fn around(&self, target: Rect, step: &StepDescriptor, tooltip: Size) -> Placement {
        let viewport = self.locator.viewport();
        let margin = self.config.viewport_margin;
        let padding = step.padding.unwrap_or(self.config.default_padding);
        let spotlight = target.expand(padding);

        let mut side = step.position;
        let mut rect = beside(spotlight, side, tooltip, self.config.tooltip_gap);
        if self.config.auto_flip && !fits(&rect, side, viewport, margin) {
            let flipped = side.opposite();
            let candidate = beside(spotlight, flipped, tooltip, self.config.tooltip_gap);
            if fits(&candidate, flipped, viewport, margin) {
                side = flipped;
                rect = candidate;
            }
        }

        Placement {
            spotlight: Some(spotlight),
            tooltip: clamp_to_viewport(rect, viewport, margin),
            side: Some(side),
        }
    }
}

/// Tooltip rect on `side` of `anchor`, centered on the other axis.
fn beside(anchor: Rect, side: Position, tooltip: Size, gap: f64) -> Rect {
    let (left, top) = match side {
        Position::Bottom => (anchor.center_x() - tooltip.width / 2.0, anchor.bottom() + gap),
        Position::Top => (
            anchor.center_x() - tooltip.width / 2.0,
            anchor.top - gap - tooltip.height,
        ),
        Position::Left => (
            anchor.left - gap - tooltip.width,
            anchor.center_y() - tooltip.height / 2.0,
        ),
        Position::Right => (anchor.right() + gap, anchor.center_y() - tooltip.height / 2.0),
    };
    Rect::new(left, top, tooltip.width, tooltip.height)
}

/// Whether `rect` stays inside the viewport along the axis `side` pushes it.
fn fits(rect: &Rect, side: Position, viewport: Size, margin: f64) -> bool {
    match side {
        Position::Top => rect.top >= margin,
        Position::Bottom => rect.bottom() <= viewport.height - margin,
        Position::Left => rect.left >= margin,
        Position::Right => rect.right() <= viewport.width - margin,
    }
}

/// Keep `rect` inside `[margin, viewport - margin]` on both axes, shrinking
/// it if it is larger than the available space.
pub fn clamp_to_viewport(rect: Rect, viewport: Size, margin: f64) -> Rect {
    let margin = if margin.is_finite() { margin.max(0.0) } else { 0.0 };
    let width = rect.width.min((viewport.width - 2.0 * margin).max(0.0));
    let height = rect.height.min((viewport.height - 2.0 * margin).max(0.0));
    let max_left = (viewport.width - margin - width).max(margin);
    let max_top = (viewport.height - margin - height).max(margin);
    Rect::new(
        rect.left.clamp(margin, max_left),
        rect.top.clamp(margin, max_top),
        width,
        height,
    )
}
