//! Step descriptors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Which side of the spotlight the tooltip prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl Position {
    pub fn opposite(&self) -> Position {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Callback run when a step becomes active (e.g. open a side panel so the
/// target is rendered). Registered in code, never parsed from markup.
pub type StepHook = Arc<dyn Fn(&StepDescriptor) + Send + Sync>;

/// One step of a flow.
#[derive(Clone, Serialize, Deserialize)]
pub struct StepDescriptor {
    pub title: String,
    /// May contain inline markup; rendered as-is by the overlay.
    pub description: String,
    /// CSS selector of the target. `None` centers the tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default)]
    pub position: Position,
    /// Spotlight padding in pixels. `None` uses the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(default = "default_scroll_into_view")]
    pub scroll_into_view: bool,
    #[serde(skip)]
    pub on_enter: Option<StepHook>,
}

fn default_scroll_into_view() -> bool {
    true
}

impl StepDescriptor {
    /// A centered step with no target.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            selector: None,
            position: Position::default(),
            padding: None,
            scroll_into_view: true,
            on_enter: None,
        }
    }

    pub fn with_target(mut self, selector: impl Into<String>, position: Position) -> Self {
        self.selector = Some(selector.into());
        self.position = position;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn without_scroll(mut self) -> Self {
        self.scroll_into_view = false;
        self
    }

    pub fn on_enter(mut self, hook: impl Fn(&StepDescriptor) + Send + Sync + 'static) -> Self {
        self.on_enter = Some(Arc::new(hook));
        self
    }

    /// Run the enter hook, if any.
    pub fn enter(&self) {
        if let Some(hook) = &self.on_enter {
            hook(self);
        }
    }
}

impl std::fmt::Debug for StepDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("title", &self.title)
            .field("selector", &self.selector)
            .field("position", &self.position)
            .field("padding", &self.padding)
            .field("scroll_into_view", &self.scroll_into_view)
            .field("on_enter", &self.on_enter.is_some())
            .finish()
    }
}
