//! Tour state machine — which step of which page is showing.

use super::page::PageId;

/// `Inactive` or showing a step. The step index only exists while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TourPhase {
    #[default]
    Inactive,
    Active { step: usize },
}

impl std::fmt::Display for TourPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::Active { step } => write!(f, "active({step})"),
        }
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Now showing this step.
    Moved { to: usize },
    /// Walked past the last step; the tour is inactive.
    Completed,
    /// Nothing changed.
    Unchanged,
}

/// Mutable tour state, one per controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourState {
    page: PageId,
    phase: TourPhase,
}

impl TourState {
    pub fn new(page: PageId) -> Self {
        Self {
            page,
            phase: TourPhase::Inactive,
        }
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn phase(&self) -> TourPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, TourPhase::Active { .. })
    }

    pub fn current_step(&self) -> Option<usize> {
        match self.phase {
            TourPhase::Active { step } => Some(step),
            TourPhase::Inactive => None,
        }
    }

    /// Enter step 0. Refuses an empty flow so `Active` always has a step.
    pub fn start(&mut self, step_count: usize) -> bool {
        if step_count == 0 {
            return false;
        }
        self.phase = TourPhase::Active { step: 0 };
        true
    }

    pub fn next(&mut self, step_count: usize) -> Transition {
        match self.phase {
            TourPhase::Active { step } if step + 1 < step_count => {
                self.phase = TourPhase::Active { step: step + 1 };
                Transition::Moved { to: step + 1 }
            }
            TourPhase::Active { .. } => {
                self.phase = TourPhase::Inactive;
                Transition::Completed
            }
            TourPhase::Inactive => Transition::Unchanged,
        }
    }

    pub fn prev(&mut self) -> Transition {
        match self.phase {
            TourPhase::Active { step } if step > 0 => {
                self.phase = TourPhase::Active { step: step - 1 };
                Transition::Moved { to: step - 1 }
            }
            _ => Transition::Unchanged,
        }
    }

    /// Leave the active phase. Returns whether the tour was active.
    pub fn stop(&mut self) -> bool {
        let was_active = self.is_active();
        self.phase = TourPhase::Inactive;
        was_active
    }
}
