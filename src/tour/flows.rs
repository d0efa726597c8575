//! Flow registry — per-page step lists.

use std::collections::HashMap;

use crate::error::ConfigError;

use super::page::PageId;
use super::step::{Position, StepDescriptor};

/// Ordered steps for one page.
#[derive(Debug, Clone, Default)]
pub struct Flow {
    steps: Vec<StepDescriptor>,
}

impl Flow {
    pub fn new(steps: Vec<StepDescriptor>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Page id -> flow lookup. Read-only once handed to a controller.
#[derive(Debug, Clone, Default)]
pub struct FlowRegistry {
    flows: HashMap<PageId, Flow>,
}

impl FlowRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The app's built-in flows.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.insert(PageId::Signin, Flow::new(signin_steps()));
        registry.insert(PageId::Home, Flow::new(home_steps()));
        registry.insert(PageId::Workers, Flow::new(workers_steps()));
        registry.insert(PageId::Tasks, Flow::new(tasks_steps()));
        registry.insert(PageId::Reports, Flow::new(reports_steps()));
        registry.insert(PageId::Attendance, Flow::new(attendance_steps()));
        registry
    }

    /// Load flows from JSON of the form `{"workers": [{"title": ..}, ..], ..}`.
    ///
    /// Pages must be known page names; `unknown` is rejected since it never
    /// shows a tour.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, Vec<StepDescriptor>> = serde_json::from_str(json)?;
        let mut registry = Self::empty();
        for (name, steps) in raw {
            let page = PageId::from_name(&name)
                .filter(|p| !p.is_unknown())
                .ok_or(ConfigError::UnknownPage(name))?;
            registry.insert(page, Flow::new(steps));
        }
        Ok(registry)
    }

    /// Register or replace a page's flow.
    pub fn insert(&mut self, page: PageId, flow: Flow) {
        self.flows.insert(page, flow);
    }

    /// Overlay another registry's flows onto this one.
    pub fn merge(&mut self, other: FlowRegistry) {
        self.flows.extend(other.flows);
    }

    pub fn get_flow(&self, page: PageId) -> Option<&Flow> {
        self.flows.get(&page)
    }
}

fn tour(selector: &str) -> String {
    format!("[data-tour=\"{selector}\"]")
}

fn signin_steps() -> Vec<StepDescriptor> {
    vec![
        StepDescriptor::new(
            "Welcome",
            "Sign in to manage your workers, tasks and payroll in one place.",
        ),
        StepDescriptor::new("Sign in with Google", "Use your work Google account to sign in.")
            .with_target(tour("google-signin"), Position::Bottom),
        StepDescriptor::new(
            "Choose a workspace",
            "Pick the business you want to manage, or create a new workspace.",
        )
        .with_target(tour("workspace-select"), Position::Top),
    ]
}

fn home_steps() -> Vec<StepDescriptor> {
    vec![
        StepDescriptor::new(
            "Your dashboard",
            "Today's attendance, open tasks and upcoming payroll at a glance.",
        ),
        StepDescriptor::new("Navigation", "Jump between workers, tasks, attendance and reports.")
            .with_target(tour("sidebar"), Position::Right),
        StepDescriptor::new("Quick stats", "Headcount and hours logged this week.")
            .with_target(tour("stats-cards"), Position::Bottom),
        StepDescriptor::new("Language", "Switch the interface language at any time.")
            .with_target(tour("language-switcher"), Position::Bottom)
            .without_scroll(),
        StepDescriptor::new("Need help?", "Replay this tour from the <b>?</b> button.")
            .with_target(tour("help-button"), Position::Left)
            .without_scroll(),
    ]
}

fn workers_steps() -> Vec<StepDescriptor> {
    vec![
        StepDescriptor::new("Add a worker", "Create a worker profile with wage and role.")
            .with_target(tour("add-worker"), Position::Bottom),
        StepDescriptor::new(
            "Import from Excel",
            "Bring in an existing roster from an <code>.xlsx</code> file.",
        )
        .with_target(tour("import-excel"), Position::Bottom),
        StepDescriptor::new("Worker list", "Search, edit or deactivate workers here.")
            .with_target(tour("workers-table"), Position::Top)
            .with_padding(8.0),
        StepDescriptor::new("Team members", "Invite managers who can help run the workspace.")
            .with_target(tour("team-members"), Position::Left),
    ]
}

fn tasks_steps() -> Vec<StepDescriptor> {
    vec![
        StepDescriptor::new("Create a task", "Describe the job and assign workers to it.")
            .with_target(tour("add-task"), Position::Bottom),
        StepDescriptor::new("Task board", "Track progress from open to done.")
            .with_target(tour("tasks-list"), Position::Top),
        StepDescriptor::new("Filters", "Narrow the list by worker, status or due date.")
            .with_target(tour("task-filters"), Position::Bottom),
    ]
}

fn reports_steps() -> Vec<StepDescriptor> {
    vec![
        StepDescriptor::new("Pick a period", "Reports cover the date range you choose.")
            .with_target(tour("report-range"), Position::Bottom),
        StepDescriptor::new("Payroll summary", "Hours and wages per worker for the period.")
            .with_target(tour("payroll-summary"), Position::Top),
        StepDescriptor::new("Export", "Download the report for your accountant.")
            .with_target(tour("report-export"), Position::Left),
    ]
}

fn attendance_steps() -> Vec<StepDescriptor> {
    vec![
        StepDescriptor::new("Pick a date", "Attendance is recorded per day.")
            .with_target(tour("attendance-date"), Position::Bottom),
        StepDescriptor::new("Mark attendance", "Tap a worker to mark present, absent or half day.")
            .with_target(tour("attendance-list"), Position::Top),
        StepDescriptor::new("Save", "Changes are saved for the selected day.")
            .with_target(tour("attendance-save"), Position::Top),
    ]
}
