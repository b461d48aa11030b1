use std::collections::HashSet;

use tracing::info;

use crate::models::calendar::CalendarEvent;
use crate::models::planning::{PlanRequest, PlanResult, PlannedBlock, PlannerOptions};
use crate::models::settings::Settings;
use crate::models::task::Task;
use crate::services::allocator::BlockAllocator;
use crate::services::free_slots::{build_free_slots, busy_intervals};
use crate::services::plan_validator::validate_plan;
use crate::services::settings_service::ResolvedSettings;
use crate::services::task_ordering::order_tasks;
use crate::services::task_service::ResolvedTask;
use crate::utils::clock::{Clock, SystemClock};

/// Entry point for plan generation. Stateless between runs; every call samples the clock
/// exactly once.
#[derive(Debug, Clone, Default)]
pub struct PlanningService<C: Clock = SystemClock> {
    clock: C,
    options: PlannerOptions,
}

impl PlanningService<SystemClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> PlanningService<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            options: PlannerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PlannerOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs a request using the options it carries rather than the service defaults.
    pub fn generate(&self, request: &PlanRequest) -> PlanResult {
        self.run(
            &request.tasks,
            &request.events,
            &request.settings,
            &request.locked_blocks,
            &request.options,
        )
    }

    pub fn generate_plan(
        &self,
        tasks: &[Task],
        events: &[CalendarEvent],
        settings: &Settings,
        locked_blocks: &[PlannedBlock],
    ) -> PlanResult {
        self.run(tasks, events, settings, locked_blocks, &self.options)
    }

    fn run(
        &self,
        tasks: &[Task],
        events: &[CalendarEvent],
        settings: &Settings,
        locked_blocks: &[PlannedBlock],
        options: &PlannerOptions,
    ) -> PlanResult {
        let resolved = ResolvedSettings::resolve(settings);
        let now = self.clock.now();
        let today = resolved.local_date(now);

        let busy = busy_intervals(events, locked_blocks);
        let slots = build_free_slots(&resolved, today, &busy);

        let ordered = order_tasks(tasks, options.dependency_mode);
        let allocation = BlockAllocator::new(&resolved, now, slots, locked_blocks)
            .allocate_all(ordered.into_iter().map(ResolvedTask::resolve));

        let mut blocks = Vec::with_capacity(locked_blocks.len() + allocation.blocks.len());
        blocks.extend(locked_blocks.iter().cloned());
        blocks.extend(allocation.blocks);

        let mut warnings = allocation.warnings;
        warnings.extend(validate_plan(&blocks, events, &resolved));

        let assumptions = collect_assumptions(&resolved, tasks);

        info!(
            target: "app::planning",
            tasks = tasks.len(),
            locked = locked_blocks.len(),
            blocks = blocks.len(),
            warnings = warnings.len(),
            dependency_mode = ?options.dependency_mode,
            "plan generated"
        );

        PlanResult {
            blocks,
            warnings,
            assumptions,
            generated_at: resolved.to_local(now),
        }
    }
}

/// Settings fallbacks first, then the working baseline, then per-task notes. Duplicates
/// keep their first position.
fn collect_assumptions(settings: &ResolvedSettings, tasks: &[Task]) -> Vec<String> {
    let task_notes = tasks
        .iter()
        .flat_map(|task| task.assumptions.as_deref().unwrap_or_default())
        .cloned();

    let mut seen = HashSet::new();
    settings
        .notes
        .iter()
        .cloned()
        .chain(settings.describe())
        .chain(task_notes)
        .filter(|note| seen.insert(note.clone()))
        .collect()
}
