use tracing::debug;

use crate::error::AppError;
use crate::models::planning::{PlanRequest, PlanResult};
use crate::services::planning_service::PlanningService;
use crate::services::request_validation::validate_request;
use crate::utils::clock::{Clock, SystemClock};

use super::CommandResult;

/// Validates the request, then plans against the system clock.
pub fn planning_generate(payload: PlanRequest) -> CommandResult<PlanResult> {
    planning_generate_with(SystemClock, payload)
}

pub fn planning_generate_with<C: Clock>(clock: C, payload: PlanRequest) -> CommandResult<PlanResult> {
    validate_request(&payload)?;
    let service = PlanningService::with_clock(clock);
    Ok(service.generate(&payload))
}

/// JSON in, JSON out. Used by the `planner` binary and by embedders without serde types.
pub fn planning_generate_json(payload: &str) -> CommandResult<String> {
    planning_generate_json_with(SystemClock, payload, false)
}

pub fn planning_generate_json_with<C: Clock>(
    clock: C,
    payload: &str,
    pretty: bool,
) -> CommandResult<String> {
    if payload.trim().is_empty() {
        return Err(AppError::validation("plan request is empty").into());
    }
    let request: PlanRequest = serde_json::from_str(payload).map_err(AppError::from)?;
    debug!(target: "app::command", tasks = request.tasks.len(), events = request.events.len(), "plan request decoded");

    let result = planning_generate_with(clock, request)?;
    let encoded = if pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    };
    encoded.map_err(|err| AppError::from(err).into())
}
