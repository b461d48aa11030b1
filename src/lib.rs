pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use commands::planning::{planning_generate, planning_generate_json};
pub use models::planning::{PlanRequest, PlanResult};
pub use services::planning_service::PlanningService;
