pub mod allocator;
pub mod confidence;
pub mod free_slots;
pub mod interval;
pub mod plan_validator;
pub mod planning_service;
pub mod request_validation;
pub mod schedule_utils;
pub mod settings_service;
pub mod task_ordering;
pub mod task_service;
