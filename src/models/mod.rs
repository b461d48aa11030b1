pub mod calendar;
pub mod planning;
pub mod settings;
pub mod task;
