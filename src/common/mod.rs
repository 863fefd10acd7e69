pub mod codes;
pub mod forms;
pub mod models;
pub mod uploads;
