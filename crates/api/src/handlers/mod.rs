pub mod dashboard;
pub mod forms;
pub mod schemas;
pub mod submissions;
