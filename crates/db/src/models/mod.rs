pub mod form;
pub mod submission;
