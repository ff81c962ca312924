//! Domain logic for FieldForm: the declarative form schema, the
//! submission validator and threshold notifier, plus the role, approval,
//! dashboard and report rules shared by the store and the HTTP layer.
//!
//! Nothing in this crate performs I/O.

pub mod access;
pub mod approval;
pub mod dashboard;
pub mod error;
pub mod generator;
pub mod notify;
pub mod numbers;
pub mod report;
pub mod roles;
pub mod schema;
pub mod templates;
pub mod types;
pub mod validation;
