//! Flat-file persistence for forms and submissions.
//!
//! Each collection lives in its own pretty-printed JSON document keyed by
//! id under the data directory. The whole store is held in memory behind a
//! lock and a collection is rewritten in full after every mutation.

pub mod models;
pub mod repositories;
pub mod seed;
pub mod store;

pub use store::{JsonStore, StoreError};
