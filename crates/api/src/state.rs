use std::sync::Arc;

use fieldform_db::JsonStore;

use crate::ai::Generator;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Form and submission store.
    pub store: Arc<JsonStore>,
    pub config: Arc<ServerConfig>,
    /// Prompt-to-schema generator (model-backed or offline).
    pub generator: Arc<Generator>,
}
