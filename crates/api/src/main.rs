use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fieldform_api::ai::Generator;
use fieldform_api::config::ServerConfig;
use fieldform_api::router::build_app_router;
use fieldform_api::state::AppState;
use fieldform_db::JsonStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldform_api=debug,fieldform_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let store = JsonStore::open(&config.data_dir)
        .await
        .expect("Failed to open data directory");

    if config.seed_demo_forms {
        fieldform_db::seed::seed_demo_forms(&store)
            .await
            .expect("Failed to seed demo forms");
    }

    let generator = Generator::new(config.ai.clone());
    if generator.is_configured() {
        tracing::info!(model = %config.ai.model, "Schema generation uses the model API");
    } else {
        tracing::warn!("AI_API_KEY not set, schema generation uses built-in templates");
    }

    let state = AppState {
        store: Arc::new(store),
        config: Arc::new(config.clone()),
        generator: Arc::new(generator),
    };

    let app = build_app_router(state);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
