//! Regression Prediction API Server
//!
//! Serves a single pre-trained regression model over HTTP.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use inference_engine::{InferenceEngine, Regressor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

pub mod config;
mod error;
mod routes;

pub use crate::config::{LogFormat, LoggingConfig, ServerConfig};
pub use crate::error::{ApiError, ErrorResponse};
pub use routes::health::HealthResponse;
pub use routes::predict::PredictResponse;

/// Application state shared across handlers, read-only after startup
pub struct AppState {
    /// Loaded model, `None` if loading failed
    pub model: Option<Arc<dyn Regressor>>,
    /// Where the model was loaded from
    pub model_path: PathBuf,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

/// Handle passed to every handler
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create application state around an already-loaded model
    pub fn new(model: Option<Arc<dyn Regressor>>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            model,
            model_path: model_path.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Load the model at `model_path`; failure leaves the model absent
    pub fn load(model_path: &Path) -> Self {
        Self::new(load_model(model_path), model_path)
    }

    /// Whether a model is available for inference
    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }
}

/// Load the model once. Errors are logged, not returned, so the server can
/// still start and answer 500 on `/predict`.
pub fn load_model(path: &Path) -> Option<Arc<dyn Regressor>> {
    match InferenceEngine::load(path) {
        Ok(engine) => {
            info!(
                path = %engine.model_path().display(),
                input_shape = engine.input_shape(),
                "Model ready"
            );
            Some(Arc::new(engine))
        }
        Err(e) => {
            error!(path = %path.display(), "Error loading model: {}", e);
            None
        }
    }
}

/// Create the application router. Request bodies are not size-limited.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/predict", post(routes::predict::predict))
        .route("/health", get(routes::health::health))
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = config.max_level()?;

    match config.format {
        LogFormat::Pretty => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(true)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

/// Run the server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::load(&config.model.path));
    let app = create_router(state);

    let addr = config.server.bind_address();
    info!("Starting prediction server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
