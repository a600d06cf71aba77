use crate::config::Settings;
use crate::handlers;
use crate::services::backend_client::BackendClient;
use crate::AppState;
use assistant_core::error::AppError;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::app::index))
        .route("/health", get(handlers::app::health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route(
            "/api/documents",
            get(handlers::documents::list_staged).post(handlers::documents::stage_documents),
        )
        .route(
            "/api/documents/submit",
            post(handlers::documents::submit_documents),
        )
        .route("/api/documents/:id", delete(handlers::documents::remove_staged))
        .route("/api/articles", get(handlers::documents::list_articles))
        .route("/api/articles/:id", delete(handlers::documents::delete_article))
        .route(
            "/api/chat",
            get(handlers::chat::transcript).post(handlers::chat::send_message),
        )
        .route("/api/chat/suggestions", get(handlers::chat::suggestions))
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route(
            "/api/settings/reset-prompt",
            post(handlers::settings::reset_prompt),
        )
        .nest_service("/static", ServeDir::new("assistant-frontend/static"))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(settings: Settings, shutdown: CancellationToken) -> Result<Self, AppError> {
        let backend = Arc::new(BackendClient::new(&settings.backend));
        tracing::info!(backend_url = %backend.base_url(), "Configured backend client");

        let state = AppState::new(backend, shutdown);

        // Mount-time fetch of the article mirror. A failure leaves the
        // mirror empty and is only logged; the next upload success retries.
        let library = state.library.clone();
        tokio::spawn(async move {
            match library.refresh_articles().await {
                Ok(count) => tracing::info!(count, "Article mirror initialized"),
                Err(e) => tracing::warn!(error = %e, "Initial article fetch failed"),
            }
        });

        let app = build_router(state.clone());

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
