pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use models::settings::QueryConfig;
use services::backend_client::BackendClient;
use services::conversation::Conversation;
use services::library::DocumentLibrary;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Shared application state: the backend client plus the owned aggregates.
///
/// `library` owns the staged-document set and the article mirror,
/// `conversation` owns the transcript, and `query_config` is the
/// configuration holder that chat requests snapshot at send time.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub library: Arc<DocumentLibrary>,
    pub conversation: Arc<Conversation>,
    pub query_config: Arc<RwLock<QueryConfig>>,
}

impl AppState {
    pub fn new(backend: Arc<BackendClient>, shutdown: CancellationToken) -> Self {
        Self {
            library: Arc::new(DocumentLibrary::new(backend.clone(), shutdown)),
            conversation: Arc::new(Conversation::new(backend.clone())),
            backend,
            query_config: Arc::new(RwLock::new(QueryConfig::default())),
        }
    }
}
