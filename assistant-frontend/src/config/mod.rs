use assistant_core::error::AppError;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    /// Base URL of the retrieval/generation service, e.g. http://localhost:8000.
    pub url: String,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout_seconds() -> u64 {
    120
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");

    // Check if we're already in assistant-frontend directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("assistant-frontend") {
        base_path.join("config")
    } else {
        base_path.join("assistant-frontend").join("config")
    };

    assistant_core::config::load(&configuration_directory)
}
