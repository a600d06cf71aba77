use assistant_frontend::config::{BackendSettings, ServerSettings, Settings};
use assistant_frontend::startup::Application;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Programmable stand-in for the retrieval/generation backend.
#[derive(Default)]
pub struct MockBackendState {
    /// File names whose upload is rejected with a 500.
    pub fail_uploads: HashSet<String>,
    /// Extra latency applied to each upload, in milliseconds.
    pub upload_delay_ms: u64,
    /// Uploaded file names, in arrival order.
    pub uploads: Vec<String>,
    /// Articles served by GET /articles.
    pub articles: Vec<Value>,
    /// When true, GET /articles returns a 500.
    pub fail_articles: bool,
    /// When true, DELETE /docs/{id} returns a 500.
    pub fail_delete: bool,
    /// Ids deleted via DELETE /docs/{id}.
    pub deleted: Vec<i64>,
    /// Canned chat reply.
    pub chat_answer: String,
    pub chat_sources: Vec<Value>,
    /// When true, POST /chat returns a 500.
    pub fail_chat: bool,
    /// Extra latency applied to each chat call, in milliseconds.
    pub chat_delay_ms: u64,
    /// Last body received on POST /chat.
    pub last_chat_request: Option<Value>,
}

#[derive(Clone)]
struct MockShared {
    state: Arc<Mutex<MockBackendState>>,
    article_fetches: Arc<AtomicUsize>,
}

pub struct MockBackend {
    pub url: String,
    pub state: Arc<Mutex<MockBackendState>>,
    /// Number of GET /articles calls observed.
    pub article_fetches: Arc<AtomicUsize>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(MockBackendState::default()));
        let article_fetches = Arc::new(AtomicUsize::new(0));
        let shared = MockShared {
            state: state.clone(),
            article_fetches: article_fetches.clone(),
        };

        let router = Router::new()
            .route("/chat", post(mock_chat))
            .route("/upload/", post(mock_upload))
            .route("/articles", get(mock_articles))
            .route("/docs/:id", delete(mock_delete))
            .with_state(shared);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            url: format!("http://127.0.0.1:{}", port),
            state,
            article_fetches,
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.article_fetches.load(Ordering::SeqCst)
    }
}

async fn mock_chat(State(shared): State<MockShared>, Json(body): Json<Value>) -> Response {
    let (fail, delay_ms, answer, sources) = {
        let mut state = shared.state.lock().await;
        state.last_chat_request = Some(body);
        (
            state.fail_chat,
            state.chat_delay_ms,
            state.chat_answer.clone(),
            state.chat_sources.clone(),
        )
    };

    if delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
    }

    if fail {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Lỗi xử lý câu hỏi"})),
        )
            .into_response();
    }

    Json(json!({"answer": answer, "sources": sources})).into_response()
}

async fn mock_upload(State(shared): State<MockShared>, mut multipart: Multipart) -> Response {
    let mut file_name = String::from("unnamed");
    while let Ok(Some(field)) = multipart.next_field().await {
        if let Some(name) = field.file_name() {
            file_name = name.to_string();
        }
        let _ = field.bytes().await;
    }

    let (fail, delay_ms, doc_id) = {
        let mut state = shared.state.lock().await;
        state.uploads.push(file_name.clone());
        (
            state.fail_uploads.contains(&file_name),
            state.upload_delay_ms,
            state.uploads.len() as i64,
        )
    };

    if delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
    }

    if fail {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": format!("Lỗi xử lý file: {}", file_name)})),
        )
            .into_response();
    }

    Json(json!({
        "message": "File đã được upload và xử lý thành công.",
        "filename": file_name,
        "doc_id": doc_id,
        "total_chunks": 3
    }))
    .into_response()
}

async fn mock_articles(State(shared): State<MockShared>) -> Response {
    shared.article_fetches.fetch_add(1, Ordering::SeqCst);

    let state = shared.state.lock().await;
    if state.fail_articles {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Không thể lấy danh sách tài liệu"})),
        )
            .into_response();
    }

    Json(json!({"articles": state.articles})).into_response()
}

async fn mock_delete(State(shared): State<MockShared>, Path(id): Path<i64>) -> Response {
    let mut state = shared.state.lock().await;
    if state.fail_delete {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Không thể xóa tài liệu"})),
        )
            .into_response();
    }

    state.deleted.push(id);
    state.articles.retain(|article| article["id"].as_i64() != Some(id));
    Json(json!({"message": "Đã xóa tài liệu thành công", "doc_id": id})).into_response()
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub backend: MockBackend,
    pub shutdown: CancellationToken,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn the application against a mock backend configured before the
    /// mount-time article fetch runs.
    pub async fn spawn_with(configure: impl FnOnce(&mut MockBackendState)) -> Self {
        let backend = MockBackend::spawn().await;
        {
            let mut state = backend.state.lock().await;
            configure(&mut state);
        }

        let settings = Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port for testing
            },
            backend: BackendSettings {
                url: backend.url.clone(),
                request_timeout_seconds: 5,
            },
        };

        let shutdown = CancellationToken::new();
        let app = Application::build(settings, shutdown.clone())
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let address = format!("http://127.0.0.1:{}", port);

        // Wait for the HTTP server to be ready by polling the health endpoint
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        let app = TestApp {
            address,
            client,
            backend,
            shutdown,
        };

        // The mount-time article fetch settles before tests start asserting.
        app.wait_for_article_fetches(1).await;

        app
    }

    pub async fn wait_for_article_fetches(&self, at_least: usize) {
        for _ in 0..100 {
            if self.backend.fetch_count() >= at_least {
                return;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }
        panic!("mock backend never saw {} article fetch(es)", at_least);
    }

    pub async fn stage_files(&self, files: &[(&str, &str, &[u8])]) -> reqwest::Response {
        let mut form = reqwest::multipart::Form::new();
        for (name, mime, data) in files {
            form = form.part(
                "file",
                reqwest::multipart::Part::bytes(data.to_vec())
                    .file_name(name.to_string())
                    .mime_str(mime)
                    .unwrap(),
            );
        }

        self.client
            .post(format!("{}/api/documents", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute stage request")
    }

    pub async fn submit(&self) -> Value {
        self.client
            .post(format!("{}/api/documents/submit", self.address))
            .send()
            .await
            .expect("Failed to execute submit request")
            .json()
            .await
            .expect("Failed to parse submit response")
    }

    pub async fn staged(&self) -> Value {
        self.get_json("/api/documents").await
    }

    pub async fn articles(&self) -> Value {
        self.get_json("/api/articles").await
    }

    pub async fn transcript(&self) -> Value {
        self.get_json("/api/chat").await
    }

    pub async fn send_chat(&self, message: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/chat", self.address))
            .json(&json!({ "message": message }))
            .send()
            .await
            .expect("Failed to execute chat request")
    }

    pub async fn get_json(&self, path: &str) -> Value {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute GET request")
            .json()
            .await
            .expect("Failed to parse JSON response")
    }
}
