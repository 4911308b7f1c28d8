//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own fresh ledger store,
//! listening on a random port.

use atomik_server::server::server::make_app;
use atomik_server::server::{RequestsLoggingLevel, ServerConfig};
use atomik_server::LedgerStore;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Test server instance with an isolated ledger store.
///
/// The server task is aborted when the instance is dropped.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    pub client: reqwest::Client,

    handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawns a new test server on a random port with a fresh store and
    /// no fetcher configured.
    pub async fn spawn() -> Self {
        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port: 0,
            frontend_dir_path: None,
        };
        let app = make_app(config, LedgerStore::new(), None, None)
            .expect("Failed to build test app");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server died");
        });

        TestServer {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json(&self, path: &str) -> Value {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
            .json()
            .await
            .expect("Response was not JSON")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
