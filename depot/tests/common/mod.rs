#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use depot::api::create_router;
use depot::config::Config;
use depot::domain::chunk::frame;
use depot::utils::state::AppState;
use reqwest::{Client, Response};
use serde_json::Value;
use tempfile::TempDir;

pub const MAX_CHUNK_BYTES: usize = 64 * 1024;

pub struct TestServer {
    pub addr: SocketAddr,
    pub root: TempDir,
    pub client: Client,
    pub token: String,
}

impl TestServer {
    pub async fn start() -> TestServer {
        let root = TempDir::new().unwrap();
        let config = Config {
            host: "127.0.0.1".into(),
            port: 0,
            root_dir: root.path().to_path_buf(),
            max_chunk_bytes: MAX_CHUNK_BYTES,
            clean_on_start: false,
            jwt_secret: "test-secret".into(),
            jwt_lifetime_secs: 300,
            admin_username: "admin".into(),
            admin_password: "secret".into(),
        };
        let state = Arc::new(AppState::new(config));
        state.storage.bootstrap(false).await.unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });

        let client = Client::new();
        let token = fetch_token(&client, addr, "admin", "secret")
            .await
            .json::<Value>()
            .await
            .unwrap()["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        TestServer {
            addr,
            root,
            client,
            token,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn init(&self, filename: &str) -> String {
        let res = self
            .client
            .post(self.url("/init"))
            .query(&[("filename", filename)])
            .bearer_auth(&self.token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        res.json::<Value>().await.unwrap()["upload_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn send_raw(&self, upload_id: &str, body: Vec<u8>) -> Response {
        self.client
            .post(self.url(&format!("/upload/{upload_id}")))
            .bearer_auth(&self.token)
            .body(body)
            .send()
            .await
            .unwrap()
    }

    pub async fn send_chunk(&self, upload_id: &str, start: u32, payload: &[u8]) -> Response {
        let end = start + payload.len() as u32 - 1;
        self.send_raw(upload_id, frame(start, end, payload)).await
    }

    pub async fn merge(&self, upload_id: &str) -> Response {
        self.client
            .post(self.url(&format!("/merge/{upload_id}")))
            .bearer_auth(&self.token)
            .send()
            .await
            .unwrap()
    }

    pub async fn status(&self, upload_id: &str) -> Value {
        let res = self
            .client
            .get(self.url(&format!("/status/{upload_id}")))
            .bearer_auth(&self.token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        res.json().await.unwrap()
    }

    pub async fn download(&self, filename: &str, range: Option<&str>) -> Response {
        let mut req = self
            .client
            .get(self.url(&format!("/download/{filename}")))
            .bearer_auth(&self.token);
        if let Some(range) = range {
            req = req.header("Range", range);
        }
        req.send().await.unwrap()
    }

    /// Uploads `content` split into `chunk_size` pieces, sent in the given order, and merges.
    pub async fn upload_file(&self, filename: &str, content: &[u8], chunk_size: usize) {
        let id = self.init(filename).await;
        for (i, piece) in content.chunks(chunk_size).enumerate().rev() {
            let res = self.send_chunk(&id, (i * chunk_size) as u32, piece).await;
            assert_eq!(res.status(), 200);
        }
        assert_eq!(self.merge(&id).await.status(), 200);
    }
}

pub async fn fetch_token(client: &Client, addr: SocketAddr, user: &str, pass: &str) -> Response {
    client
        .post(format!("http://{addr}/token"))
        .form(&[("username", user), ("password", pass)])
        .send()
        .await
        .unwrap()
}
