use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use ::common::storage::ObjectStore;
use ::common::storage::filesystem::FilesystemObjectStore;
use listing::{InFlightSubmissions, MemoryProductStore, ProductStore};
use reqwest::Client;
use serde_json::Value;
use tempfile::TempDir;

use server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, LogConfig, ServerConfig, StorageConfig,
};
use server::state::AppState;

pub const JWT_SECRET: &str = "test-secret-for-integration-tests";
pub const BUCKET: &str = "products";
pub const MAX_OBJECT_SIZE: u64 = 64 * 1024;

pub mod routes {
    pub const PRODUCTS: &str = "/api/v1/products";
    pub const PRODUCT_IMAGES: &str = "/api/v1/products/images";

    pub fn product(id: i64) -> String {
        format!("/api/v1/products/{id}")
    }

    pub fn image_url(filename: &str) -> String {
        format!("/api/v1/products/images/{filename}/url")
    }
}

/// A running test server backed by an in-memory product store and a
/// temporary storage directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub products: Arc<dyn ProductStore>,
    storage: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(MemoryProductStore::new())).await
    }

    pub async fn spawn_with_store(products: Arc<dyn ProductStore>) -> Self {
        Self::spawn_with(products, |objects| Arc::new(objects) as Arc<dyn ObjectStore>).await
    }

    /// Spawn with a custom product store and a wrapper around the
    /// filesystem object store.
    pub async fn spawn_with(
        products: Arc<dyn ProductStore>,
        wrap_objects: impl FnOnce(FilesystemObjectStore) -> Arc<dyn ObjectStore>,
    ) -> Self {
        let storage = TempDir::new().expect("Failed to create storage dir");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();
        let public_base_url = format!("http://{addr}/storage");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: "postgres://unused".to_string(),
                max_connections: 1,
                min_connections: 0,
                sqlx_logging: false,
            },
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
            },
            storage: StorageConfig {
                root: storage.path().to_path_buf(),
                bucket: BUCKET.to_string(),
                public_base_url: public_base_url.clone(),
                max_object_size: MAX_OBJECT_SIZE,
            },
            log: LogConfig {
                level: "info".to_string(),
            },
        };

        let objects = FilesystemObjectStore::new(
            storage.path().to_path_buf(),
            public_base_url,
            MAX_OBJECT_SIZE,
        )
        .await
        .expect("Failed to create object store");

        let state = AppState {
            config: Arc::new(app_config),
            products: products.clone(),
            objects: wrap_objects(objects),
            submissions: Arc::new(InFlightSubmissions::new()),
        };

        let app = server::build_router(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            products,
            storage,
        }
    }

    /// Directory holding the stored objects of `bucket`.
    pub fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.storage.path().join(bucket)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn token(&self, uid: &str, display_name: &str) -> String {
        server::utils::jwt::sign(uid, display_name, JWT_SECRET).expect("Failed to sign token")
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    /// Fetch an absolute URL and return the status and raw bytes.
    pub async fn fetch(&self, url: &str) -> (u16, Option<String>, Vec<u8>) {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .expect("Failed to send GET request");
        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = res.bytes().await.expect("Failed to read body").to_vec();
        (status, content_type, bytes)
    }

    pub async fn upload_image(
        &self,
        file_name: &str,
        mime: &str,
        file_bytes: Vec<u8>,
        token: Option<&str>,
    ) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("Failed to set MIME type");
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut req = self
            .client
            .post(self.url(routes::PRODUCT_IMAGES))
            .multipart(form);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let res = req
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Upload a small PNG and return its object name.
    pub async fn upload_png(&self, token: &str) -> String {
        let res = self
            .upload_image("logo.png", "image/png", b"\x89PNG fake".to_vec(), Some(token))
            .await;
        assert_eq!(res.status, 201, "Upload failed: {}", res.text);
        res.body["filename"]
            .as_str()
            .expect("Missing filename in upload response")
            .to_string()
    }
}

pub fn valid_product() -> Value {
    serde_json::json!({
        "name": "Showcase",
        "company": "Acme Inc.",
        "url": "https://acme.example/showcase",
        "description": "A place to show off what you built.",
    })
}
