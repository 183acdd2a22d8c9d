use std::sync::Arc;

use ::common::storage::filesystem::FilesystemObjectStore;
use ::common::storage::{BoxReader, ObjectName, ObjectStore, StorageError};
use async_trait::async_trait;
use listing::MemoryProductStore;

use crate::common::{BUCKET, MAX_OBJECT_SIZE, TestApp, routes};

mod image_upload {
    use super::*;

    #[tokio::test]
    async fn upload_returns_resolved_url() {
        let app = TestApp::spawn().await;
        let token = app.token("u1", "Alice");

        let res = app
            .upload_image("logo.png", "image/png", b"PNG_DATA".to_vec(), Some(&token))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let filename = res.body["filename"].as_str().unwrap();
        assert!(filename.ends_with(".png"));
        assert_ne!(filename, "logo.png");
        assert_eq!(
            res.body["url"].as_str().unwrap(),
            app.url(&format!("/storage/{BUCKET}/{filename}"))
        );
        assert_eq!(res.body["status"], "success");
        assert_eq!(res.body["progress"], 100);
        assert_eq!(res.body["size"], 8);
    }

    #[tokio::test]
    async fn uploaded_image_is_downloadable() {
        let app = TestApp::spawn().await;
        let token = app.token("u1", "Alice");

        let res = app
            .upload_image("logo.png", "image/png", b"PNG_DATA".to_vec(), Some(&token))
            .await;
        let url = res.body["url"].as_str().unwrap();

        let (status, content_type, bytes) = app.fetch(url).await;
        assert_eq!(status, 200);
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert_eq!(bytes, b"PNG_DATA");
    }

    #[tokio::test]
    async fn same_file_twice_gets_distinct_names() {
        let app = TestApp::spawn().await;
        let token = app.token("u1", "Alice");

        let first = app.upload_png(&token).await;
        let second = app.upload_png(&token).await;

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn image_type_is_guessed_from_extension() {
        let app = TestApp::spawn().await;
        let token = app.token("u1", "Alice");

        let res = app
            .upload_image(
                "photo.jpg",
                "application/octet-stream",
                b"JPEG".to_vec(),
                Some(&token),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["filename"].as_str().unwrap().ends_with(".jpg"));
    }

    #[tokio::test]
    async fn non_image_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.token("u1", "Alice");

        let res = app
            .upload_image("notes.txt", "text/plain", b"hello".to_vec(), Some(&token))
            .await;

        assert_eq!(res.status, 415);
        assert_eq!(res.body["code"], "UNSUPPORTED_MEDIA_TYPE");
    }

    #[tokio::test]
    async fn oversized_image_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.token("u1", "Alice");
        let data = vec![0u8; MAX_OBJECT_SIZE as usize + 1];

        let res = app
            .upload_image("big.png", "image/png", data, Some(&token))
            .await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn image_far_beyond_the_body_limit_is_too_large() {
        let app = TestApp::spawn().await;
        let token = app.token("u1", "Alice");
        let data = vec![0u8; 3 * MAX_OBJECT_SIZE as usize];

        let res = app
            .upload_image("huge.png", "image/png", data, Some(&token))
            .await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn oversized_leading_field_is_too_large() {
        let app = TestApp::spawn().await;
        let token = app.token("u1", "Alice");

        let file = reqwest::multipart::Part::bytes(b"PNG_DATA".to_vec())
            .file_name("logo.png")
            .mime_str("image/png")
            .unwrap();
        let form = reqwest::multipart::Form::new()
            .text("note", "x".repeat(3 * MAX_OBJECT_SIZE as usize))
            .part("file", file);

        let res = app
            .client
            .post(app.url(routes::PRODUCT_IMAGES))
            .bearer_auth(&token)
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 413);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn anonymous_upload_is_sent_to_login() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_image("logo.png", "image/png", b"PNG_DATA".to_vec(), None)
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "LOGIN_REQUIRED");
        assert_eq!(res.body["redirect"], "/login");
    }
}

mod image_url {
    use super::*;

    #[tokio::test]
    async fn resolves_uploaded_image() {
        let app = TestApp::spawn().await;
        let token = app.token("u1", "Alice");
        let filename = app.upload_png(&token).await;

        let res = app.get(&routes::image_url(&filename)).await;

        assert_eq!(res.status, 200);
        assert_eq!(
            res.body["url"].as_str().unwrap(),
            app.url(&format!("/storage/{BUCKET}/{filename}"))
        );
    }

    #[tokio::test]
    async fn unknown_image_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::image_url("missing.png")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn download_of_missing_object_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&format!("/storage/{BUCKET}/missing.png")).await;

        assert_eq!(res.status, 404);
    }
}

/// Stores objects but can never produce a URL for them.
struct UnresolvableStore(FilesystemObjectStore);

#[async_trait]
impl ObjectStore for UnresolvableStore {
    async fn put_stream(
        &self,
        bucket: &str,
        name: &ObjectName,
        reader: BoxReader,
    ) -> Result<u64, StorageError> {
        self.0.put_stream(bucket, name, reader).await
    }

    async fn get_stream(
        &self,
        bucket: &str,
        name: &ObjectName,
    ) -> Result<BoxReader, StorageError> {
        self.0.get_stream(bucket, name).await
    }

    async fn exists(&self, bucket: &str, name: &ObjectName) -> Result<bool, StorageError> {
        self.0.exists(bucket, name).await
    }

    async fn delete(&self, bucket: &str, name: &ObjectName) -> Result<bool, StorageError> {
        self.0.delete(bucket, name).await
    }

    async fn download_url(
        &self,
        _bucket: &str,
        _name: &ObjectName,
    ) -> Result<String, StorageError> {
        Err(StorageError::Io(std::io::Error::other("url service down")))
    }
}

mod image_upload_failure {
    use super::*;

    #[tokio::test]
    async fn unresolvable_upload_is_removed() {
        let app = TestApp::spawn_with(Arc::new(MemoryProductStore::new()), |objects| {
            Arc::new(UnresolvableStore(objects)) as Arc<dyn ObjectStore>
        })
        .await;
        let token = app.token("u1", "Alice");

        let res = app
            .upload_image("logo.png", "image/png", b"PNG_DATA".to_vec(), Some(&token))
            .await;

        assert_eq!(res.status, 500, "{}", res.text);
        let leftovers = std::fs::read_dir(app.bucket_dir(BUCKET))
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }
}
