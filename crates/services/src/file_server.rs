//! HTTP client for the upload server's `/upload` and `/files` endpoints.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use shared::{FileRecord, UploadError, UploadResponse, UploadSource, UploadTarget};
use std::time::Duration;

/// The two endpoints the uploader talks to.
#[async_trait]
pub trait FileServer: Send + Sync {
    /// Upload one file. `Ok` only when the server reported `success: true`.
    async fn upload(&self, target: &UploadTarget) -> Result<UploadResponse, UploadError>;

    /// Fetch the current listing, in server order.
    async fn list_files(&self) -> Result<Vec<FileRecord>, UploadError>;
}

/// reqwest-backed client for a UFO upload server.
pub struct HttpFileServer {
    http: Client,
    base_url: String,
    /// Deadline for a whole listing request; uploads are unbounded
    listing_timeout: Duration,
}

impl HttpFileServer {
    /// Build a client for `base_url`. `timeout` bounds connecting and the
    /// listing request; an upload body may stream for as long as it needs.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UploadError> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            listing_timeout: timeout,
        })
    }

    async fn file_part(target: &UploadTarget) -> Result<Part, UploadError> {
        let part = match &target.source {
            UploadSource::Path(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|source| UploadError::Io {
                        path: path.clone(),
                        source,
                    })?;
                Part::stream_with_length(Body::from(file), target.size)
            }
            UploadSource::Bytes(bytes) => Part::bytes(bytes.to_vec()),
        };
        Ok(part.file_name(target.name.clone()))
    }
}

fn transport(e: reqwest::Error) -> UploadError {
    UploadError::Transport(e.to_string())
}

#[async_trait]
impl FileServer for HttpFileServer {
    async fn upload(&self, target: &UploadTarget) -> Result<UploadResponse, UploadError> {
        let url = format!("{}/upload", self.base_url);
        let form = Form::new().part("file", Self::file_part(target).await?);

        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        // Rejections come back as 4xx/5xx with a JSON body, so the status is not checked here
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;
        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            tracing::debug!(%status, "non-JSON upload response: {}", preview);
            UploadError::MalformedResponse(e.to_string())
        })?;

        // Anything short of `success: true` is a failure carrying the server's message, if any
        let message = value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string);
        match serde_json::from_value::<UploadResponse>(value) {
            Ok(parsed) if parsed.success => Ok(parsed),
            Ok(parsed) => Err(UploadError::rejected(parsed.message)),
            Err(e) => {
                tracing::debug!(%status, "unexpected upload response shape: {}", e);
                Err(UploadError::rejected(message))
            }
        }
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>, UploadError> {
        let url = format!("{}/files", self.base_url);
        let resp = self
            .http
            .get(&url)
            .timeout(self.listing_timeout)
            .send()
            .await
            .map_err(transport)?;
        let body = resp.text().await.map_err(transport)?;

        // An empty upload directory is encoded as `null`
        let files: Option<Vec<FileRecord>> = serde_json::from_str(&body)
            .map_err(|e| UploadError::MalformedResponse(e.to_string()))?;
        Ok(files.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::sync::mpsc;
    use std::sync::Arc;

    struct Captured {
        method: String,
        url: String,
        content_type: String,
        body: String,
    }

    /// Serve `responses` in order on a random port, reporting each request back.
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<Captured>) {
        serve_after(Duration::ZERO, responses)
    }

    /// Like `serve`, but wait `delay` after reading each request before answering.
    fn serve_after(
        delay: Duration,
        responses: Vec<(u16, &'static str)>,
    ) -> (String, mpsc::Receiver<Captured>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            for (status, body) in responses {
                let mut req = match server.recv() {
                    Ok(req) => req,
                    Err(_) => return,
                };
                let mut raw = Vec::new();
                let _ = req.as_reader().read_to_end(&mut raw);
                let content_type = req
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.as_str().to_string())
                    .unwrap_or_default();
                let _ = tx.send(Captured {
                    method: req.method().as_str().to_string(),
                    url: req.url().to_string(),
                    content_type,
                    body: String::from_utf8_lossy(&raw).into_owned(),
                });
                std::thread::sleep(delay);
                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .unwrap();
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header);
                let _ = req.respond(response);
            }
        });

        (format!("http://127.0.0.1:{}", port), rx)
    }

    fn client(base: &str) -> HttpFileServer {
        HttpFileServer::new(base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_upload_sends_file_field() {
        let (base, rx) = serve(vec![(
            200,
            r#"{"success":true,"message":"File uploaded successfully","file":{"name":"notes.txt","size":11,"upload_time":"2024-05-01T12:00:00Z"}}"#,
        )]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"hello world")
            .unwrap();
        let target = UploadTarget::from_path(&path).unwrap();

        let resp = client(&base).upload(&target).await.unwrap();
        assert!(resp.success);
        assert_eq!(resp.file.unwrap().size, 11);

        let req = rx.recv().unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.url, "/upload");
        assert!(req.content_type.starts_with("multipart/form-data"));
        assert!(req.body.contains(r#"name="file""#));
        assert!(req.body.contains(r#"filename="notes.txt""#));
        assert!(req.body.contains("hello world"));
    }

    #[tokio::test]
    async fn test_upload_rejection_carries_message() {
        let (base, _rx) = serve(vec![(
            400,
            r#"{"success":false,"message":"File exceeds maximum size limit"}"#,
        )]);
        let target = UploadTarget::from_bytes("big.bin", Arc::from(vec![0u8; 16]));

        let err = client(&base).upload(&target).await.unwrap_err();
        assert!(matches!(err, UploadError::Rejected { .. }));
        assert_eq!(err.to_string(), "File exceeds maximum size limit");
    }

    #[tokio::test]
    async fn test_upload_without_success_flag_is_rejected() {
        let (base, _rx) = serve(vec![
            (400, r#"{"message":"quota exceeded"}"#),
            (500, "{}"),
            (200, r#"["not","an","object"]"#),
        ]);
        let server = client(&base);
        let target = UploadTarget::from_bytes("a.txt", Arc::from(b"a".to_vec()));

        let err = server.upload(&target).await.unwrap_err();
        assert!(matches!(err, UploadError::Rejected { .. }));
        assert_eq!(err.to_string(), "quota exceeded");

        let err = server.upload(&target).await.unwrap_err();
        assert_eq!(err.to_string(), "Upload failed");

        let err = server.upload(&target).await.unwrap_err();
        assert!(matches!(err, UploadError::Rejected { .. }));
        assert_eq!(err.to_string(), "Upload failed");
    }

    #[tokio::test]
    async fn test_slow_upload_outlives_listing_timeout() {
        let (base, _rx) = serve_after(
            Duration::from_millis(400),
            vec![
                (200, r#"{"success":true,"message":"File uploaded successfully"}"#),
                (200, "[]"),
            ],
        );
        let server = HttpFileServer::new(&base, Duration::from_millis(150)).unwrap();
        let target = UploadTarget::from_bytes("slow.bin", Arc::from(vec![1u8; 64]));

        let resp = server.upload(&target).await.unwrap();
        assert!(resp.success);

        assert!(matches!(
            server.list_files().await,
            Err(UploadError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_non_json_body() {
        let (base, _rx) = serve(vec![(502, "<html>Bad Gateway</html>")]);
        let target = UploadTarget::from_bytes("a.txt", Arc::from(b"a".to_vec()));

        let err = client(&base).upload(&target).await.unwrap_err();
        assert!(matches!(err, UploadError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_upload_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let target = UploadTarget::from_bytes("a.txt", Arc::from(b"a".to_vec()));

        let err = client(&format!("http://127.0.0.1:{}", port))
            .upload(&target)
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Transport(_)));
    }

    #[tokio::test]
    async fn test_list_files() {
        let (base, rx) = serve(vec![
            (
                200,
                r#"[{"name":"a.txt","size":3,"upload_time":"2024-05-01T12:00:00Z"},{"name":"b.txt","size":0,"upload_time":"2024-05-02T12:00:00Z"}]"#,
            ),
            (200, "null"),
            (500, r#"{"success":false,"message":"Failed to list files"}"#),
        ]);
        let server = client(&base);

        let files = server.list_files().await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "a.txt");
        let req = rx.recv().unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.url, "/files");

        assert!(server.list_files().await.unwrap().is_empty());
        assert!(matches!(
            server.list_files().await,
            Err(UploadError::MalformedResponse(_))
        ));
    }
}
