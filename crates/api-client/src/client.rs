use std::future::Future;
use std::pin::Pin;

use reqwest::RequestBuilder;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use staticship_deploy::{
    DeployBody, DeployError, Deployment, LimitsFetcher, Payload, SpaChecker, Transport,
};
use staticship_transfer::FileRecord;
use staticship_validation::PlatformLimits;
use tracing::debug;

use crate::types::{SpaCheckRequest, SpaCheckResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.staticship.dev";

const SPA_INDEX_PATH: &str = "index.html";
const MAX_SPA_INDEX_SIZE: u64 = 100 * 1024;

/// Errors from the platform client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid API key")]
    InvalidKey,
}

impl From<Error> for DeployError {
    fn from(err: Error) -> Self {
        DeployError::Transport(err.to_string())
    }
}

/// Platform API client.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Creates a new client. An empty key sends no `Authorization` header.
    pub fn new(api_key: &str) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if !api_key.is_empty() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|_| Error::InvalidKey)?,
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Points the client at another API host.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Sends a request and returns the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, Error> {
        let resp = request.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }

    /// Fetches the platform limits.
    pub async fn get_config(&self) -> Result<PlatformLimits, Error> {
        let body = self.send(self.http.get(self.url("/config"))).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Asks the platform whether `files` look like a single-page application.
    ///
    /// Returns `false` without a request when there is no root `index.html`,
    /// or when it is too large or not UTF-8.
    pub async fn check_spa(&self, files: &[FileRecord]) -> Result<bool, Error> {
        let Some(index) = files.iter().find(|f| f.path() == SPA_INDEX_PATH) else {
            return Ok(false);
        };
        if index.size() > MAX_SPA_INDEX_SIZE {
            debug!(size = index.size(), "index.html too large for SPA check");
            return Ok(false);
        }

        let content = match index.content().read_to_bytes().await {
            Ok(content) => content,
            Err(e) => {
                debug!(error = %e, "index.html unreadable, skipping SPA check");
                return Ok(false);
            }
        };
        let Ok(index_html) = String::from_utf8(content.into_owned()) else {
            return Ok(false);
        };

        let request = SpaCheckRequest {
            files: files.iter().map(|f| f.path().to_string()).collect(),
            index: index_html,
        };
        let body = self
            .send(self.http.post(self.url("/spa-check")).json(&request))
            .await?;
        let resp: SpaCheckResponse = serde_json::from_slice(&body)?;
        Ok(resp.is_spa)
    }

    /// Uploads an encoded deploy body and returns the created deployment.
    pub async fn create_deployment(&self, body: DeployBody) -> Result<Deployment, Error> {
        let mut request = self.http.post(self.url("/deployments"));
        for (name, value) in &body.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match body.payload {
            Payload::Buffered(bytes) => request.body(bytes),
            Payload::Form(form) => request.multipart(form),
        };

        let body = self.send(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl LimitsFetcher for Client {
    fn fetch_limits(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<PlatformLimits, DeployError>> + Send + '_>> {
        Box::pin(async move { Ok(self.get_config().await?) })
    }
}

impl SpaChecker for Client {
    fn check<'a>(
        &'a self,
        files: &'a [FileRecord],
    ) -> Pin<Box<dyn Future<Output = Result<bool, DeployError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.check_spa(files).await?) })
    }
}

impl Transport for Client {
    fn deploy(
        &self,
        body: DeployBody,
    ) -> Pin<Box<dyn Future<Output = Result<Deployment, DeployError>> + Send + '_>> {
        Box::pin(async move { Ok(self.create_deployment(body).await?) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staticship_deploy::{encode_buffered, encode_form};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// A request as seen by the mock server.
    struct Captured {
        head: String,
        body: Vec<u8>,
    }

    impl Captured {
        fn body_text(&self) -> String {
            String::from_utf8_lossy(&self.body).into_owned()
        }
    }

    /// Starts a mock HTTP server that answers one request with `status` and
    /// the given JSON body, and hands back the request it received.
    async fn mock_server(
        status: u16,
        body: &str,
    ) -> (String, tokio::task::JoinHandle<Option<Captured>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.ok()?;
            let captured = read_request(&mut stream).await;

            let resp = format!(
                "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(resp.as_bytes()).await;
            let _ = stream.shutdown().await;
            Some(captured)
        });

        (url, handle)
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> Captured {
        let mut buf = Vec::new();
        let mut chunk = vec![0u8; 8192];

        let head_end = loop {
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break buf.len();
            }
            buf.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let lower = head.to_lowercase();
        let content_length = lower
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());
        let chunked = lower.contains("transfer-encoding: chunked");

        loop {
            let body = &buf[head_end..];
            let done = match content_length {
                Some(len) => body.len() >= len,
                None if chunked => body.ends_with(b"0\r\n\r\n"),
                None => true,
            };
            if done {
                break;
            }
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        Captured {
            head,
            body: buf[head_end..].to_vec(),
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    /// A base URL nothing listens on; any request to it fails.
    fn unreachable_url() -> String {
        "http://127.0.0.1:9".into()
    }

    const DEPLOYMENT_JSON: &str = r#"{"deployment":"dep-42","files":2,"size":27,"status":"pending","url":"https://dep-42.staticship.dev"}"#;

    fn site() -> Vec<FileRecord> {
        vec![
            FileRecord::from_bytes("index.html", b"<html></html>".to_vec()),
            FileRecord::from_bytes("assets/app.js", b"console.log(1)".to_vec()),
        ]
    }

    #[tokio::test]
    async fn get_config_returns_limits() {
        let json = r#"{"maxFileSize":5242880,"maxFilesCount":1000,"maxTotalSize":104857600,"allowedMimeTypes":["text/","image/"]}"#;
        let (url, handle) = mock_server(200, json).await;

        let client = Client::new("test-key").unwrap().with_base_url(url);
        let limits = client.get_config().await.unwrap();

        assert_eq!(limits.max_file_size, 5_242_880);
        assert_eq!(limits.max_files_count, 1000);
        assert_eq!(limits.allowed_mime_types, vec!["text/", "image/"]);

        let req = handle.await.unwrap().unwrap();
        assert!(req.head.starts_with("GET /config "));
        assert!(req.head.to_lowercase().contains("authorization: bearer test-key"));
    }

    #[tokio::test]
    async fn api_error_keeps_status_and_body() {
        let (url, handle) = mock_server(401, r#"{"error":"unauthorized"}"#).await;

        let client = Client::new("bad-key").unwrap().with_base_url(url);
        let err = client.get_config().await.unwrap_err();
        match err {
            Error::Api { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("unauthorized"));
            }
            other => panic!("expected API error, got {other:?}"),
        }

        handle.abort();
    }

    #[tokio::test]
    async fn fetch_limits_maps_to_transport_error() {
        let (url, handle) = mock_server(500, "oops").await;

        let client = Client::new("test-key").unwrap().with_base_url(url);
        let err = client.fetch_limits().await.unwrap_err();
        assert!(matches!(err, DeployError::Transport(ref msg) if msg.contains("500")));

        handle.abort();
    }

    #[tokio::test]
    async fn check_spa_posts_paths_and_index() {
        let (url, handle) = mock_server(200, r#"{"isSPA":true}"#).await;

        let client = Client::new("test-key").unwrap().with_base_url(url);
        assert!(client.check_spa(&site()).await.unwrap());

        let req = handle.await.unwrap().unwrap();
        assert!(req.head.starts_with("POST /spa-check "));
        let sent: SpaCheckRequest = serde_json::from_slice(&req.body).unwrap();
        assert_eq!(sent.files, vec!["index.html", "assets/app.js"]);
        assert_eq!(sent.index, "<html></html>");
    }

    #[tokio::test]
    async fn check_spa_without_index_skips_request() {
        let client = Client::new("test-key")
            .unwrap()
            .with_base_url(unreachable_url());
        let files = vec![FileRecord::from_bytes("about.html", b"<html>".to_vec())];

        assert!(!client.check_spa(&files).await.unwrap());
    }

    #[tokio::test]
    async fn check_spa_with_large_index_skips_request() {
        let client = Client::new("test-key")
            .unwrap()
            .with_base_url(unreachable_url());
        let big = vec![b'a'; (MAX_SPA_INDEX_SIZE + 1) as usize];
        let files = vec![FileRecord::from_bytes("index.html", big)];

        assert!(!client.check_spa(&files).await.unwrap());
    }

    #[tokio::test]
    async fn check_spa_with_binary_index_skips_request() {
        let client = Client::new("test-key")
            .unwrap()
            .with_base_url(unreachable_url());
        let files = vec![FileRecord::from_bytes("index.html", vec![0xff, 0xfe, 0x00])];

        assert!(!client.check_spa(&files).await.unwrap());
    }

    #[tokio::test]
    async fn create_deployment_sends_buffered_body() {
        let (url, handle) = mock_server(200, DEPLOYMENT_JSON).await;
        let client = Client::new("test-key").unwrap().with_base_url(url);

        let body = encode_buffered(&site(), &[], Some("cli")).await.unwrap();
        let content_type = body.headers["Content-Type"].clone();
        let expected = match &body.payload {
            Payload::Buffered(bytes) => bytes.clone(),
            Payload::Form(_) => unreachable!(),
        };

        let deployment = client.create_deployment(body).await.unwrap();
        assert_eq!(deployment.deployment, "dep-42");
        assert_eq!(
            deployment.url.as_deref(),
            Some("https://dep-42.staticship.dev")
        );

        let req = handle.await.unwrap().unwrap();
        assert!(req.head.starts_with("POST /deployments "));
        assert!(req.head.contains(&content_type));
        assert_eq!(req.body, expected);
    }

    #[tokio::test]
    async fn create_deployment_streams_form() {
        let (url, handle) = mock_server(200, DEPLOYMENT_JSON).await;
        let client = Client::new("test-key").unwrap().with_base_url(url);

        let body = encode_form(&site(), &["preview".to_string()], None)
            .await
            .unwrap();
        client.create_deployment(body).await.unwrap();

        let req = handle.await.unwrap().unwrap();
        assert!(
            req.head
                .to_lowercase()
                .contains("content-type: multipart/form-data; boundary=")
        );
        let text = req.body_text();
        assert!(text.contains("filename=\"index.html\""));
        assert!(text.contains("filename=\"assets/app.js\""));
        assert!(text.contains("[\"preview\"]"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = Client::new("k")
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/config"), "http://localhost:8080/config");
    }

    #[test]
    fn client_new_succeeds() {
        assert!(Client::new("valid-key").is_ok());
        assert!(Client::new("").is_ok());
    }

    #[test]
    fn invalid_key_is_rejected() {
        assert!(matches!(Client::new("bad\nkey"), Err(Error::InvalidKey)));
    }
}
