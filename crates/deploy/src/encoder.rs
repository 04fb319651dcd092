//! Multipart deploy body encoding.
//!
//! Two encoders produce the same fields:
//!
//! | field       | count        | content                                  |
//! |-------------|--------------|------------------------------------------|
//! | `files[]`   | one per file | raw bytes, content type from extension   |
//! | `checksums` | one          | JSON array of digests, aligned with files |
//! | `labels`    | zero or one  | JSON array of strings                    |
//! | `via`       | zero or one  | calling tool                             |
//!
//! Handle-backed content is re-read here and must still match the size and
//! digest recorded at ingestion, or encoding fails.
//!
//! [`encode_buffered`] materializes the whole body so the transport can send
//! an explicit `Content-Length`. [`encode_form`] returns a live form that the
//! HTTP client serializes itself.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::multipart::{Form, Part};
use staticship_transfer::{FileRecord, content_type_for};

use crate::error::DeployError;

pub const FILES_FIELD: &str = "files[]";
pub const CHECKSUMS_FIELD: &str = "checksums";
pub const LABELS_FIELD: &str = "labels";
pub const VIA_FIELD: &str = "via";

const BOUNDARY_PREFIX: &str = "----StaticshipFormBoundary";

/// Encoded multipart content.
pub enum Payload {
    /// Complete body bytes.
    Buffered(Vec<u8>),
    /// Not yet serialized; the transport streams it.
    Form(Form),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(bytes) => write!(f, "Buffered({} bytes)", bytes.len()),
            Self::Form(form) => write!(f, "Form(boundary={})", form.boundary()),
        }
    }
}

/// A deploy body ready for the transport.
#[derive(Debug)]
pub struct DeployBody {
    pub payload: Payload,
    /// Empty when the transport derives the headers itself.
    pub headers: BTreeMap<String, String>,
}

/// Encodes records into a single in-memory multipart buffer.
///
/// Part filenames keep a leading `/`. Returns `Content-Type` (with the
/// boundary) and `Content-Length` headers.
pub async fn encode_buffered(
    records: &[FileRecord],
    labels: &[String],
    via: Option<&str>,
) -> Result<DeployBody, DeployError> {
    let boundary = format!("{BOUNDARY_PREFIX}{}", uuid::Uuid::new_v4().simple());
    let mut body = Vec::new();

    for record in records {
        let content = record.read_verified().await?;
        let filename = escape_quoted(&format!("/{}", record.path()));

        push_str(&mut body, &format!("--{boundary}\r\n"));
        push_str(
            &mut body,
            &format!(
                "Content-Disposition: form-data; name=\"{FILES_FIELD}\"; filename=\"{filename}\"\r\n"
            ),
        );
        push_str(
            &mut body,
            &format!("Content-Type: {}\r\n\r\n", content_type_for(record.path())),
        );
        body.extend_from_slice(&content);
        push_str(&mut body, "\r\n");
    }

    push_field(&mut body, &boundary, CHECKSUMS_FIELD, &checksums_json(records)?);
    if !labels.is_empty() {
        push_field(&mut body, &boundary, LABELS_FIELD, &serde_json::to_string(labels)?);
    }
    if let Some(via) = via {
        push_field(&mut body, &boundary, VIA_FIELD, via);
    }
    push_str(&mut body, &format!("--{boundary}--\r\n"));

    let mut headers = BTreeMap::new();
    headers.insert(
        "Content-Type".to_string(),
        format!("multipart/form-data; boundary={boundary}"),
    );
    headers.insert("Content-Length".to_string(), body.len().to_string());

    Ok(DeployBody {
        payload: Payload::Buffered(body),
        headers,
    })
}

/// Encodes records into a streaming multipart form.
///
/// Part filenames carry no leading `/`. No headers are returned; the HTTP
/// client sets them when it serializes the form.
pub async fn encode_form(
    records: &[FileRecord],
    labels: &[String],
    via: Option<&str>,
) -> Result<DeployBody, DeployError> {
    let mut form = Form::new();

    for record in records {
        let content = record.read_verified().await?;
        let part = Part::bytes(content.into_owned())
            .file_name(record.path().to_string())
            .mime_str(content_type_for(record.path()))
            .map_err(|e| DeployError::Encode(e.to_string()))?;
        form = form.part(FILES_FIELD, part);
    }

    form = form.text(CHECKSUMS_FIELD, checksums_json(records)?);
    if !labels.is_empty() {
        form = form.text(LABELS_FIELD, serde_json::to_string(labels)?);
    }
    if let Some(via) = via {
        form = form.text(VIA_FIELD, via.to_string());
    }

    Ok(DeployBody {
        payload: Payload::Form(form),
        headers: BTreeMap::new(),
    })
}

fn checksums_json(records: &[FileRecord]) -> Result<String, DeployError> {
    let digests: Vec<&str> = records.iter().map(FileRecord::digest).collect();
    Ok(serde_json::to_string(&digests)?)
}

fn push_field(body: &mut Vec<u8>, boundary: &str, name: &str, value: &str) {
    push_str(body, &format!("--{boundary}\r\n"));
    push_str(
        body,
        &format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"),
    );
    push_str(body, value);
    push_str(body, "\r\n");
}

fn push_str(body: &mut Vec<u8>, s: &str) {
    body.extend_from_slice(s.as_bytes());
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use staticship_transfer::{BlobHandle, ByteSource, TransferError};
    use std::future::Future;
    use std::io;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Content that is rewritten after its first read.
    #[derive(Debug)]
    struct RewrittenHandle {
        reads: AtomicUsize,
    }

    impl BlobHandle for RewrittenHandle {
        fn len(&self) -> u64 {
            8
        }

        fn read_all(&self) -> Pin<Box<dyn Future<Output = io::Result<Vec<u8>>> + Send + '_>> {
            let first = self.reads.fetch_add(1, Ordering::SeqCst) == 0;
            Box::pin(async move {
                Ok(if first { b"original".to_vec() } else { b"replaced".to_vec() })
            })
        }
    }

    async fn rewritten_record() -> FileRecord {
        let handle = Arc::new(RewrittenHandle {
            reads: AtomicUsize::new(0),
        });
        FileRecord::from_source("app.js", ByteSource::Handle(handle))
            .await
            .unwrap()
    }

    fn records() -> Vec<FileRecord> {
        vec![
            FileRecord::from_bytes("index.html", b"<html></html>".to_vec()),
            FileRecord::from_bytes("assets/app.js", b"console.log(1)".to_vec()),
        ]
    }

    fn buffered_text(body: &DeployBody) -> String {
        match &body.payload {
            Payload::Buffered(bytes) => String::from_utf8(bytes.clone()).unwrap(),
            Payload::Form(_) => panic!("expected buffered payload"),
        }
    }

    #[tokio::test]
    async fn buffered_body_has_parts_in_record_order() {
        let records = records();
        let body = encode_buffered(&records, &[], None).await.unwrap();
        let text = buffered_text(&body);

        let index = text.find("filename=\"/index.html\"").unwrap();
        let app = text.find("filename=\"/assets/app.js\"").unwrap();
        assert!(index < app);
        assert!(text.contains("Content-Type: text/html"));
        assert!(text.contains("Content-Type: text/javascript"));

        let checksums = format!(
            "[\"{}\",\"{}\"]",
            records[0].digest(),
            records[1].digest()
        );
        assert!(text.contains(&checksums));
        assert!(!text.contains("name=\"labels\""));
        assert!(!text.contains("name=\"via\""));
    }

    #[tokio::test]
    async fn buffered_headers_describe_body() {
        let body = encode_buffered(&records(), &[], None).await.unwrap();
        let text = buffered_text(&body);

        let content_type = &body.headers["Content-Type"];
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        assert!(boundary.starts_with(BOUNDARY_PREFIX));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
        assert_eq!(body.headers["Content-Length"], text.len().to_string());
    }

    #[tokio::test]
    async fn labels_and_via_are_included_when_present() {
        let labels = vec!["production".to_string(), "v2".to_string()];
        let body = encode_buffered(&records(), &labels, Some("cli"))
            .await
            .unwrap();
        let text = buffered_text(&body);

        assert!(text.contains("name=\"labels\"\r\n\r\n[\"production\",\"v2\"]\r\n"));
        assert!(text.contains("name=\"via\"\r\n\r\ncli\r\n"));
    }

    #[tokio::test]
    async fn form_body_has_no_headers() {
        let body = encode_form(&records(), &["a".to_string()], Some("web"))
            .await
            .unwrap();
        assert!(body.headers.is_empty());
        assert!(matches!(body.payload, Payload::Form(_)));
    }

    #[tokio::test]
    async fn empty_record_list_still_sends_checksums() {
        let body = encode_buffered(&[], &[], None).await.unwrap();
        let text = buffered_text(&body);
        assert!(text.contains("name=\"checksums\"\r\n\r\n[]\r\n"));
    }

    #[tokio::test]
    async fn rewritten_handle_fails_buffered_encoding() {
        let records = vec![rewritten_record().await];
        let err = encode_buffered(&records, &[], None).await.unwrap_err();
        assert!(matches!(
            err,
            DeployError::Io(TransferError::ContentChanged { ref path }) if path == "app.js"
        ));
    }

    #[tokio::test]
    async fn rewritten_handle_fails_form_encoding() {
        let records = vec![rewritten_record().await];
        let err = encode_form(&records, &[], None).await.unwrap_err();
        assert!(matches!(err, DeployError::Io(TransferError::ContentChanged { .. })));
    }
}
