use crate::config::AppConfig;
use crate::error::ClientError;
use crate::upload::file_processor::FileProcessor;
use crate::upload::types::{
    ErrorBody, EvaluationResponse, RedactedFile, SavedFile, SelectedFile, UploadResponse,
};
use reqwest::multipart::Form;
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, error, info, warn};

pub const DOCUMENTS_FIELD: &str = "documents";
pub const CRITERIA_FIELD: &str = "evaluation_criteria";

#[derive(Clone)]
pub struct RedactionClient {
    http: reqwest::Client,
    config: AppConfig,
}

impl RedactionClient {
    pub fn new(config: AppConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Posts every file as a `documents` part and returns one record per
    /// redacted document.
    pub async fn upload(&self, files: &[SelectedFile]) -> Result<Vec<RedactedFile>, ClientError> {
        if files.is_empty() {
            return Err(ClientError::NoFilesSelected);
        }

        let mut form = Form::new();
        for file in files {
            form = form.part(DOCUMENTS_FIELD, FileProcessor::to_part(&file.path).await?);
        }

        let url = self.config.upload_url()?;
        info!("Uploading {} documents to {}", files.len(), url);
        let response = self.http.post(url).multipart(form).send().await?;
        let upload: UploadResponse = Self::read_json(response, "redacted_files").await?;

        info!("Server returned {} redacted files", upload.redacted_files.len());
        Ok(upload.redacted_files)
    }

    /// Posts the criteria file as `evaluation_criteria`.
    pub async fn evaluate(&self, criteria: &Path) -> Result<EvaluationResponse, ClientError> {
        let form = Form::new().part(CRITERIA_FIELD, FileProcessor::to_part(criteria).await?);

        let url = self.config.evaluate_url()?;
        info!("Requesting evaluation against {}", criteria.display());
        let response = self.http.post(url).multipart(form).send().await?;
        let evaluation: EvaluationResponse = Self::read_json(response, "evaluations").await?;

        info!(
            "Received {} evaluations (summary table: {}, yes/no table: {})",
            evaluation.evaluations.len(),
            evaluation.evaluation_table.is_some(),
            evaluation.yes_no_table.is_some()
        );
        Ok(evaluation)
    }

    /// Fetches a redacted text file and stores it under `dest_dir`.
    pub async fn download(
        &self,
        redacted: &RedactedFile,
        dest_dir: &Path,
    ) -> Result<SavedFile, ClientError> {
        let url = self.config.resolve(&redacted.redacted_text_file)?;
        let file_name = download_name(&url)
            .ok_or_else(|| ClientError::InvalidUrl(redacted.redacted_text_file.clone()))?;

        debug!("Downloading {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Download of {} failed with status {}", file_name, status);
            return Err(ClientError::Status {
                status: status.as_u16(),
                server_message: None,
            });
        }

        let bytes = response.bytes().await?;
        let path = dest_dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| ClientError::WriteFile {
                path: path.clone(),
                source,
            })?;

        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(SavedFile {
            document: redacted.document.clone(),
            path,
        })
    }

    /// Reads the body of `response`, mapping non-2xx statuses to
    /// `ClientError::Status` and requiring `array_field` to be an array.
    async fn read_json<T: DeserializeOwned>(
        response: Response,
        array_field: &'static str,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let server_message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(|b| b.error);
            warn!(
                "Request failed with status {}: {}",
                status,
                server_message.as_deref().unwrap_or("<no error message>")
            );
            return Err(ClientError::Status {
                status: status.as_u16(),
                server_message,
            });
        }

        let value: Value = serde_json::from_str(&body)?;
        if !value.get(array_field).map(Value::is_array).unwrap_or(false) {
            error!("Invalid response format, `{}` is not an array: {}", array_field, body);
            return Err(ClientError::MissingField(array_field));
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn download_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cli;
    use crate::error::ErrorKind;
    use axum::{
        extract::{Multipart, Path as AxumPath, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Clone, Default)]
    struct Received {
        fields: Arc<Mutex<Vec<(String, String)>>>,
    }

    async fn record_parts(received: &Received, mut multipart: Multipart) {
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().unwrap_or_default().to_string();
            let _ = field.bytes().await;
            received.fields.lock().unwrap().push((name, file_name));
        }
    }

    async fn handle_upload(
        State(received): State<Received>,
        multipart: Multipart,
    ) -> (StatusCode, Json<Value>) {
        record_parts(&received, multipart).await;
        let files: Vec<Value> = received
            .fields
            .lock()
            .unwrap()
            .iter()
            .map(|(_, file_name)| {
                let stem = file_name.rsplit_once('.').map(|(s, _)| s).unwrap_or(file_name.as_str());
                json!({
                    "document": file_name,
                    "redacted_text_file": format!("/download/{stem}_redacted.txt"),
                })
            })
            .collect();
        (StatusCode::OK, Json(json!({ "redacted_files": files })))
    }

    async fn handle_evaluate(
        State(received): State<Received>,
        multipart: Multipart,
    ) -> Json<Value> {
        record_parts(&received, multipart).await;
        Json(json!({
            "evaluations": [{"document": "x_redacted.txt", "evaluation": "(Page 1) ok"}],
            "evaluation_table": "<table><tr><td>x</td></tr></table>",
        }))
    }

    async fn handle_download(AxumPath(name): AxumPath<String>) -> (StatusCode, String) {
        if name == "missing.txt" {
            (StatusCode::NOT_FOUND, String::new())
        } else {
            (StatusCode::OK, format!("[REDACTED NAME] wrote {name}"))
        }
    }

    async fn spawn_server(router: Router) -> String {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}")
    }

    async fn spawn_redaction_server() -> (String, Received) {
        let received = Received::default();
        let app = Router::new()
            .route("/upload", post(handle_upload))
            .route("/evaluate", post(handle_evaluate))
            .route("/download/:name", get(handle_download))
            .with_state(received.clone());
        (spawn_server(app).await, received)
    }

    fn client_for(server_url: &str) -> RedactionClient {
        let cli = Cli {
            server_url: server_url.to_string(),
            request_timeout_secs: Some(10),
            log_filter: None,
        };
        RedactionClient::new(AppConfig::from_cli(&cli).unwrap()).unwrap()
    }

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> SelectedFile {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        SelectedFile {
            name: name.to_string(),
            path,
            size: contents.len() as u64,
        }
    }

    #[tokio::test]
    async fn upload_sends_one_documents_part_per_file() {
        let (url, received) = spawn_redaction_server().await;
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write_file(dir.path(), "a.pdf", b"%PDF-a"),
            write_file(dir.path(), "b.docx", b"PK-b"),
        ];

        let redacted = client_for(&url).upload(&files).await.unwrap();

        assert_eq!(redacted.len(), 2);
        assert_eq!(redacted[0].redacted_text_file, "/download/a_redacted.txt");
        let fields = received.fields.lock().unwrap().clone();
        assert_eq!(
            fields,
            vec![
                ("documents".to_string(), "a.pdf".to_string()),
                ("documents".to_string(), "b.docx".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn empty_upload_never_contacts_the_server() {
        // Nothing listens on port 9; a request would surface as Transport.
        let client = client_for("http://127.0.0.1:9");
        let err = client.upload(&[]).await.unwrap_err();
        assert!(matches!(err, ClientError::NoFilesSelected));
    }

    #[tokio::test]
    async fn upload_failure_carries_server_error_message() {
        async fn reject() -> (StatusCode, Json<Value>) {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Unsupported file type: a.odt"})),
            )
        }
        let url = spawn_server(Router::new().route("/upload", post(reject))).await;
        let dir = tempfile::tempdir().unwrap();
        let files = vec![write_file(dir.path(), "a.odt", b"odt")];

        let err = client_for(&url).upload(&files).await.unwrap_err();

        match err {
            ClientError::Status {
                status,
                server_message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(server_message.as_deref(), Some("Unsupported file type: a.odt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        async fn garbage() -> &'static str {
            "<html>oops</html>"
        }
        let url = spawn_server(Router::new().route("/upload", post(garbage))).await;
        let dir = tempfile::tempdir().unwrap();
        let files = vec![write_file(dir.path(), "a.pdf", b"%PDF")];

        let err = client_for(&url).upload(&files).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidJson(_)));
    }

    #[tokio::test]
    async fn upload_without_redacted_files_array_is_a_shape_error() {
        async fn empty_object() -> Json<Value> {
            Json(json!({}))
        }
        async fn string_field() -> Json<Value> {
            Json(json!({"redacted_files": "x"}))
        }
        let dir = tempfile::tempdir().unwrap();
        let files = vec![write_file(dir.path(), "a.pdf", b"%PDF")];

        for router in [
            Router::new().route("/upload", post(empty_object)),
            Router::new().route("/upload", post(string_field)),
        ] {
            let url = spawn_server(router).await;
            let err = client_for(&url).upload(&files).await.unwrap_err();
            assert!(matches!(err, ClientError::MissingField("redacted_files")));
            assert_eq!(err.kind(), ErrorKind::Shape);
        }
    }

    #[tokio::test]
    async fn evaluate_posts_criteria_and_parses_tables() {
        let (url, received) = spawn_redaction_server().await;
        let dir = tempfile::tempdir().unwrap();
        let criteria = write_file(dir.path(), "criteria.xlsx", b"xlsx");

        let evaluation = client_for(&url).evaluate(&criteria.path).await.unwrap();

        assert_eq!(evaluation.evaluations.len(), 1);
        assert_eq!(evaluation.evaluations[0].document, "x_redacted.txt");
        assert!(evaluation.evaluation_table.is_some());
        assert!(evaluation.yes_no_table.is_none());
        assert_eq!(
            received.fields.lock().unwrap().clone(),
            vec![("evaluation_criteria".to_string(), "criteria.xlsx".to_string())]
        );
    }

    #[tokio::test]
    async fn evaluate_without_evaluations_array_is_a_shape_error() {
        async fn wrong_shape() -> Json<Value> {
            Json(json!({"evaluations": "pending"}))
        }
        let url = spawn_server(Router::new().route("/evaluate", post(wrong_shape))).await;
        let dir = tempfile::tempdir().unwrap();
        let criteria = write_file(dir.path(), "criteria.txt", b"price 40%");

        let err = client_for(&url).evaluate(&criteria.path).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingField("evaluations")));
    }

    #[tokio::test]
    async fn download_saves_redacted_text_under_destination() {
        let (url, _) = spawn_redaction_server().await;
        let dir = tempfile::tempdir().unwrap();
        let redacted = RedactedFile {
            document: "a.pdf".to_string(),
            redacted_text_file: "/download/a_redacted.txt".to_string(),
        };

        let saved = client_for(&url).download(&redacted, dir.path()).await.unwrap();

        assert_eq!(saved.path, dir.path().join("a_redacted.txt"));
        let contents = fs::read_to_string(&saved.path).unwrap();
        assert_eq!(contents, "[REDACTED NAME] wrote a_redacted.txt");
    }

    #[tokio::test]
    async fn download_of_missing_file_reports_status() {
        let (url, _) = spawn_redaction_server().await;
        let dir = tempfile::tempdir().unwrap();
        let redacted = RedactedFile {
            document: "gone.pdf".to_string(),
            redacted_text_file: "/download/missing.txt".to_string(),
        };

        let err = client_for(&url).download(&redacted, dir.path()).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 404, .. }));
        assert!(!dir.path().join("missing.txt").exists());
    }
}
