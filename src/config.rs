use crate::error::ClientError;
use clap::Parser;
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5002";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "redaction-uploader",
    version,
    about = "Upload documents for redaction and evaluate them against criteria"
)]
pub struct Cli {
    /// Base URL of the redaction server
    #[arg(long, env = "REDACTOR_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Give up on a request after this many seconds (waits forever when unset)
    #[arg(long, env = "REDACTOR_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// tracing filter, e.g. "info" or "redaction_uploader=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_url: Url,
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ClientError> {
        let mut server_url = Url::parse(&cli.server_url)
            .map_err(|_| ClientError::InvalidUrl(cli.server_url.clone()))?;
        if server_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(cli.server_url.clone()));
        }
        // Url::join drops the last segment unless the path ends with '/'
        if !server_url.path().ends_with('/') {
            let path = format!("{}/", server_url.path());
            server_url.set_path(&path);
        }

        Ok(Self {
            server_url,
            request_timeout: cli.request_timeout_secs.map(Duration::from_secs),
        })
    }

    pub fn upload_url(&self) -> Result<Url, ClientError> {
        self.resolve("upload")
    }

    pub fn evaluate_url(&self) -> Result<Url, ClientError> {
        self.resolve("evaluate")
    }

    /// Resolves a link returned by the server. Absolute and protocol-relative
    /// links keep their own host. Root-relative ones such as
    /// `/download/x_redacted.txt` are joined under the server URL, so a
    /// path prefix on the server URL is preserved.
    pub fn resolve(&self, link: &str) -> Result<Url, ClientError> {
        if let Ok(url) = Url::parse(link) {
            return Ok(url);
        }
        let relative = if link.starts_with("//") {
            link
        } else {
            link.strip_prefix('/').unwrap_or(link)
        };
        self.server_url
            .join(relative)
            .map_err(|_| ClientError::InvalidUrl(link.to_string()))
    }
}
