//! Background thread that runs network requests on its own tokio runtime and
//! reports results back to the UI thread over channels.

use crate::error::ClientError;
use crate::upload::{EvaluationResponse, RedactedFile, RedactionClient, SavedFile, SelectedFile};
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use tracing::{debug, error, info};

#[derive(Debug)]
pub enum Command {
    Upload(Vec<SelectedFile>),
    Evaluate(PathBuf),
    Download {
        file: RedactedFile,
        dest_dir: PathBuf,
    },
}

#[derive(Debug)]
pub enum Event {
    UploadFinished(Result<Vec<RedactedFile>, ClientError>),
    EvaluationFinished(Result<EvaluationResponse, ClientError>),
    DownloadFinished(Result<SavedFile, ClientError>),
}

impl Event {
    /// The event reported when `command` could not be handed to the worker.
    pub fn undelivered(command: Command) -> Self {
        match command {
            Command::Upload(_) => Event::UploadFinished(Err(ClientError::WorkerUnavailable)),
            Command::Evaluate(_) => Event::EvaluationFinished(Err(ClientError::WorkerUnavailable)),
            Command::Download { .. } => {
                Event::DownloadFinished(Err(ClientError::WorkerUnavailable))
            }
        }
    }
}

pub struct Worker {
    commands: Sender<Command>,
    events: Receiver<Event>,
    repaint: Arc<OnceLock<egui::Context>>,
    _thread: JoinHandle<()>,
}

impl Worker {
    pub fn spawn(client: RedactionClient) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (command_sender, command_receiver) = channel::<Command>();
        let (event_sender, event_receiver) = channel::<Event>();
        let repaint = Arc::new(OnceLock::<egui::Context>::new());
        let thread_repaint = repaint.clone();

        let thread = std::thread::Builder::new()
            .name("redaction-worker".to_string())
            .spawn(move || {
                info!("Worker started for {}", client.config().server_url);
                while let Ok(command) = command_receiver.recv() {
                    debug!("Worker received {:?}", command);
                    let client = client.clone();
                    let events = event_sender.clone();
                    let repaint = thread_repaint.clone();
                    runtime.spawn(async move {
                        let event = run(&client, command).await;
                        if events.send(event).is_err() {
                            error!("UI closed before the worker could report a result");
                        }
                        if let Some(ctx) = repaint.get() {
                            ctx.request_repaint();
                        }
                    });
                }
                info!("Command channel closed, stopping worker");
                runtime.shutdown_background();
            })?;

        Ok(Self {
            commands: command_sender,
            events: event_receiver,
            repaint,
            _thread: thread,
        })
    }

    /// Once attached, the window is asked to redraw after every event so it
    /// does not need to poll.
    pub fn attach_repaint(&self, ctx: egui::Context) {
        let _ = self.repaint.set(ctx);
    }

    /// Hands `command` to the worker, or returns the failure event to apply
    /// when the worker is gone.
    pub fn dispatch(&self, command: Command) -> Result<(), Event> {
        self.commands
            .send(command)
            .map_err(|e| Event::undelivered(e.0))
    }

    pub fn try_recv(&self) -> Option<Event> {
        self.events.try_recv().ok()
    }
}

async fn run(client: &RedactionClient, command: Command) -> Event {
    match command {
        Command::Upload(files) => Event::UploadFinished(client.upload(&files).await),
        Command::Evaluate(criteria) => {
            Event::EvaluationFinished(client.evaluate(&criteria).await)
        }
        Command::Download { file, dest_dir } => {
            Event::DownloadFinished(client.download(&file, &dest_dir).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Cli};
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::time::{Duration, Instant};

    fn recv_within(worker: &Worker, timeout: Duration) -> Option<Event> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(event) = worker.try_recv() {
                return Some(event);
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        None
    }

    fn spawn_evaluate_server() -> String {
        async fn evaluate() -> Json<Value> {
            Json(json!({"evaluations": [{"document": "a_redacted.txt", "evaluation": "fine"}]}))
        }
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.set_nonblocking(true).expect("nonblocking");
        let addr = listener.local_addr().expect("addr");
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().expect("server runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("listener");
                let app = Router::new().route("/evaluate", post(evaluate));
                let _ = axum::serve(listener, app).await;
            });
        });
        format!("http://{addr}")
    }

    fn client_for(server_url: &str) -> RedactionClient {
        let cli = Cli {
            server_url: server_url.to_string(),
            request_timeout_secs: Some(10),
            log_filter: None,
        };
        RedactionClient::new(AppConfig::from_cli(&cli).unwrap()).unwrap()
    }

    #[test]
    fn evaluate_command_comes_back_as_event() {
        let url = spawn_evaluate_server();
        let dir = tempfile::tempdir().unwrap();
        let criteria = dir.path().join("criteria.txt");
        std::fs::write(&criteria, "Price 40%").unwrap();

        let worker = Worker::spawn(client_for(&url)).unwrap();
        worker.dispatch(Command::Evaluate(criteria)).unwrap();

        match recv_within(&worker, Duration::from_secs(10)) {
            Some(Event::EvaluationFinished(Ok(response))) => {
                assert_eq!(response.evaluations.len(), 1);
                assert_eq!(response.evaluations[0].document, "a_redacted.txt");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn empty_upload_is_reported_without_a_request() {
        let worker = Worker::spawn(client_for("http://127.0.0.1:9")).unwrap();
        worker.dispatch(Command::Upload(Vec::new())).unwrap();

        match recv_within(&worker, Duration::from_secs(5)) {
            Some(Event::UploadFinished(Err(ClientError::NoFilesSelected))) => {}
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn undelivered_command_maps_to_worker_failure() {
        let event = Event::undelivered(Command::Evaluate(PathBuf::from("c.xlsx")));
        assert!(matches!(
            event,
            Event::EvaluationFinished(Err(ClientError::WorkerUnavailable))
        ));
    }
}
