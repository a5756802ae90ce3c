//! Folio
//!
//! Runs a canvas workspace for one document. Commands arrive as JSON lines
//! on stdin; workspace events leave as JSON lines on stdout. Logs go to
//! stderr.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::mpsc::{Receiver, UnboundedReceiver};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::config::Config;
use folio::document::DocumentStructure;
use folio::ipc::{self, Command};
use folio::services::{
    DirectoryContentProvider, FileLayoutStore, LayoutStore, LogEditorLauncher, MemoryLayoutStore, Services,
};
use folio::wm::{Wake, Workspace};

/// Command line options
struct Args {
    project: PathBuf,
    document: Option<String>,
    viewport: (f64, f64),
    memory_store: bool,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut args = Args {
            project: PathBuf::from("."),
            document: None,
            viewport: (1600.0, 1000.0),
            memory_store: false,
        };

        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--project" | "-p" => {
                    args.project = iter.next().context("--project needs a directory")?.into();
                }
                "--document" | "-d" => {
                    args.document = Some(iter.next().context("--document needs an id")?);
                }
                "--viewport" => {
                    let value = iter.next().context("--viewport needs WIDTHxHEIGHT")?;
                    args.viewport = parse_viewport(&value)
                        .with_context(|| format!("Invalid viewport size: {}", value))?;
                }
                "--memory-store" => args.memory_store = true,
                other => warn!("Ignoring unknown argument {}", other),
            }
        }
        Ok(args)
    }
}

fn parse_viewport(value: &str) -> Option<(f64, f64)> {
    let (w, h) = value.split_once('x')?;
    let (w, h) = (w.trim().parse::<f64>().ok()?, h.trim().parse::<f64>().ok()?);
    (w > 0.0 && h > 0.0).then_some((w, h))
}

/// `document.json` in the project directory, when present
fn load_document(project: &Path) -> DocumentStructure {
    let path = project.join("document.json");
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(_) => {
            debug!("No document structure at {:?}", path);
            return DocumentStructure::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Failed to parse {:?}: {}", path, e);
            DocumentStructure::default()
        }
    }
}

/// Main application state
struct FolioApp {
    workspace: Workspace,
    wakes: UnboundedReceiver<Wake>,
    document: DocumentStructure,
    stdout: Stdout,
}

impl FolioApp {
    fn new(args: Args, config: Config) -> Result<Self> {
        let document_id = match args.document {
            Some(id) => id,
            None => args
                .project
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "default".into()),
        };

        let store: Arc<dyn LayoutStore> = if args.memory_store {
            info!("Using in-memory layout store");
            Arc::new(MemoryLayoutStore::new())
        } else {
            let store = FileLayoutStore::in_data_dir()
                .unwrap_or_else(|| FileLayoutStore::new(args.project.join(".folio").join("layouts")));
            Arc::new(store)
        };
        let services = Services::new(
            Arc::new(DirectoryContentProvider::new(&args.project)),
            store,
            Arc::new(LogEditorLauncher::new()),
        );

        let document = load_document(&args.project);
        let (mut workspace, wakes) = Workspace::new(config, document_id, args.viewport, services);
        let restored = workspace.load_state();
        info!("Loaded {} persisted window(s)", restored);

        Ok(Self {
            workspace,
            wakes,
            document,
            stdout: tokio::io::stdout(),
        })
    }

    /// Process commands and timer wake-ups until stdin closes or shutdown
    async fn run(mut self, mut shutdown_rx: Receiver<()>) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        self.write_events().await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read stdin")? else {
                        info!("Input closed");
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match Command::parse(&line) {
                        Ok(command) => {
                            if let Err(e) = ipc::apply(&mut self.workspace, command, &self.document).await {
                                warn!("{:#}", e);
                            }
                        }
                        Err(e) => warn!("{:#}", e),
                    }
                }
                Some(wake) = self.wakes.recv() => {
                    self.workspace.handle_wake(wake);
                }
                Some(()) = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
            self.write_events().await?;
        }

        if let Err(e) = self.workspace.flush_save().await {
            warn!("Final layout save failed: {}", e);
        }
        Ok(())
    }

    async fn write_events(&mut self) -> Result<()> {
        let events = self.workspace.drain_events();
        if events.is_empty() {
            return Ok(());
        }
        let mut out = String::new();
        for event in &events {
            out.push_str(&ipc::encode_event(event)?);
            out.push('\n');
        }
        self.stdout.write_all(out.as_bytes()).await?;
        self.stdout.flush().await?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "folio=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Folio workspace");

    let args = Args::parse()?;
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {:#}", e);
        Config::default()
    });

    // Setup signal handlers for graceful shutdown
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let tx = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully"),
            }
            let _ = tx.send(()).await;
        });
    }
    drop(shutdown_tx);

    let app = FolioApp::new(args, config)?;
    if let Err(e) = app.run(shutdown_rx).await {
        error!("Application error: {:#}", e);
        return Err(e);
    }

    Ok(())
}
