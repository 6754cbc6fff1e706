use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
    thread,
    time::Duration,
};

mod backend_bridge;
mod config;
mod controller;
mod ui;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use crossbeam_channel::{bounded, never, select, Receiver, Sender};
use tracing_subscriber::EnvFilter;
use uploader_core::{
    Catalog, CatalogSource, DemoCatalog, JsonFileCatalog, ObjectUrlRegistry, PhotoUploader,
    SimulatedPersistence,
};

use backend_bridge::{
    commands::BackendCommand,
    runtime::{launch, Collaborators},
};
use controller::{
    events::UiEvent,
    input::parse_line,
    orchestration::dispatch_backend_command,
    reducer::{Flow, OutputFormat, Session},
};

const CATALOG_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Pick an athlete, attach a photo and save it.
#[derive(Parser, Debug)]
struct Args {
    /// Config file (defaults to ./uploader.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Require a race before photos can be saved.
    #[arg(long)]
    require_race: bool,
    /// Simulated save latency in milliseconds.
    #[arg(long)]
    save_delay_ms: Option<u64>,
    /// JSON catalog file; the built-in roster is used otherwise.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Print the state as JSON lines instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings(args.config.as_deref())?;
    if args.require_race {
        settings.require_race_selection = true;
    }
    if let Some(delay) = args.save_delay_ms {
        settings.save_delay_ms = delay;
    }
    if let Some(path) = args.catalog {
        settings.catalog_path = Some(path);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .with_context(|| format!("invalid log filter '{}'", settings.log_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    tracing::info!(
        require_race_selection = settings.require_race_selection,
        save_delay_ms = settings.save_delay_ms,
        "starting athlete photo uploader"
    );

    let catalog_source: Arc<dyn CatalogSource> = match &settings.catalog_path {
        Some(path) => Arc::new(JsonFileCatalog::new(path)),
        None => Arc::new(DemoCatalog),
    };
    let collaborators = Collaborators {
        catalog: catalog_source,
        persistence: Arc::new(SimulatedPersistence::new(settings.save_delay())),
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    let backend = launch(cmd_rx, ui_tx, collaborators);

    let catalog = load_catalog(&cmd_tx, &ui_rx)?;
    let uploader = PhotoUploader::new(
        settings.uploader_config(),
        Arc::new(ObjectUrlRegistry::new()),
    );
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut session = Session::new(uploader, catalog, cmd_tx, format);

    let (input_tx, input_rx) = bounded::<String>(64);
    spawn_input_reader(input_tx);
    let result = run_event_loop(&mut session, input_rx, &ui_rx);

    session.shutdown();
    // Dropping the session closes the command queue and stops the worker.
    drop(session);
    if backend.join().is_err() {
        tracing::error!("backend worker panicked");
    }
    result
}

fn load_catalog(cmd_tx: &Sender<BackendCommand>, ui_rx: &Receiver<UiEvent>) -> Result<Catalog> {
    let mut status = String::new();
    if !dispatch_backend_command(cmd_tx, BackendCommand::LoadCatalog, &mut status) {
        bail!("{status}");
    }
    match ui_rx.recv_timeout(CATALOG_LOAD_TIMEOUT) {
        Ok(UiEvent::CatalogLoaded(catalog)) => Ok(catalog),
        Ok(UiEvent::Error(err)) => Err(anyhow!("{}", err.message())),
        Ok(UiEvent::SaveFinished(_)) => Err(anyhow!("unexpected save completion during startup")),
        Err(err) => Err(anyhow!("catalog did not load: {err}")),
    }
}

fn spawn_input_reader(input_tx: Sender<String>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if input_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!("stopped reading input: {err}");
                    break;
                }
            }
        }
    });
}

/// Single owner of the uploader state. Operator lines and backend events are
/// applied in arrival order. After input ends, an outstanding save is still
/// awaited before exiting.
fn run_event_loop(
    session: &mut Session,
    mut input_rx: Receiver<String>,
    ui_rx: &Receiver<UiEvent>,
) -> Result<()> {
    let mut stdout = io::stdout();
    let mut input_open = true;
    loop {
        let mut flow = Flow::Continue;
        select! {
            recv(input_rx) -> line => match line {
                Ok(line) => match parse_line(&line) {
                    Ok(Some(command)) => flow = session.handle_command(command),
                    Ok(None) => {}
                    Err(message) => session.notice(&message),
                },
                Err(_) => input_open = false,
            },
            recv(ui_rx) -> event => match event {
                Ok(event) => flow = session.handle_event(event),
                Err(_) => {
                    session.notice("backend worker stopped");
                    flow = Flow::Quit;
                }
            },
        }

        stdout
            .write_all(session.take_output().as_bytes())
            .and_then(|()| stdout.flush())
            .context("failed to write output")?;

        if flow == Flow::Quit {
            return Ok(());
        }
        if !input_open {
            if !session.is_saving() {
                return Ok(());
            }
            input_rx = never();
        }
    }
}
