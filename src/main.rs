use std::fs::{self, OpenOptions};
use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use clap::Parser;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::DefaultTerminal;
use ratatui::crossterm::execute;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod columns;
mod controller;
mod domain;
mod filter;
mod inputter;
mod model;
mod record;
mod region;
mod source;
mod table;
mod tooltip;
mod ui;

use controller::Controller;
use domain::{DEFAULT_DATE_FORMAT, DEFAULT_RESULTS, DEFAULT_URL, Message, RosterConfig, RosterError};
use model::{Model, Status};
use source::FetchResult;
use ui::TableUI;

/// Browse and search a list of users fetched from a remote API.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Users API endpoint
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Number of users to request
    #[arg(long, default_value_t = DEFAULT_RESULTS)]
    results: usize,

    /// Read the users payload from a JSON file instead of the API
    #[arg(long)]
    file: Option<PathBuf>,

    /// Quiet period after the last keystroke before the search runs
    #[arg(long, default_value_t = 1000)]
    debounce_ms: u64,

    /// How long to wait for terminal events per frame
    #[arg(long, default_value_t = 100)]
    event_poll_time: u64,

    /// strftime format of the registration date
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    date_format: String,

    /// HTTP timeout
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Log file, the terminal is used by the UI
    #[arg(long, default_value = "~/.cache/roster.log")]
    log_file: String,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> Result<RosterConfig, RosterError> {
        RosterConfig::default()
            .url(self.url.clone())
            .results(self.results)
            .file(self.file.clone())
            .debounce_ms(self.debounce_ms)
            .event_poll_time(self.event_poll_time)
            .date_format(self.date_format.clone())
            .timeout_secs(self.timeout_secs)
            .validate()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(cli: &Cli) -> Result<(), RosterError> {
    let path = PathBuf::from(
        shellexpand::full(&cli.log_file)
            .map_err(|e| RosterError::LoggingFailed(e.to_string()))?
            .as_ref(),
    );
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .map_err(|e| RosterError::LoggingFailed(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| RosterError::LoggingFailed(e.to_string()))
}

fn run(cli: &Cli) -> Result<(), RosterError> {
    let cfg = cli.config()?;
    init_logging(cli)?;
    info!("Starting roster!");

    let source = source::from_config(&cfg)?;
    let pending = source::spawn_fetch(source);

    let mut model = Model::init(&cfg);
    let mut ui = TableUI::new();
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();
    let result = execute!(stdout(), EnableMouseCapture)
        .map_err(RosterError::from)
        .and_then(|_| {
            event_loop(
                &mut terminal,
                &mut model,
                &mut ui,
                &controller,
                Some(pending),
            )
        });

    let captured = execute!(stdout(), DisableMouseCapture);
    ratatui::restore();
    info!("Quitting roster");
    result?;
    Ok(captured?)
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    model: &mut Model,
    ui: &mut TableUI,
    controller: &Controller,
    mut pending: Option<flume::Receiver<FetchResult>>,
) -> Result<(), RosterError> {
    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model, f))?;

        if let Some(fetched) = pending.as_ref().and_then(source::poll_fetch) {
            pending = None;
            model.update(Message::Loaded(fetched))?;
        }

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(model, ui.hit_map())? {
            model.update(message)?;
        }

        model.update(Message::Tick(Instant::now()))?;
    }
    Ok(())
}
