mod app;
mod config;
mod domain;
mod infrastructure;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::{App, InputMode, StatusLevel};
use crate::domain::{NetworkId, ProbeState, ProbeStatus, ProbeWorkflow};
use crate::infrastructure::ethereum::create_client;
use crate::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};

#[derive(Debug, Parser)]
#[command(
    name = "quartz-signal",
    version,
    about = "QuartzSignal: probe Base RPC endpoints (chain id, block height, balance)"
)]
struct Args {
    /// Network to probe
    #[arg(long, value_enum)]
    network: Option<NetworkId>,

    /// Address whose native balance is read (0x + 40 hex)
    #[arg(long)]
    address: Option<String>,

    /// Run a single probe, print the result and exit
    #[arg(long)]
    once: bool,

    /// With --once, print the result as JSON
    #[arg(long, requires = "once")]
    json: bool,

    /// Per-probe timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log filter (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,
}

/// Effective settings after merging flags over the config file
struct Settings {
    network: NetworkId,
    address: String,
    timeout: Duration,
    log_level: String,
}

impl Settings {
    fn resolve(args: &Args, config: &config::Config) -> Self {
        Self {
            network: args.network.or(config.network).unwrap_or_default(),
            address: args
                .address
                .clone()
                .or_else(|| config.address.clone())
                .unwrap_or_default(),
            timeout: args
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.timeout()),
            log_level: args
                .log_level
                .clone()
                .or_else(|| config.log_level.clone())
                .unwrap_or_else(|| config::DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let loaded = config::load();
    let settings = Settings::resolve(&args, &loaded.config);

    if args.once {
        init_stderr_logging(&settings.log_level);
        if let Some(warning) = &loaded.warning {
            tracing::warn!("{warning}");
        }
        return run_once(&settings, args.json);
    }

    let log_warning = init_file_logging(&settings.log_level)
        .err()
        .map(|err| format!("Logging disabled: {err:#}"));

    let runtime = RuntimeBridge::new(settings.network, settings.timeout)?;

    let mut app = App::new(settings.network, settings.address.clone());
    app.set_status("Press r to run a probe", StatusLevel::Info);
    if let Some(warning) = loaded.warning.or(log_warning) {
        app.set_status(warning, StatusLevel::Warn);
    }
    info!(network = %settings.network, "starting TUI");

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(ExitCode::SUCCESS)
}

fn init_stderr_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// The TUI owns the terminal, so interactive logs go to a file
fn init_file_logging(level: &str) -> Result<()> {
    let path = config::log_file_path().context("No data directory for the log file")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;
    Ok(())
}

fn run_once(settings: &Settings, json: bool) -> Result<ExitCode> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;
    let client = create_client(settings.network.config().rpc_url)?;
    let mut workflow = ProbeWorkflow::new(settings.network);

    let state = rt.block_on(workflow.run(client.as_ref(), &settings.address, settings.timeout));

    if json {
        println!("{}", serde_json::to_string_pretty(&state.summary())?);
    } else {
        print!("{}", render_report(state));
    }

    Ok(match state.status {
        ProbeStatus::Finished => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn render_report(state: &ProbeState) -> String {
    let config = state.network.config();
    let mut out = String::new();
    out.push_str(&format!("Network:          {}\n", config.caption()));
    out.push_str(&format!("Status:           {}\n", state.status.label()));
    out.push_str(&format!("Expected chainId: {}\n", state.expected_chain_id()));
    out.push_str(&format!("RPC chainId:      {}\n", state.chain_id_text()));
    out.push_str(&format!("Latest block:     {}\n", state.block_text()));
    out.push_str(&format!("Native balance:   {}\n", state.balance_text()));
    out.push_str(&format!("Explorer:         {}\n", state.explorer_link()));
    if let Some(warning) = &state.warning {
        out.push_str(&format!("Warning:          {}\n", warning));
    }
    if let Some(error) = state.error() {
        out.push_str(&format!("Error:            {}\n", error));
    }
    out
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        dispatch_requests(&mut app, &runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::ClientReady { network, endpoint } => {
                app.apply_client_ready(network, endpoint)
            }
            RuntimeEvent::ProbeDone { ticket, outcome } => app.apply_probe_done(ticket, outcome),
            RuntimeEvent::Error { message } => app.apply_rpc_error(message),
        }
    }
}

/// Forward what the last key press asked for; a network switch goes first so
/// the worker rebuilds its client before the next probe arrives
fn dispatch_requests(app: &mut App, runtime: &RuntimeBridge) {
    if let Some(network) = app.take_network_switch_request() {
        if let Err(err) = runtime.send(RuntimeCommand::SelectNetwork { network }) {
            app.apply_rpc_error(format!("{err:#}"));
        }
    }
    if let Some(ticket) = app.take_probe_request() {
        if let Err(err) = runtime.send(RuntimeCommand::Probe {
            ticket: ticket.clone(),
        }) {
            app.fail_dispatch(ticket, format!("{err:#}"));
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Address => handle_address_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.help_open = true,
        KeyCode::Char('n') | KeyCode::Tab => app.cycle_network(),
        KeyCode::Char('a') | KeyCode::Char('i') => app.enter_address(),
        KeyCode::Char('c') => app.clear_address(),
        KeyCode::Char('r') | KeyCode::Enter => app.trigger_probe(),
        _ => {}
    }
}

fn handle_address_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_address(false),
        KeyCode::Enter => app.exit_address(true),
        KeyCode::Backspace => {
            app.address_draft.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.address_draft.push(ch);
        }
        _ => {}
    }
}
