use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use roswatch::ui::{self, Theme};
use roswatch::{
    dump_lines, events, App, BusSource, BusState, DashboardConfig, DumpTarget, FileSource,
    Overrides, StreamSource,
};

/// How long `--dump` waits for a streamed snapshot
const DUMP_WAIT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "roswatch")]
#[command(about = "Terminal dashboard for topics, services and TF frames on a ROS-style bus")]
struct Args {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON snapshot file to poll
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// host:port of a bridge streaming NDJSON bus events
    #[arg(long)]
    connect: Option<String>,

    /// Rolling window capacity for topic rates
    #[arg(short, long)]
    window: Option<u64>,

    /// Forest refresh interval in milliseconds
    #[arg(short, long)]
    refresh_ms: Option<u64>,

    /// Log file (the terminal belongs to the dashboard)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print a fully expanded tree and exit
    #[arg(long, value_enum)]
    dump: Option<DumpTarget>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            file: self.file.clone(),
            connect: self.connect.clone(),
            window_capacity: self.window,
            forest_refresh_ms: self.refresh_ms,
            log_file: self.log_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = DashboardConfig::load(&args.overrides())?;
    init_logging(&config)?;

    // Stream sources spawn their reader onto this runtime
    let runtime = Runtime::new()?;
    let _guard = runtime.enter();
    let source = open_source(&runtime, &config)?;

    if let Some(target) = args.dump {
        return dump(source, target);
    }

    // Queries the terminal, so it must run before raw mode is entered
    let theme = Theme::auto_detect();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let poll_timeout = config.poll_timeout();
    let mut app = App::with_theme(source, config, theme);
    app.refresh_bus();

    let result = run_app(&mut terminal, &mut app, poll_timeout);
    if let Err(e) = &result {
        error!(error = %e, "Dashboard loop failed");
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn init_logging(config: &DashboardConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    let file = File::create(&config.log_file)
        .with_context(|| format!("cannot create log file {}", config.log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn open_source(runtime: &Runtime, config: &DashboardConfig) -> Result<Box<dyn BusSource>> {
    if let Some(address) = &config.source.connect {
        let stream = runtime
            .block_on(TcpStream::connect(address))
            .with_context(|| format!("cannot connect to {address}"))?;
        info!(%address, "Connected to bus bridge");
        let (reader, writer) = stream.into_split();
        return Ok(Box::new(StreamSource::spawn(reader, writer, address)));
    }
    if let Some(path) = &config.source.file {
        return Ok(Box::new(FileSource::new(path)));
    }
    bail!("no bus source configured: pass --file or --connect")
}

fn dump(source: Box<dyn BusSource>, target: DumpTarget) -> Result<()> {
    let mut bus = BusState::new(source);
    let deadline = Instant::now() + DUMP_WAIT;
    while !bus.refresh() {
        if let Some(err) = bus.last_error() {
            bail!("{}: {err}", bus.description());
        }
        if Instant::now() >= deadline {
            bail!("{}: no snapshot within {:?}", bus.description(), DUMP_WAIT);
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    for line in dump_lines(target, bus.current_snapshot())? {
        println!("{line}");
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    poll_timeout: Duration,
) -> Result<()> {
    while app.running {
        if app.take_redraw() {
            terminal.draw(|frame| ui::render(frame, app, Instant::now()))?;
        }

        if let Some(event) = events::poll_event(poll_timeout)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key, Instant::now()),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, Instant::now()),
                Event::Resize(_, _) => app.request_redraw(),
                _ => {}
            }
        }

        // Drains arrivals and fires every cadence that is due
        app.tick(Instant::now());
    }

    Ok(())
}
