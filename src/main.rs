use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};

use brokerwatch::app::App;
use brokerwatch::channel::{supervise, ChannelEvent, ReconnectPrompt, TcpTransport};
use brokerwatch::config::{PolicyKind, Settings};
use brokerwatch::{events, ui};

#[derive(Parser, Debug)]
#[command(name = "brokerwatch")]
#[command(about = "Terminal dashboard for live broker telemetry channels")]
struct Args {
    /// Broker status endpoint host
    #[arg(long)]
    host: Option<String>,

    /// Broker status endpoint port
    #[arg(short, long)]
    port: Option<u16>,

    /// Channels to subscribe (one connection each)
    #[arg(short, long, value_delimiter = ',')]
    channels: Option<Vec<String>>,

    /// Sliding window capacity, in samples
    #[arg(long)]
    capacity: Option<usize>,

    /// Render tick interval in milliseconds
    #[arg(short = 'i', long)]
    interval: Option<u64>,

    /// What to do when a channel's transport fails
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,

    /// Cap on consecutive reconnect attempts (auto policy)
    #[arg(long)]
    max_retries: Option<u32>,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append tracing output to this file (the TUI owns the terminal)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// CLI flags win over file and environment settings.
    fn apply(&self, settings: &mut Settings) {
        if let Some(ref host) = self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(ref channels) = self.channels {
            settings.channels = channels.clone();
        }
        if let Some(capacity) = self.capacity {
            settings.capacity = capacity;
        }
        if let Some(interval) = self.interval {
            settings.tick_interval_ms = interval;
        }
        if let Some(policy) = self.policy {
            settings.policy = policy;
        }
        if let Some(max_retries) = self.max_retries {
            settings.max_retries = Some(max_retries);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    run(settings)
}

/// Spawn one supervisor per channel on a background runtime, then hand the
/// main thread to the TUI. On exit the shutdown signal stops the
/// supervisors, which drop their transports.
fn run(settings: Settings) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    let (events_tx, events_rx) = mpsc::channel::<ChannelEvent>(256);
    let (prompts_tx, prompts_rx) = mpsc::channel::<ReconnectPrompt>(4);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let transport = Arc::new(TcpTransport::new(settings.endpoint()));
    for channel in &settings.channels {
        rt.spawn(supervise(
            transport.clone(),
            channel.clone(),
            events_tx.clone(),
            settings.reconnect_policy(),
            prompts_tx.clone(),
            shutdown_rx.clone(),
        ));
    }
    // The supervisors hold the only remaining senders
    drop(events_tx);
    drop(prompts_tx);

    let result = run_tui(&settings, events_rx, prompts_rx);

    let _ = shutdown_tx.send(true);
    rt.shutdown_timeout(Duration::from_secs(1));

    result
}

/// Set up the terminal, run the main loop, and restore the terminal on every
/// exit path (including panics).
fn run_tui(
    settings: &Settings,
    events_rx: mpsc::Receiver<ChannelEvent>,
    prompts_rx: mpsc::Receiver<ReconnectPrompt>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Panic hook to restore the terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(settings);
    let result = run_app(&mut terminal, &mut app, events_rx, prompts_rx, settings.tick_interval());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut events_rx: mpsc::Receiver<ChannelEvent>,
    mut prompts_rx: mpsc::Receiver<ReconnectPrompt>,
    interval: Duration,
) -> Result<()> {
    let mut next_tick = Instant::now() + interval;

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Drain connection events and any pending operator prompt before
        // waiting on input
        while let Ok(event) = events_rx.try_recv() {
            app.on_channel_event(event);
        }
        if app.prompt.is_none() {
            if let Ok(prompt) = prompts_rx.try_recv() {
                app.on_prompt(prompt);
            }
        }

        // Wait for input, but never past the next tick deadline
        let timeout = next_tick
            .saturating_duration_since(Instant::now())
            .min(Duration::from_millis(50));
        if let Some(Event::Key(key)) = events::poll_event(timeout)? {
            events::handle_key_event(app, key);
        }

        let now = Instant::now();
        if now >= next_tick {
            app.on_tick();
            // The next deadline derives from the previous one, not from
            // "now", so the scroll stays phase-locked under input and
            // arrival jitter. A long stall (terminal suspended) resyncs
            // instead of replaying missed ticks.
            next_tick += interval;
            if next_tick < now {
                next_tick = now + interval;
            }
        }
    }

    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
