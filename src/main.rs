use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use crossterm::event::KeyEventKind;
use tokio::task::JoinHandle;

use perfpanel::app::App;
use perfpanel::config::{self, Config, load_config, load_config_from_path};
use perfpanel::controller::ViewStateController;
use perfpanel::event::{Event, EventHandler};
use perfpanel::export::{FileOpener, SystemOpener};
use perfpanel::system::collector::Collector;
use perfpanel::system::local::LocalProvider;
use perfpanel::system::memory::{MemoryProvider, synthetic_snapshot};
use perfpanel::system::provider::PerformanceDataProvider;
use perfpanel::ui;

#[derive(Parser)]
#[command(
    name = "perfpanel",
    about = "Terminal performance dashboard with health thresholds and metric export"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling interval in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Process to sample (defaults to this process)
    #[arg(long)]
    pid: Option<u32>,

    /// Directory export files are written to
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Do not open exported files
    #[arg(long, default_value_t = false)]
    no_open: bool,

    /// Feed synthetic metrics instead of sampling a process
    #[arg(long, default_value_t = false)]
    demo: bool,

    /// Write logs to this file (the terminal belongs to the dashboard)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level filter: error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    if cli.refresh_rate == Some(0) {
        return Err(eyre!("--refresh-rate must be greater than 0"));
    }
    if let Some(path) = &cli.log_file {
        init_logging(path, &cli.log_level)?;
    }

    let config = load_config_for_cli(&cli);
    let feed = start_feed(&cli, &config)?;

    let opener: Option<Arc<dyn FileOpener>> = if config.general.open_exports {
        Some(Arc::new(SystemOpener))
    } else {
        None
    };
    let controller = ViewStateController::new(feed.provider.clone(), opener);
    let mut app = App::new(controller, &config);

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut app).await;
    ratatui::restore();

    app.shutdown();
    feed.sampler.abort();
    result
}

async fn run(terminal: &mut ratatui::DefaultTerminal, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    terminal.draw(|frame| ui::draw_app(frame, app))?;

    while app.running {
        let redraw = tokio::select! {
            event = events.next() => match event {
                Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    let action = app.map_key(key);
                    app.dispatch(action);
                    true
                }
                Some(Event::Key(_)) => false,
                Some(Event::Resize) => true,
                None => {
                    app.running = false;
                    false
                }
            },
            update = app.controller.next_update() => update.is_some(),
        };
        if redraw {
            terminal.draw(|frame| ui::draw_app(frame, app))?;
        }
    }

    Ok(())
}

/// The provider the dashboard observes and the task feeding it.
struct Feed {
    provider: Arc<dyn PerformanceDataProvider>,
    sampler: JoinHandle<()>,
}

fn start_feed(cli: &Cli, config: &Config) -> Result<Feed> {
    let settings = config.thresholds.to_settings();
    let interval = Duration::from_millis(config.general.refresh_rate_ms.max(1));
    let capacity = config.general.history_capacity;

    if cli.demo {
        let provider = Arc::new(MemoryProvider::new(settings, capacity));
        let feeder = Arc::clone(&provider);
        let sampler = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            for tick in 0u64.. {
                ticker.tick().await;
                feeder.push_snapshot(synthetic_snapshot(tick));
            }
        });
        return Ok(Feed { provider, sampler });
    }

    let collector = match cli.pid {
        Some(pid) => Collector::new(sysinfo::Pid::from_u32(pid)),
        None => Collector::for_current_process()
            .ok_or_else(|| eyre!("could not determine the current process id"))?,
    };
    let provider = Arc::new(LocalProvider::new(
        settings,
        config.general.resolved_export_dir(),
    ));
    tracing::info!(pid = %collector.pid(), dir = %provider.export_dir().display(), "sampling started");
    let sampler = provider.start(collector, interval, capacity);
    Ok(Feed { provider, sampler })
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(dir) = &cli.export_dir {
        config.general.export_dir = Some(dir.clone());
    }
    if cli.no_open {
        config.general.open_exports = false;
    }

    tracing::debug!(path = ?config::config_path(), "configuration loaded");
    config
}

fn init_logging(path: &Path, level: &str) -> Result<()> {
    let level: tracing::Level = level
        .parse()
        .map_err(|_| eyre!("invalid --log-level `{level}`"))?;
    let file = std::fs::File::create(path)
        .wrap_err_with(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}
