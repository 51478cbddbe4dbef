mod app;
mod config;
mod constants;
mod download;
mod input;
mod preview;
mod resolver;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::App;
use config::{Config, Settings};
use constants::constants;
use resolver::HttpResolver;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Media Resolution Service endpoint (overrides the config file)
  #[arg(long)]
  endpoint: Option<String>,

  /// Request timeout in seconds (overrides the config file)
  #[arg(long)]
  timeout_secs: Option<u64>,

  /// Directory downloads are saved into (overrides the config file)
  #[arg(long)]
  download_dir: Option<PathBuf>,
}

// --- Logging ---

/// File logging under the project cache dir. The TUI owns the terminal, so
/// diagnostics never go to stdout/stderr. Returns the non-blocking writer
/// guard, which must stay alive for the process lifetime.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let proj_dirs = directories::ProjectDirs::from("", "", "gramgrab")?;
  let log_dir = proj_dirs.cache_dir().join("logs");
  std::fs::create_dir_all(&log_dir).ok()?;

  let appender = tracing_appender::rolling::daily(log_dir, "gramgrab.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,gramgrab=debug"));
  tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(writer).with_ansi(false).init();
  Some(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _log_guard = init_logging();

  let config = Config::load();
  let settings = Settings::resolve(&config, args.endpoint, args.timeout_secs, args.download_dir);
  info!(endpoint = %settings.endpoint, timeout_secs = settings.timeout.as_secs(), "starting gramgrab");

  let resolver = Arc::new(HttpResolver::new(&settings)?);
  // Separate client for media fetches (previews, downloads): same identity,
  // but no overall deadline — large videos may legitimately take a while.
  let http = reqwest::Client::builder()
    .user_agent(constants().user_agent.clone())
    .connect_timeout(Duration::from_secs(constants().connect_timeout_secs))
    .build()?;

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, App::new(resolver, http, settings)).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
  loop {
    app.check_pending();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key);
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }
  Ok(())
}
