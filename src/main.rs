mod app;
mod config;
mod dom;
mod input;
mod storage;
mod system;
mod theme;

use anyhow::Context;
use app::controller::{THEME_CHANGED_EVENT, TOGGLE_CLASS};
use app::events::{Event, InputEvent};
use clap::{Parser, Subcommand};
use storage::{MemoryStore, PreferenceStore, Storage};
use std::time::Duration;
use system::{ColorSchemeSource, SystemColorScheme};
use tokio::sync::mpsc;

#[derive(Debug, Parser)]
#[command(name = "themeswitch", version, about = "Light/dark page theme switcher")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Override where the OS color scheme comes from.
    #[arg(long, value_enum)]
    system: Option<ColorSchemeSource>,

    /// Keep the preference in memory instead of the SQLite store.
    #[arg(long)]
    ephemeral: bool,

    /// Debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load the page, then read commands from stdin (default).
    Run,
    /// Load the page and print its theme state.
    Status,
    /// Load the page, click the toggle once and print the result.
    Toggle,
    /// Delete the stored preference so the page follows the OS again.
    Forget,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    let mut store: Box<dyn PreferenceStore> = if cli.ephemeral {
        Box::new(MemoryStore::new())
    } else {
        Box::new(Storage::open(&cfg.storage.path).context("open preference store")?)
    };

    let source = cli.system.unwrap_or(cfg.system.color_scheme);
    let page_app = |store: Box<dyn PreferenceStore>| {
        let scheme = source.into_scheme();
        let mut app = app::App::new(&cfg, store, scheme);
        app.document_mut()
            .add_event_listener(THEME_CHANGED_EVENT, |e| println!("{} {}", e.name, e.detail));
        app.start();
        app
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let mut app = page_app(store);
            let (tx, rx) = mpsc::channel(64);
            if source == ColorSchemeSource::Auto {
                let period = Duration::from_millis(cfg.system.poll_interval_ms.max(50));
                system::spawn_color_scheme_task(tx.clone(), SystemColorScheme, period);
            }
            input::spawn_input_task(tx);
            app.run(rx).await;
        }
        Command::Status => println!("{}", page_app(store).status()),
        Command::Toggle => {
            let mut app = page_app(store);
            let _ = app.handle_event(Event::Input(InputEvent::Click {
                class: TOGGLE_CLASS.to_string(),
            }));
            println!("{}", app.status());
        }
        Command::Forget => {
            app::forget_preference(store.as_mut()).context("forget preference")?;
            println!("Cleared stored theme preference.");
        }
    }

    Ok(())
}
