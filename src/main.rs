mod api;
mod app;
mod auth;
mod command;
mod config;
mod error;
mod event;
mod github;
mod list;
mod markdown;
mod message;
mod tui;
mod types;
mod ui;
mod update;
mod viewport;

use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::Model;
use crate::command::{Command, Context};
use crate::config::Config;
use crate::error::TriageError;
use crate::github::GitHub;
use crate::message::Message;
use crate::tui::{EventHandler, Tui};

#[derive(Parser, Debug)]
#[command(name = "triage")]
#[command(about = "Triage GitHub notifications from the terminal")]
struct Args {
    /// Config file (default: ~/.config/triage/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with the list filtered to repositories containing TEXT
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Write debug logs here instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<(), TriageError> {
    let default_level = if log_file.is_some() { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    TriageError::Config(format!("opening log file {}: {}", path.display(), e))
                })?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    // Fatal setup errors surface before the terminal is taken over
    let config = Config::load(args.config.as_deref())?;
    let token = auth::load_token()?;
    let github = GitHub::new(token)?;
    let ctx = Context::new(Arc::new(github), config);

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, ctx, Model::new(args.search)).await;
    tui::restore()?;

    result
}

/// Hand a command to its own task; its message, if any, comes back on `tx`.
fn spawn(ctx: &Context, tx: &mpsc::UnboundedSender<Message>, command: Command) {
    let ctx = ctx.clone();
    let tx = tx.clone();
    tracing::debug!(?command, "spawning command");
    tokio::spawn(async move {
        if let Some(msg) = command.run(&ctx).await {
            tx.send(msg).ok();
        }
    });
}

async fn run(
    terminal: &mut Tui,
    ctx: Context,
    mut model: Model,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let mut events = EventHandler::new();

    spawn(&ctx, &tx, Command::GetDimensions);
    terminal.draw(|frame| ui::render(frame, &model, &ctx.config.theme))?;

    loop {
        let msg = tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }
                Message::from(event)
            }
            Some(msg) = rx.recv() => msg,
            else => break,
        };

        let (next, commands) = update::update(&ctx, model, msg);
        model = next;

        let mut quit = false;
        for command in commands {
            if command == Command::Quit {
                quit = true;
            } else {
                spawn(&ctx, &tx, command);
            }
        }
        if quit {
            break;
        }

        terminal.draw(|frame| ui::render(frame, &model, &ctx.config.theme))?;
    }

    Ok(())
}
