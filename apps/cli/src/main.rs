#![deny(warnings)]

//! Terminal strategizer for the disaster relief supply game.
//!
//! Reads commands from stdin (or `--script`), settles rounds, and prints the
//! round table with competitor forecasts and a suggested order after each one.

mod command;
mod config;
mod render;

use anyhow::{Context, Result};
use command::{Command, HELP};
use relief_runtime::{Presenter, Session, SessionError, SessionEvent};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    script: Option<PathBuf>,
    json: bool,
    version: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--script" => args.script = it.next().map(PathBuf::from),
            "--json" => args.json = true,
            "--version" | "-V" => args.version = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

/// Feed every command from `input` through the session.
///
/// Bad lines and failed session events are reported on `err` and skipped;
/// the ledger is left untouched. Help and round cards go to `out`. Only
/// input and output failures end the loop early.
fn run_commands<R: BufRead, W: Write, E: Write>(
    input: R,
    session: &mut Session,
    presenter: &mut dyn Presenter,
    mut out: W,
    mut err: E,
) -> Result<()> {
    for (lineno, line) in input.lines().enumerate() {
        let line = line.context("reading input")?;
        let cmd = match command::parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = lineno + 1, error = %e, "rejected input");
                writeln!(err, "error: {e}")?;
                continue;
            }
        };
        let outcome = match cmd {
            Command::Round(round) => session.dispatch(SessionEvent::NewRound(round), presenter),
            Command::Reset => session.dispatch(SessionEvent::Reset, presenter),
            Command::Show => session
                .snapshot()
                .map_err(anyhow::Error::from)
                .and_then(|snap| presenter.present(&snap)),
            Command::Cards(round) => {
                write_cards(session, round, &mut out, &mut err)?;
                Ok(())
            }
            Command::Help => {
                writeln!(out, "{HELP}")?;
                Ok(())
            }
            Command::Quit => break,
        };
        if let Err(e) = outcome {
            match e.downcast_ref::<SessionError>() {
                Some(se) => {
                    warn!(line = lineno + 1, error = %se, "event not applied");
                    writeln!(err, "error: {se}")?;
                }
                None => return Err(e),
            }
        }
    }
    Ok(())
}

fn write_cards(
    session: &Session,
    round: Option<u32>,
    mut out: impl Write,
    mut err: impl Write,
) -> std::io::Result<()> {
    match round {
        Some(n) => match session.ledger().get(n) {
            Some(record) => write!(out, "{}", render::render_cards(record)),
            None => writeln!(err, "error: round {n} not recorded"),
        },
        None if session.ledger().is_empty() => writeln!(out, "No rounds recorded."),
        None => {
            for record in session.ledger().all() {
                write!(out, "{}", render::render_cards(record))?;
            }
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    if args.version {
        println!(
            "relief-cli {} ({}, {} build)",
            env!("CARGO_PKG_VERSION"),
            env!("RELIEF_GIT_DESCRIBE"),
            env!("RELIEF_BUILD_PROFILE")
        );
        return Ok(());
    }
    info!(config = ?args.config, script = ?args.script, json = args.json, "starting CLI");

    let cfg = config::load_config(args.config.as_deref())?;
    let mut session = Session::new(cfg)?;

    let stdout = std::io::stdout();
    let mut presenter: Box<dyn Presenter> = if args.json {
        Box::new(render::JsonPresenter::new(stdout.lock()))
    } else {
        println!("{}", render::assumptions_banner(session.config()));
        Box::new(render::TablePresenter::new(stdout.lock()))
    };

    match &args.script {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening script {}", path.display()))?;
            run_commands(
                BufReader::new(file),
                &mut session,
                presenter.as_mut(),
                std::io::stdout(),
                std::io::stderr(),
            )
        }
        None => run_commands(
            std::io::stdin().lock(),
            &mut session,
            presenter.as_mut(),
            std::io::stdout(),
            std::io::stderr(),
        ),
    }
}
