//! AI Factory studio - line-oriented terminal workspace.
//!
//! This is the entry point for the `aifactory` binary.

use std::io::IsTerminal;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use aifactory_client::{ApiClient, ClientConfig};
use aifactory_core::{ConversationKey, Mode};
use aifactory_studio::command::HELP;
use aifactory_studio::workspace::DEFAULT_MODEL;
use aifactory_studio::{render, Command, GenerationOutcome, Settings, Studio, StudioError};

/// AI Factory studio - chat with the backend about your project files.
#[derive(Parser, Debug)]
#[command(name = "aifactory")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend URL.
    #[arg(long, env = "AIFACTORY_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// API key sent as X-API-Key.
    #[arg(long, env = "AIFACTORY_API_KEY", default_value = "")]
    api_key: String,

    /// Model used for generations.
    #[arg(long, env = "AIFACTORY_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Start in planning or act mode.
    #[arg(long, default_value = "planning")]
    mode: Mode,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,
}

/// A finished background generation and the conversation it belongs to.
type Finished = (ConversationKey, GenerationOutcome);

/// Style markdown only when printing to a terminal.
fn color() -> bool {
    std::io::stdout().is_terminal()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.debug {
        tracing_subscriber::fmt()
            .with_env_filter("aifactory_studio=debug,aifactory_client=debug,warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let client = ApiClient::new(ClientConfig::new(&args.api_url, &args.api_key))?;
    let settings = Settings {
        model: args.model,
        mode: args.mode,
        ..Settings::default()
    };
    let studio = Studio::new(client, settings);

    studio.refresh_status().await;
    if let Some(status) = &studio.workspace().lock().status {
        println!(
            "Connected to {} ({}, {} tokens used)",
            args.api_url, status.project_dir, status.total_tokens
        );
    }
    println!("Type /help for commands.");

    run_loop(&studio).await
}

/// Read commands from stdin while generations run in the background.
async fn run_loop(studio: &Studio) -> anyhow::Result<()> {
    let (done_tx, mut done_rx) = mpsc::channel::<Finished>(16);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => {
                        if let Err(e) = execute(studio, command, &done_tx).await {
                            eprintln!("error: {e}");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            Some((key, outcome)) = done_rx.recv() => {
                let ws = studio.workspace().lock();
                if ws.active_key() == key {
                    println!("{}", render::conversation(&ws, color()));
                } else if outcome.is_completed() {
                    println!("(reply ready in {key})");
                }
                if let GenerationOutcome::Failed { error, .. } = &outcome {
                    eprintln!("generation failed: {error}");
                }
            }
        }
    }

    if studio.workspace().lock().is_generating() {
        tracing::info!("Exiting with generations still running");
    }
    Ok(())
}

async fn execute(
    studio: &Studio,
    command: Command,
    done_tx: &mpsc::Sender<Finished>,
) -> Result<(), StudioError> {
    match command {
        Command::Send(prompt) => {
            studio.workspace().lock().prompt = prompt;
            spawn_generation(studio, done_tx)?;
        }
        Command::SendAttachments => spawn_generation(studio, done_tx)?,
        Command::Open(path) => {
            studio.open_file(&path).await?;
            println!("{}", render::conversation(&studio.workspace().lock(), color()));
        }
        Command::Close(path) => {
            let path = match path {
                Some(path) => path,
                None => studio
                    .workspace()
                    .lock()
                    .active_path()
                    .map(str::to_string)
                    .ok_or(StudioError::NoActiveFile)?,
            };
            studio.close_file(&path)?;
        }
        Command::Switch(path) => {
            studio.switch_to(&path)?;
            println!("{}", render::conversation(&studio.workspace().lock(), color()));
        }
        Command::Global => {
            studio.switch_global();
            println!("{}", render::conversation(&studio.workspace().lock(), color()));
        }
        Command::Tabs => println!("{}", render::tabs(&studio.workspace().lock())),
        Command::Files => {
            studio.refresh_status().await;
            let ws = studio.workspace().lock();
            match &ws.status {
                Some(status) => println!("{}", status.files.join("\n")),
                None => println!("(status unavailable)"),
            }
        }
        Command::Edit(source) => studio.edit_from(&source).await?,
        Command::Save => {
            if !studio.save_active().await? {
                eprintln!("save refused, see /log");
            }
        }
        Command::Target(path) => {
            let target = studio.set_target(&path);
            println!("Target: {target}");
        }
        Command::Copy(dest) => {
            if !studio.copy_chat(dest.as_deref()).await? {
                println!("(nothing to copy)");
            }
        }
        Command::Attach(source) => studio.attach(&source).await?,
        Command::Detach => studio.workspace().lock().clear_attachments(),
        Command::SetMode(mode) => {
            studio.workspace().lock().settings.mode = mode;
            println!("Mode: {}", mode.as_str());
        }
        Command::Model(Some(model)) => studio.set_model(&model).await?,
        Command::Model(None) => println!("{}", studio.workspace().lock().settings.model),
        Command::Models => {
            let current = studio.workspace().lock().settings.model.clone();
            for model in studio.models().await? {
                let marker = if model.id == current { '*' } else { ' ' };
                println!("{marker} {} ({})", model.id, model.name);
            }
        }
        Command::Status => {
            studio.refresh_status().await;
            let ws = studio.workspace().lock();
            match &ws.status {
                Some(s) => println!(
                    "project: {}\nmodel: {}\ntokens: {}\nfiles: {}",
                    s.project_dir,
                    s.model,
                    s.total_tokens,
                    s.files.len()
                ),
                None => println!("(status unavailable)"),
            }
        }
        Command::Apply => {
            let (key, id) = latest_preview(studio)?;
            studio.review().apply(&key, id).await?;
            println!("{}", render::conversation(&studio.workspace().lock(), color()));
        }
        Command::Discard => {
            let (key, id) = latest_preview(studio)?;
            studio.review().discard(&key, id)?;
            println!("{}", render::conversation(&studio.workspace().lock(), color()));
        }
        Command::Show => println!("{}", render::conversation(&studio.workspace().lock(), color())),
        Command::Log => println!("{}", render::activity(studio.workspace().lock().activity())),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

/// Start a generation for the active conversation without blocking input.
fn spawn_generation(studio: &Studio, done_tx: &mpsc::Sender<Finished>) -> Result<(), StudioError> {
    let orchestrator = studio.orchestrator();
    let prepared = orchestrator.prepare()?;
    let key = prepared.route().key().clone();
    println!("{}", render::conversation(&studio.workspace().lock(), color()));

    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let outcome = orchestrator.run(prepared).await;
        if done_tx.send((key, outcome)).await.is_err() {
            tracing::debug!("Command loop gone; dropping generation outcome");
        }
    });
    Ok(())
}

fn latest_preview(
    studio: &Studio,
) -> Result<(ConversationKey, aifactory_core::MessageId), StudioError> {
    let ws = studio.workspace().lock();
    let key = ws.active_key();
    let id = ws
        .latest_preview(&key)
        .ok_or_else(|| StudioError::InvalidCommand("no pending change to review".to_string()))?;
    Ok((key, id))
}
