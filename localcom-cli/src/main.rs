use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use localcom_client::{
    CallState, ClientError, Controller, ControllerConfig, ControllerHandle, ControllerUpdate,
    JsonFileStore, LinkState, RelayLink, RtcBackend, RtcBackendConfig, engine_channel,
};
use localcom_core::utils::DEFAULT_WS_PATH;
use localcom_core::{ChatRecord, ChatSender};
use localcom_relay::{DEFAULT_PORT, RelayConfig};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "localcom")]
#[command(about = "Two-peer audio and chat over a WebSocket signaling relay")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Relay(RelayArgs),
    /// Join a relay as an interactive peer.
    Peer(PeerArgs),
}

#[derive(Args, Debug)]
struct RelayArgs {
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(long, default_value = DEFAULT_WS_PATH)]
    path: String,
}

#[derive(Args, Debug)]
struct PeerArgs {
    #[arg(long, default_value = "ws://127.0.0.1:3000/api/ws")]
    url: String,

    /// File holding the chat history.
    #[arg(long, default_value = "localcom-history.json")]
    history: PathBuf,

    /// Do not capture the microphone; calls fail with a media error.
    #[arg(long)]
    no_audio: bool,

    /// STUN server URL, repeatable. Defaults to public STUN servers.
    #[arg(long)]
    stun: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Relay(args) => run_relay(args).await,
        Commands::Peer(args) => run_peer(args).await,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_relay(args: RelayArgs) -> Result<()> {
    let config = RelayConfig::from_env()
        .with_bind(SocketAddr::new(args.host, args.port))
        .with_ws_path(args.path);

    localcom_relay::serve(config, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl-C received, shutting down");
    })
    .await
}

async fn run_peer(args: PeerArgs) -> Result<()> {
    let store = Arc::new(
        JsonFileStore::open(&args.history)
            .await
            .with_context(|| format!("Failed to open {}", args.history.display()))?,
    );
    let backend = Arc::new(RtcBackend::new(
        RtcBackendConfig {
            audio_input: !args.no_audio,
            ..Default::default()
        }
        .with_stun(args.stun),
    ));

    let (events_tx, events_rx) = engine_channel();
    let link = Arc::new(RelayLink::spawn(&args.url, events_tx.clone()));

    let (mut controller, updates) = Controller::new(
        ControllerConfig::default(),
        backend,
        store,
        link.clone(),
        events_tx,
    );
    controller.load_history().await?;

    let handle = controller.spawn(events_rx);
    let printer = tokio::spawn(print_updates(updates));

    println!(
        "{}",
        "Commands: /call, /hangup, /quit. Anything else is sent as chat.".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&handle, line.trim()).await {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.shutdown().await;
    link.close();
    printer.abort();
    Ok(())
}

/// Returns false when the user asked to quit.
async fn handle_line(handle: &ControllerHandle, line: &str) -> bool {
    let result = match line {
        "" => return true,
        "/quit" => return false,
        "/call" => handle.start_call().await,
        "/hangup" => handle.hang_up().await,
        text => handle.send_chat(text).await.map(|_| ()),
    };

    match result {
        Ok(()) => true,
        Err(ClientError::ControllerGone) => false,
        Err(e) => {
            println!("{} {}", "!".red().bold(), e);
            true
        }
    }
}

async fn print_updates(mut updates: mpsc::UnboundedReceiver<ControllerUpdate>) {
    while let Some(update) = updates.recv().await {
        match update {
            ControllerUpdate::History(records) => {
                if !records.is_empty() {
                    println!("{}", format!("-- {} earlier messages --", records.len()).dimmed());
                }
                records.iter().for_each(print_record);
            }
            ControllerUpdate::Link(state) => {
                let label = match state {
                    LinkState::Connected => "relay connected".green(),
                    LinkState::Connecting => "relay connecting".yellow(),
                    LinkState::Disconnected => "relay disconnected".red(),
                };
                println!("* {}", label);
            }
            ControllerUpdate::Call(state) => {
                let label = match state {
                    CallState::Idle => "idle".normal(),
                    CallState::Calling => "calling".yellow(),
                    CallState::InCall => "in call".green().bold(),
                };
                println!("* call {}", label);
            }
            ControllerUpdate::ChatAvailable(open) => {
                if open {
                    println!("* {}", "chat open".green());
                } else {
                    println!("* {}", "chat closed".dimmed());
                }
            }
            ControllerUpdate::Chat(record) => print_record(&record),
            ControllerUpdate::Notice(notice) => println!("{} {}", "!".yellow().bold(), notice),
        }
    }
}

fn print_record(record: &ChatRecord) {
    let who = match record.sender {
        ChatSender::Local => "you".cyan(),
        ChatSender::Remote => "peer".magenta(),
    };
    println!("[{}] {}: {}", record.send_time.dimmed(), who, record.text);
}
