//! CLI reference driver: connect to a room's chat and print decoded events.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chat_client::{ChatClient, ClientConfig};
use chat_protocol::{ChatEvent, EventKind};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chat-client", about = "Reference client for a live chat room")]
struct Args {
    /// Room identifier (the same value the web UI uses to open the room).
    room_id: String,

    /// Skip TLS certificate verification on the chat WebSocket.
    #[arg(long)]
    insecure_tls: bool,

    /// Keepalive PING interval, in seconds.
    #[arg(long)]
    keepalive_secs: Option<u64>,

    /// Optional TOML config file; CLI flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match ClientConfig::load_from_path(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = %e, "failed to load config file");
                return ExitCode::from(2);
            }
        },
        None => ClientConfig::default(),
    };
    if args.insecure_tls {
        config.tls_insecure = true;
    }
    if let Some(secs) = args.keepalive_secs {
        config.keepalive_interval = Duration::from_secs(secs);
    }

    let mut client = ChatClient::new(config);
    for kind in [
        EventKind::Connect,
        EventKind::EnterChatRoom,
        EventKind::Chat,
        EventKind::Notification,
        EventKind::TextDonation,
        EventKind::VideoDonation,
        EventKind::AdBalloonDonation,
        EventKind::Emoticon,
        EventKind::Disconnect,
    ] {
        client.subscribe(kind, print_event);
    }

    tokio::select! {
        result = client.run(&args.room_id) => {
            match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "session ended with an error");
                    if e.kind_tag() == "not_live" {
                        ExitCode::from(1)
                    } else {
                        ExitCode::from(2)
                    }
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, closing session");
            client.close();
            ExitCode::from(130)
        }
    }
}

fn print_event(event: &ChatEvent) {
    match event {
        ChatEvent::Chat { comment, username, .. } => println!("[chat] {username}: {comment}"),
        ChatEvent::Connect { username, .. } => println!("[connect] joined as {username}"),
        ChatEvent::EnterChatRoom { streamer_id, .. } => println!("[room] entered {streamer_id}'s chat room"),
        ChatEvent::Notification { text, .. } => println!("[notice] {text}"),
        ChatEvent::TextDonation { donation, .. } => {
            println!("[donation] {} -> {}: {}", donation.sender_name, donation.recipient, donation.amount)
        }
        ChatEvent::VideoDonation { donation, .. } => {
            println!("[video donation] {} -> {}: {}", donation.sender_name, donation.recipient, donation.amount)
        }
        ChatEvent::AdBalloonDonation { donation, .. } => {
            println!("[balloon] {} -> {}: {}", donation.sender_name, donation.recipient, donation.amount)
        }
        ChatEvent::Emoticon { username, emoticon_id, .. } => println!("[emoticon] {username}: {emoticon_id}"),
        ChatEvent::Disconnect { reason, error_kind, .. } => match error_kind {
            Some(kind) => println!("[disconnect] {reason} ({kind})"),
            None => println!("[disconnect] {reason}"),
        },
        _ => {}
    }
}
