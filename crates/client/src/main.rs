// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! courier-console: interactive terminal client for the Courier chat
//! service.
//!
//! Connects, prints incoming chat traffic through tracing, and forwards
//! stdin lines as chat messages. Ctrl-C or `/quit` closes cleanly.

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use courier::{ChatClient, ChatEvent, ClientConfig, EventKind, Identity, UserType};

/// courier-console: terminal client for the Courier chat service
#[derive(Parser, Debug)]
#[command(name = "courier-console")]
#[command(about = "Interactive terminal client for the Courier chat service")]
struct Args {
    /// WebSocket endpoint of the chat server
    #[arg(long, env = "COURIER_URL", default_value = "ws://localhost:8090/chat")]
    url: String,

    /// Identifier to authenticate as
    #[arg(long, default_value = "console")]
    user: String,

    /// Connect as an agent instead of a user
    #[arg(long)]
    agent: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ClientConfig {
        url: args.url.clone(),
        ..ClientConfig::default()
    };
    let client = ChatClient::new(config);

    let _ = client.on(EventKind::Connected, |_| info!("connected"));
    let _ = client.on(EventKind::Disconnected, |event| {
        if let ChatEvent::Disconnected { clean } = event {
            info!(clean, "disconnected");
        }
    });
    let _ = client.on(EventKind::ReconnectFailed, |event| {
        if let ChatEvent::ReconnectFailed { attempts } = event {
            warn!(attempts, "gave up reconnecting");
        }
    });
    let _ = client.on(EventKind::ChatStatus, |event| {
        if let ChatEvent::ChatStatus {
            chat_id,
            status,
            agent_id,
            ..
        } = event
        {
            info!(%chat_id, %status, agent = agent_id.as_deref(), "chat status");
        }
    });
    let _ = client.on(EventKind::MessageReceived, |event| {
        if let ChatEvent::MessageReceived { message } = event {
            let sender = message.sender_id.as_deref().unwrap_or("server");
            info!("{sender}: {}", message.text);
        }
    });
    let _ = client.on(EventKind::ChatEnded, |event| {
        if let ChatEvent::ChatEnded { chat_id } = event {
            info!(%chat_id, "chat ended");
        }
    });
    let _ = client.on(EventKind::AgentStatus, |event| {
        if let ChatEvent::AgentStatus { status, agent_id } = event {
            info!(%status, agent = agent_id.as_deref(), "agent status");
        }
    });
    let _ = client.on(EventKind::ServerError, |event| {
        if let ChatEvent::ServerError { message } = event {
            warn!(%message, "server error");
        }
    });

    let user_type = if args.agent {
        UserType::Agent
    } else {
        UserType::User
    };
    info!(url = %args.url, user = %args.user, "connecting");
    client.connect(Identity::new(&args.user, user_type))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim() == "/quit" => break,
                    Some(line) if !line.trim().is_empty() => {
                        client.send_chat_message(line.trim(), Vec::new())?;
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }

    client.disconnect()?;
    client.shutdown().await;
    Ok(())
}
