//! Chatline terminal client
//!
//! Connects to the chat backend, opens a conversation and sends every stdin
//! line as a message. `/join <id>` switches conversation, `/leave` closes it,
//! `/quit` exits.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::time::Duration;

use anyhow::{Context, anyhow};
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use chatline::api::HttpMessageApi;
use chatline::config::{ClientConfig, LogConfig};
use chatline::domain::Conversation;
use chatline::transport::ws;
use chatline::view::Severity;
use chatline::{ChatView, ViewOptions, ViewUpdate};

enum Step {
    Line(Option<String>),
    Update(ViewUpdate),
    Alive(bool),
    Quit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = ClientConfig::load().context("failed to load configuration")?;
    init_tracing(&config.log);

    let identity = config
        .auth
        .identity()
        .ok_or_else(|| anyhow!("auth.token and auth.user_id are required"))?;
    let backend = HttpMessageApi::from_config(&config.api).context("invalid api.base_url")?;

    let link = ws::connect(&config.realtime.url)
        .await
        .with_context(|| format!("failed to connect to {}", config.realtime.url))?;

    let (mut view, mut updates) =
        ChatView::mount(link, identity, backend, ViewOptions::from(&config));

    let connect_timeout = Duration::from_secs(config.realtime.connect_timeout_secs);
    if view.wait_connected(connect_timeout).await {
        info!(name: "chat.client.ready", "Connected");
    } else {
        warn!(name: "chat.client.not_acknowledged", "No connected acknowledgment yet; sending is disabled");
    }

    if let Some(id) = &config.chat.conversation {
        // failures already surfaced as a notice
        let _ = view
            .select_conversation(Some(Conversation::new(id.as_str())))
            .await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let step = tokio::select! {
            line = lines.next_line() => Step::Line(line.context("failed to read stdin")?),
            Some(update) = updates.recv() => Step::Update(update),
            alive = view.process_next() => Step::Alive(alive),
            _ = tokio::signal::ctrl_c() => Step::Quit,
        };

        match step {
            Step::Line(None) | Step::Quit | Step::Alive(false) => break,
            Step::Alive(true) => {}
            Step::Update(update) => render(&update),
            Step::Line(Some(line)) => {
                let line = line.trim();
                if line == "/quit" {
                    break;
                } else if line == "/leave" {
                    let _ = view.select_conversation(None).await;
                } else if let Some(id) = line.strip_prefix("/join ") {
                    let _ = view
                        .select_conversation(Some(Conversation::new(id.trim())))
                        .await;
                } else {
                    view.input(line);
                    let _ = view.submit().await;
                }
            }
        }

        while let Ok(update) = updates.try_recv() {
            render(&update);
        }
    }

    view.close();
    Ok(())
}

fn render(update: &ViewUpdate) {
    match update {
        ViewUpdate::MessageAppended(message) => {
            println!(
                "[{}] {}: {}",
                message.created_at.format("%H:%M"),
                message.sender_id,
                message.content
            );
        }
        ViewUpdate::HistoryLoaded {
            conversation_id,
            count,
        } => println!("-- {conversation_id}: {count} messages --"),
        ViewUpdate::Notice(notice) => {
            let tag = match notice.severity {
                Severity::Warning => "warning",
                Severity::Error => "error",
            };
            eprintln!("{tag}: {} {}", notice.title, notice.description);
        }
        ViewUpdate::PeerTyping(true) => println!("(typing...)"),
        ViewUpdate::PeerTyping(false) => {}
        ViewUpdate::RefreshConversations => println!("(new message in another conversation)"),
        ViewUpdate::Connection(state) => info!(name: "chat.client.connection", state = ?state, "Connection state changed"),
    }
}

/// Initialize tracing (M-LOG-STRUCTURED)
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if log.format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
