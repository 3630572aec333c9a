use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feed_client::render::{render_json, render_text};
use feed_client::{
    ChannelNotifier, Config, FeedSession, FeedState, ImageUpload, LogNotifier, Notice, NoticeLevel,
    Notifier, PostDraft, PostId,
};

#[derive(Parser, Debug)]
#[command(name = "feed-client", version, about = "Photo feed client for the image gateway")]
struct Cli {
    /// Gateway base URL (overrides GATEWAY_URL)
    #[arg(long, global = true)]
    gateway_url: Option<String>,

    /// Print the feed as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and print the feed
    Feed,
    /// Upload an image with a caption
    Post { image: PathBuf, caption: String },
    /// Comment on a post
    Comment { post_id: String, text: String },
    /// Check that the gateway answers
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let mut config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},hyper=warn,reqwest=warn", config.app.log_level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();
    if let Some(url) = cli.gateway_url {
        config.gateway.base_url = url;
    }

    tracing::info!(
        "Starting feed-client v{} ({})",
        env!("CARGO_PKG_VERSION"),
        config.app.env
    );

    // JSON output is for machines: notices go to the structured log instead.
    let (notifier, notices) = if cli.json {
        (Arc::new(LogNotifier) as Arc<dyn Notifier>, None)
    } else {
        let (notifier, notices) = ChannelNotifier::new();
        (Arc::new(notifier) as Arc<dyn Notifier>, Some(notices))
    };
    let session = FeedSession::connect(&config, notifier)?;

    let outcome = run(&session, cli.command, cli.json).await;
    session.shutdown();
    if let Some(mut notices) = notices {
        drain_notices(&mut notices);
    }
    outcome
}

async fn run(session: &FeedSession, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Ping => {
            let healthy = session.health().await?;
            println!("{}", if healthy { "gateway is up" } else { "gateway is down" });
            if !healthy {
                anyhow::bail!("gateway did not answer");
            }
        }
        Command::Feed => {
            let state = session.load_feed().await?;
            print_feed(&state, json)?;
        }
        Command::Post { image, caption } => {
            let upload = ImageUpload::from_path(&image)
                .await
                .with_context(|| format!("Failed to read {}", image.display()))?;
            let id = session.add_post(PostDraft::new(upload, caption)).await?;
            tracing::info!(post_id = %id, "Post submitted");
            print_feed(&session.snapshot(), json)?;
        }
        Command::Comment { post_id, text } => {
            let post_id: PostId = post_id.parse()?;
            session.load_feed().await?;
            session.add_comment(&post_id, &text).await?;
            print_feed(&session.snapshot(), json)?;
        }
    }
    Ok(())
}

fn print_feed(state: &FeedState, json: bool) -> Result<()> {
    if json {
        println!("{}", render_json(state)?);
    } else {
        print!("{}", render_text(state));
    }
    Ok(())
}

fn drain_notices(notices: &mut UnboundedReceiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        let level = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        match notice.description {
            Some(description) => eprintln!("[{level}] {}: {description}", notice.title),
            None => eprintln!("[{level}] {}", notice.title),
        }
    }
}
