use std::io::Write as _;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use mapleframe::{
    Compositor, FnSink, HistorySnapshot, HistoryWalker, MapleError, NexonClient, Pose, RenderJob,
    Settings, WalkOptions, search_character,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mapleframe", version)]
struct Cli {
    /// Settings JSON; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Open API key; overrides the settings file.
    #[arg(long, global = true, env = "NEXON_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON render job to PNG.
    Render(RenderArgs),
    /// Look a character up and print its appearance as JSON.
    Search(SearchArgs),
    /// Stream a character's distinct past appearances as JSON lines.
    History(HistoryArgs),
    /// Serve the same-origin image proxy.
    Proxy(ProxyArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Render job JSON.
    #[arg(long)]
    job: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SearchArgs {
    /// Character name.
    #[arg(long)]
    name: String,

    /// Facial expression code.
    #[arg(long, default_value = "E00")]
    emotion: String,
}

#[derive(Parser, Debug)]
struct HistoryArgs {
    /// Character name.
    #[arg(long)]
    name: String,

    /// Maximum snapshots to emit.
    #[arg(long)]
    cap: Option<usize>,

    /// Oldest date to visit (YYYY-MM-DD).
    #[arg(long)]
    boundary: Option<NaiveDate>,
}

#[derive(Parser, Debug)]
struct ProxyArgs {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:8787")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = match &cli.config {
        Some(path) => Settings::from_path(path)
            .with_context(|| format!("load settings '{}'", path.display()))?,
        None => Settings::default(),
    };
    if cli.api_key.is_some() {
        settings.api_key = cli.api_key.clone();
    }

    match cli.cmd {
        Command::Render(args) => cmd_render(&settings, args).await,
        Command::Search(args) => cmd_search(&settings, args).await,
        Command::History(args) => cmd_history(&settings, args).await,
        Command::Proxy(args) => cmd_proxy(&settings, args).await,
    }
}

async fn cmd_render(settings: &Settings, args: RenderArgs) -> anyhow::Result<()> {
    let job = RenderJob::from_path(&args.job)
        .with_context(|| format!("load job '{}'", args.job.display()))?;
    let compositor = Compositor::from_settings(settings).await?;
    let image = job.render(&compositor).await?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image
        .save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} ({}x{})", args.out.display(), image.width, image.height);
    Ok(())
}

async fn cmd_search(settings: &Settings, args: SearchArgs) -> anyhow::Result<()> {
    let client = NexonClient::from_settings(settings)?;
    let appearance = search_character(&client, &args.name, &Pose::with_emotion(args.emotion))
        .await
        .with_context(|| format!("search '{}'", args.name))?;
    println!("{}", serde_json::to_string_pretty(&appearance)?);
    Ok(())
}

async fn cmd_history(settings: &Settings, args: HistoryArgs) -> anyhow::Result<()> {
    let client = NexonClient::from_settings(settings)?;
    let mut options = WalkOptions::from_settings(&settings.walk);
    if let Some(cap) = args.cap {
        options.cap = cap;
    }
    if let Some(boundary) = args.boundary {
        options.boundary = boundary;
    }
    let walker = HistoryWalker::new(Arc::new(client), options);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping walk");
            on_ctrl_c.cancel();
        }
    });

    let stdout = std::io::stdout();
    let mut sink = FnSink(move |snapshot: HistorySnapshot| -> Result<(), MapleError> {
        let line = serde_json::to_string(&snapshot)?;
        let mut out = stdout.lock();
        writeln!(out, "{line}")
            .and_then(|()| out.flush())
            .map_err(|e| MapleError::Other(e.into()))
    });
    let report = walker
        .walk(&args.name, &mut sink, &cancel)
        .await
        .with_context(|| format!("history for '{}'", args.name))?;

    eprintln!("{}", serde_json::to_string(&report)?);
    Ok(())
}

async fn cmd_proxy(settings: &Settings, args: ProxyArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(settings.request_timeout())
        .build()
        .context("build HTTP client")?;
    mapleframe::proxy::serve(args.bind, mapleframe::proxy::router(client), async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;
    Ok(())
}
