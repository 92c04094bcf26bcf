use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mediarr_card::{CardEvent, CardVariant, MediarrCard, PlexClient};
use mediarr_proto::config::Settings;
use mediarr_proto::platform;
use mediarr_proto::state::{load_snapshot_file, SnapshotStore};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "mediarr", version, about = "Render and drive a Mediarr dashboard card")]
struct Cli {
    /// Card configuration (TOML). Defaults to the path in settings.
    #[arg(long, global = true)]
    card: Option<PathBuf>,

    /// Card variant: mediarr or emby. Defaults to the card's `type` key.
    #[arg(long, global = true)]
    variant: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write an example card configuration if none exists.
    Init,
    /// Bind one snapshot and print the card markup.
    Render {
        /// State snapshot (JSON). Defaults to the path in settings.
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Select an item before rendering, as `section:index`.
        #[arg(long)]
        select: Option<String>,
        /// Collapse these sections before rendering.
        #[arg(long)]
        collapse: Vec<String>,
    },
    /// Re-render to the output file whenever the snapshot file changes.
    Watch {
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the players connected to the configured Plex server.
    Clients,
    /// Start an item on a Plex player.
    Play {
        /// Machine identifier of the target player.
        #[arg(long)]
        client: String,
        /// Plex media key, e.g. /library/metadata/123.
        #[arg(long)]
        key: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = platform::log_path();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("mediarr log: {}", log_path.display());

    let cli = Cli::parse();
    let settings = Settings::load().unwrap_or_default();
    let card_path = cli.card.clone().unwrap_or_else(|| settings.paths.card_config.clone());
    let variant = parse_variant(cli.variant.as_deref())?;

    let plex = PlexClient::new(
        Duration::from_secs(settings.http.timeout_secs),
        Duration::from_secs(settings.http.connect_timeout_secs),
    )?;

    match cli.command {
        Command::Init => write_stub(&card_path, variant.unwrap_or_default())?,
        Command::Render {
            snapshot,
            select,
            collapse,
        } => {
            let mut card = load_card(&card_path, variant)?;
            let path = snapshot.unwrap_or_else(|| settings.paths.snapshot.clone());
            let snapshot = load_snapshot_file(&path)
                .await
                .with_context(|| format!("failed to read snapshot {}", path.display()))?;
            card.set_state(&snapshot);
            for key in &collapse {
                card.handle_event(CardEvent::ToggleSection {
                    section: key.clone(),
                });
            }
            if let Some(target) = select {
                let (section, index) = parse_selection(&target)?;
                if !card.select(section, index) {
                    bail!("unknown section: {section}");
                }
            }
            if let Some(html) = card.render_html() {
                println!("{html}");
            }
        }
        Command::Watch { snapshot, output } => {
            let snapshot_path = snapshot.unwrap_or_else(|| settings.paths.snapshot.clone());
            let output_path = output.unwrap_or_else(|| settings.paths.output.clone());
            let mut card = load_card(&card_path, variant)?;
            watch(
                &mut card,
                &snapshot_path,
                &output_path,
                Duration::from_millis(settings.watch.interval_ms),
            )
            .await?;
        }
        Command::Clients => {
            let card = load_card(&card_path, variant)?;
            let config = card.config();
            let (Some(url), Some(token)) = (config.server_url("plex"), config.plex_token()) else {
                bail!("plex_url and plex_token must be set in the card config");
            };
            let clients = plex.fetch_clients(url, token).await?;
            if clients.is_empty() {
                println!("No Available Clients");
            }
            for client in clients {
                println!(
                    "{}\t{}\t{} {}",
                    client.client_id, client.name, client.product, client.version
                );
            }
        }
        Command::Play { client, key } => {
            let card = load_card(&card_path, variant)?;
            let config = card.config();
            let (Some(url), Some(token)) = (config.server_url("plex"), config.plex_token()) else {
                bail!("plex_url and plex_token must be set in the card config");
            };
            plex.play_media(url, token, &client, &key).await?;
            println!("Playing {key} on {client}");
        }
    }

    Ok(())
}

/// Poll the snapshot file and re-render whenever its content changes.
async fn watch(
    card: &mut MediarrCard,
    snapshot_path: &Path,
    output_path: &Path,
    interval: Duration,
) -> anyhow::Result<()> {
    let store = SnapshotStore::new();
    let mut rendered_rev: Option<u64> = None;
    let mut ticker = tokio::time::interval(interval);
    tracing::info!(snapshot = %snapshot_path.display(), output = %output_path.display(), "watching");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("watch stopped");
                return Ok(());
            }
        }

        let rev = match store.reload_from(snapshot_path).await {
            Ok(rev) => rev,
            Err(e) => {
                tracing::warn!("Failed to reload snapshot: {}", e);
                continue;
            }
        };
        if rendered_rev == Some(rev) {
            continue;
        }

        let current = store.get().await;
        let report = card.set_state(&current.snapshot);
        if let Some(html) = card.render_html() {
            tokio::fs::write(output_path, html).await?;
        }
        rendered_rev = Some(rev);
        tracing::debug!(rev, updates = report.updates, "card re-rendered");
    }
}

fn load_card(path: &Path, variant: Option<CardVariant>) -> anyhow::Result<MediarrCard> {
    let raw = read_card_config(path)?;
    let variant = variant.unwrap_or_else(|| variant_from_config(&raw));
    let card = MediarrCard::new(&raw, variant)
        .with_context(|| format!("invalid card config {}", path.display()))?;
    tracing::info!(variant = ?variant, path = %path.display(), "card loaded");
    Ok(card)
}

fn parse_variant(name: Option<&str>) -> anyhow::Result<Option<CardVariant>> {
    match name {
        None => Ok(None),
        Some(name) => CardVariant::from_name(name)
            .map(Some)
            .with_context(|| format!("unknown card variant: {name}")),
    }
}

/// Variant named by the card's `type` key (`custom:emby-mediarr-card`), else mediarr.
fn variant_from_config(raw: &Value) -> CardVariant {
    raw.get("type")
        .and_then(Value::as_str)
        .map(|t| t.trim_start_matches("custom:"))
        .and_then(CardVariant::from_name)
        .unwrap_or_default()
}

/// `section:index`, index defaulting to 0.
fn parse_selection(target: &str) -> anyhow::Result<(&str, usize)> {
    match target.split_once(':') {
        Some((section, index)) => {
            let index = index
                .parse()
                .with_context(|| format!("invalid item index in {target}"))?;
            Ok((section, index))
        }
        None => Ok((target, 0)),
    }
}

fn read_card_config(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read card config {}", path.display()))?;
    let table: toml::Table = toml::from_str(&content)?;
    Ok(serde_json::to_value(table)?)
}

fn write_stub(path: &Path, variant: CardVariant) -> anyhow::Result<()> {
    if path.exists() {
        println!("{} already exists", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut stub = toml::Table::new();
    stub.insert(
        "type".to_string(),
        toml::Value::String(format!("custom:{}", variant.element_name())),
    );
    if let toml::Value::Table(rest) = toml::Value::try_from(variant.stub_config())? {
        stub.extend(rest);
    }
    std::fs::write(path, toml::to_string_pretty(&stub)?)?;
    println!("wrote {}", path.display());
    Ok(())
}
