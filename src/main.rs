mod assets;
mod config;
mod core;
mod game;
mod ui;

use crate::assets::{AssetLoader, IMAGE_FETCH_TIMEOUT, ImageCache, MAX_IMAGE_BYTES};
use crate::core::network::{StatsError, UreqFetcher, fetch_stats};
use crate::game::platform::resolve_platform;
use crate::ui::card::CardRenderer;
use crate::ui::font::TextPainter;
use clap::Parser;
use log::{debug, info};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

/// Render a Battlefield 6 player's statistics as a PNG card.
#[derive(Parser, Debug)]
#[command(name = "statcard", version)]
struct Cli {
    /// EA ID of the player to look up.
    player: Option<String>,
    /// pc / ps / xbox, or an alias such as steam, psn, xbl.
    platform: Option<String>,
    /// Output file. Defaults to `<player>.png`.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Install logger immediately, then set runtime max level from config after loading it.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    // Startup default when config is missing or malformed.
    log::set_max_level(log::LevelFilter::Warn);

    config::load();
    log::set_max_level(config::get().log_level.as_level_filter());

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        // Messages are written for end users; print them as-is.
        eprintln!("{e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let cfg = config::get();
    let player = cli
        .player
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(StatsError::MissingPlayer)?
        .to_string();
    let platform = resolve_platform(cli.platform.as_deref(), cfg.default_platform)
        .ok_or(StatsError::UnknownPlatform)?;
    let out = cli
        .out
        .unwrap_or_else(|| PathBuf::from(format!("{player}.png")));

    let text = Arc::new(TextPainter::load(cfg.font_path.as_deref()));
    let loader = AssetLoader::new(Arc::new(UreqFetcher::new(IMAGE_FETCH_TIMEOUT)))
        .with_timeout(IMAGE_FETCH_TIMEOUT)
        .with_max_bytes(MAX_IMAGE_BYTES)
        .with_cache(cfg.enable_cache.then(ImageCache::shared));
    let renderer = CardRenderer::new(loader, text);
    let render_config = cfg.render_config(&player, platform);
    debug!("Render config: {render_config:?}");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let card = runtime.block_on(async {
        let lang = cfg.language.clone();
        let name = player.clone();
        let stats = tokio::task::spawn_blocking(move || fetch_stats(&name, platform, &lang)).await??;
        let card = renderer.render(&stats, &render_config).await?;
        Ok::<_, Box<dyn Error>>(card)
    })?;

    std::fs::write(&out, &card.png)?;
    info!(
        "Wrote {}x{} card for '{player}' to '{}' ({} placeholder images).",
        card.width,
        card.height,
        out.display(),
        card.placeholders.total()
    );
    println!("{}", out.display());
    Ok(())
}
