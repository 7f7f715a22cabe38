//! Command handlers.

use anyhow::Context;
use console::style;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thumbs_api::{AppState, create_router};
use thumbs_cache::{
    CachePolicy, FilesystemStorage, MemoryMetadataCache, RenderCache, RenderOutcome,
    RenderRequest,
};
use thumbs_core::config::CONFIG_ENV;
use thumbs_core::{CacheKey, Geometry, ImageAttrs, ImageInfo, ImageUrlResolver, Source, ThumbsConfig};
use thumbs_render::{ActionRegistry, RenderPool};
use tokio::net::TcpListener;
use tracing::{debug, info};

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Run the HTTP server until Ctrl-C.
pub async fn serve(config: ThumbsConfig, listen: Option<String>) -> anyhow::Result<()> {
    let addr = listen.unwrap_or_else(|| config.listen_addr.clone());

    tokio::fs::create_dir_all(&config.storage_root)
        .await
        .with_context(|| format!("creating {}", config.storage_root.display()))?;

    let metadata = Arc::new(MemoryMetadataCache::new());
    let cache = Arc::new(RenderCache::new(
        Arc::new(FilesystemStorage::new(config.source_root.clone())),
        Arc::new(FilesystemStorage::new(config.storage_root.clone())),
        metadata.clone(),
        ActionRegistry::standard(),
        RenderPool::new(config.max_concurrent_renders, config.render_timeout()),
        CachePolicy::from(&config),
    ));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            metadata.purge_expired();
            debug!(entries = metadata.len(), "Purged expired render records");
        }
    });

    let app = create_router(Arc::new(AppState::from_config(&config, cache)));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    info!(
        addr = %addr,
        source_root = %config.source_root.display(),
        storage_root = %config.storage_root.display(),
        workers = config.max_concurrent_renders,
        "thumbs listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Initiating graceful shutdown");
    }
}

/// Render one request through a fresh cache.
pub async fn render(
    config: &ThumbsConfig,
    action: &str,
    geometry: &str,
    source: &str,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let cache = RenderCache::from_config(config, ActionRegistry::standard());
    let outcome = cache
        .get(&RenderRequest::new(action, geometry, source))
        .await?;

    let (bytes, content_type) = match outcome {
        RenderOutcome::Image {
            bytes,
            content_type,
            ..
        } => (bytes, content_type),
        RenderOutcome::NotFound(status) => {
            anyhow::bail!("{} not found ({:?})", source, status)
        }
    };

    let stored = stored_path(config, action, geometry, source)?;
    println!(
        "{} Rendered {} {} {} ({}, {} bytes)",
        style("✓").green(),
        style(action).bold(),
        geometry,
        source,
        content_type,
        bytes.len()
    );
    println!("  Stored: {}", style(stored.display()).dim());

    if let Some(out) = out {
        std::fs::write(out, &bytes).with_context(|| format!("writing {}", out.display()))?;
        println!("  Wrote:  {}", out.display());
    }

    Ok(())
}

/// Where the render for these inputs lives under the storage root.
pub fn stored_path(
    config: &ThumbsConfig,
    action: &str,
    geometry: &str,
    source: &str,
) -> anyhow::Result<PathBuf> {
    let geometry = Geometry::parse(action, geometry)?;
    let key = CacheKey::derive(source, action, &geometry.canonical());
    Ok(config.storage_root.join(key.storage_path()))
}

/// Print the computed image attributes as JSON.
pub fn url(
    config: &ThumbsConfig,
    source: &str,
    action: &str,
    geometry: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> anyhow::Result<()> {
    let attrs = resolve_attrs(config, source, action, geometry, width, height);
    println!("{}", serde_json::to_string_pretty(&attrs)?);
    Ok(())
}

pub fn resolve_attrs(
    config: &ThumbsConfig,
    source: &str,
    action: &str,
    geometry: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> ImageAttrs {
    let resolver = ImageUrlResolver::new(config.url_settings());

    if width.is_none() && height.is_none() {
        return resolver.compute(Source::Url(source), action, geometry);
    }

    let info = ImageInfo {
        width,
        height,
        ..ImageInfo::at(source)
    };
    resolver.compute(Source::Descriptor(&info), action, geometry)
}

/// Show effective configuration.
pub fn show_config(config: &ThumbsConfig) -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

/// Print which configuration file would be loaded.
pub fn config_path(explicit: Option<&Path>) {
    match effective_config_path(explicit) {
        Some(path) if path.exists() => println!("{}", path.display()),
        Some(path) => println!("{} {}", path.display(), style("(not found)").yellow()),
        None => println!("{}", style("no configuration directory available").yellow()),
    }
}

pub fn effective_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    ThumbsConfig::config_path()
}
