#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cloud_browser::telemetry::init();
    let cfg = cloud_browser::config::Config::load()?;

    let (app, port) = cloud_browser::build_app(cfg.clone()).await?;

    use tracing::info;
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(
        %addr,
        target = cfg.target_url.as_deref().unwrap_or("-"),
        keep_alive = cfg.keep_alive,
        cache_ttl_secs = cfg.cache_ttl.as_secs(),
        "cloud browser starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
