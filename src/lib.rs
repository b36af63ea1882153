pub mod clients { pub mod http; }
pub mod config;
pub mod telemetry;
pub mod state;
pub mod error;
pub mod domain { pub mod page; pub mod target; }
pub mod services {
    pub mod activity;
    pub mod browser;
    pub mod cache;
    pub mod error_page;
    pub mod housekeeping;
    pub mod render;
    pub mod sanitize;
}
pub mod web { pub mod router; pub mod handlers; pub mod utils; }

use std::sync::Arc;

use crate::clients::http::{Fetch, HttpClient};
use crate::config::Config;
use crate::domain::target::normalize_url;
use crate::services::{activity::Activity, browser::Browser, cache::{Clock, SystemClock}, housekeeping};
use crate::state::AppState;

pub async fn build_app(cfg: Config) -> anyhow::Result<(axum::Router, u16)> {
    let fetcher: Arc<dyn Fetch> = Arc::new(HttpClient::new(
        cfg.fetch_timeout,
        &cfg.user_agent,
        cfg.allow_private_hosts,
    )?);

    if cfg.keep_alive {
        let target = cfg.target_url.as_deref().and_then(|u| normalize_url(u).ok());
        let targets = housekeeping::keep_alive_targets(cfg.port, target.as_ref());
        housekeeping::start_keep_alive(fetcher.clone(), targets, cfg.keep_alive_interval).await;
    }

    let port = cfg.port;
    let state = app_state(cfg, fetcher, Arc::new(SystemClock));
    Ok((crate::web::router::build_router(state), port))
}

/// Wires the shared state from its parts; tests pass stub fetchers and clocks.
pub fn app_state(cfg: Config, fetcher: Arc<dyn Fetch>, clock: Arc<dyn Clock>) -> AppState {
    let browser = Browser::new(fetcher, clock, cfg.cache_ttl, cfg.limits, cfg.allow_private_hosts);
    AppState {
        browser: Arc::new(browser),
        activity: Arc::new(Activity::new()),
        config: Arc::new(cfg),
    }
}
