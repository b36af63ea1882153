use crate::clients::http::Fetch;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

pub fn keep_alive_targets(port: u16, target: Option<&Url>) -> Vec<Url> {
    let mut targets = Vec::with_capacity(2);
    match Url::parse(&format!("http://127.0.0.1:{port}/ping")) {
        Ok(ping) => targets.push(ping),
        Err(e) => warn!(%port, error = %e, "cannot build self-ping url"),
    }
    targets.extend(target.cloned());
    targets
}

pub async fn start_keep_alive(fetcher: Arc<dyn Fetch>, targets: Vec<Url>, every: Duration) {
    info!(count = targets.len(), every_secs = every.as_secs(), "keep-alive loop enabled");
    tokio::spawn(async move {
        loop {
            sleep(every).await;
            keep_alive_tick(fetcher.as_ref(), &targets).await;
        }
    });
}

/// Hits every target once, bypassing the page cache. Returns how many answered.
pub(crate) async fn keep_alive_tick(fetcher: &dyn Fetch, targets: &[Url]) -> usize {
    let mut ok = 0;
    for url in targets {
        match fetcher.get(url).await {
            Ok(_) => {
                ok += 1;
                debug!(%url, "keep-alive ping");
            }
            Err(e) => warn!(%url, error = %e, "keep-alive ping failed"),
        }
    }
    ok
}
