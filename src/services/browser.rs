use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use url::Url;

use crate::clients::http::Fetch;
use crate::domain::page::{Limits, PageResult};
use crate::domain::target::{cache_key, is_private_host, normalize_url};
use crate::error::FetchError;
use crate::services::cache::{Clock, Lookup, TtlCache};
use crate::services::render::render;

pub struct Browser {
    fetcher: Arc<dyn Fetch>,
    cache: TtlCache<Arc<PageResult>>,
    limits: Limits,
    allow_private_hosts: bool,
}

pub struct Loaded {
    pub page: Arc<PageResult>,
    pub cached: bool,
}

impl Browser {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        clock: Arc<dyn Clock>,
        ttl: std::time::Duration,
        limits: Limits,
        allow_private_hosts: bool,
    ) -> Self {
        Self { fetcher, cache: TtlCache::new(ttl, clock), limits, allow_private_hosts }
    }

    pub async fn load(&self, raw_url: &str) -> Loaded {
        let target = match self.check_target(raw_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %raw_url, error = %e, category = e.category(), "rejected url");
                return Loaded { page: Arc::new(PageResult::failure(raw_url.trim(), "", 0, &e)), cached: false };
            }
        };

        let key = cache_key(&target);
        let (page, lookup) = self
            .cache
            .get_or_fill(&key, || async { Arc::new(self.fetch_and_render(&target).await) })
            .await;
        if lookup == Lookup::Hit {
            info!(url = %target, "served from cache");
        }
        Loaded { page, cached: lookup == Lookup::Hit }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    fn check_target(&self, raw_url: &str) -> Result<Url, FetchError> {
        let url = normalize_url(raw_url)?;
        if !self.allow_private_hosts && is_private_host(&url) {
            return Err(FetchError::Blocked(url.host_str().unwrap_or_default().to_string()));
        }
        Ok(url)
    }

    async fn fetch_and_render(&self, target: &Url) -> PageResult {
        let started = Instant::now();
        let raw = match self.fetcher.get(target).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(url = %target, error = %e, category = e.category(), "fetch failed");
                return PageResult::failure(target.as_str(), "", 0, &e);
            }
        };

        let size = raw.body.len();
        let result = match render(&raw, &self.limits) {
            Ok(rendered) => PageResult::success(raw.url.as_str(), raw.content_type.as_str(), rendered, size),
            Err(e) => {
                warn!(url = %raw.url, error = %e, category = e.category(), "render failed");
                PageResult::failure(raw.url.as_str(), raw.content_type.as_str(), size, &e)
            }
        };
        info!(
            url = %raw.url,
            content_type = %raw.content_type,
            size,
            ok = result.is_success(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched page"
        );
        result
    }
}
