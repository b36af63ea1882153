use async_trait::async_trait;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::{header, redirect, Client};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing::{debug, warn};
use url::Url;

use crate::domain::target::{is_private_host, is_private_ip};
use crate::error::{BlockedHost, FetchError};

const MAX_REDIRECTS: usize = 10;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; CloudBrowser/0.1; +https://github.com/cloud-browser)";

/// A fetched response, before any processing.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Final URL after redirects.
    pub url: Url,
    pub content_type: String,
    pub body: String,
}

/// Outbound GET. Implemented over reqwest in production and by stubs in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &Url) -> Result<RawResponse, FetchError>;
}

/// Shared reqwest client: one connection pool and cookie store for every
/// request the process makes.
#[derive(Clone)]
pub struct HttpClient(Client);

impl HttpClient {
    /// Unless `allow_private_hosts` is set, every redirect hop and every DNS
    /// answer is checked, so a public name cannot lead to an internal address.
    pub fn new(timeout: Duration, user_agent: &str, allow_private_hosts: bool) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .cookie_store(true)
            .redirect(redirect_policy(allow_private_hosts));
        if !allow_private_hosts {
            builder = builder.dns_resolver(Arc::new(PublicOnlyResolver));
        }
        Ok(Self(builder.build()?))
    }
}

fn redirect_policy(allow_private_hosts: bool) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if !allow_private_hosts && is_private_host(attempt.url()) {
            let host = attempt.url().host_str().unwrap_or_default().to_string();
            warn!(%host, "redirect to private host refused");
            attempt.error(BlockedHost(host))
        } else {
            attempt.follow()
        }
    })
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

struct PublicOnlyResolver;

impl Resolve for PublicOnlyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(public_addrs(name.as_str().to_string()))
    }
}

async fn public_addrs(host: String) -> Result<Addrs, BoxError> {
    let public: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0))
        .await?
        .filter(|addr| !is_private_ip(addr.ip()))
        .collect();
    if public.is_empty() {
        warn!(%host, "name resolves only to private addresses");
        return Err(Box::new(BlockedHost(host)));
    }
    Ok(Box::new(public.into_iter()))
}

#[async_trait]
impl Fetch for HttpClient {
    async fn get(&self, url: &Url) -> Result<RawResponse, FetchError> {
        let response = self
            .0
            .get(url.clone())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,application/json;q=0.9,text/plain;q=0.8,*/*;q=0.5")
            .send()
            .await?
            .error_for_status()?;

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;
        debug!(url = %final_url, %content_type, bytes = body.len(), "fetched");

        Ok(RawResponse { url: final_url, content_type, body })
    }
}
