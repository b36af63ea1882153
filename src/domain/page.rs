use serde::Serialize;
use std::time::Duration;

use crate::error::FetchError;
use crate::services::error_page;

pub const CACHE_TTL: Duration = Duration::from_secs(300);
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_BODY_CHARS: usize = 50_000;
pub const MAX_RENDER_CHARS: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Success,
    Error,
}

/// Outcome of loading one URL. Error outcomes carry a rendered explanation in
/// `content` so callers can always embed it.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub url: String,
    pub status: FetchStatus,
    pub content_type: String,
    pub content: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResult {
    pub fn success(
        url: impl Into<String>,
        content_type: impl Into<String>,
        rendered: Rendered,
        size: usize,
    ) -> Self {
        Self {
            url: url.into(),
            status: FetchStatus::Success,
            content_type: content_type.into(),
            content: rendered.html,
            size,
            title: rendered.title,
            error: None,
        }
    }

    pub fn failure(
        url: impl Into<String>,
        content_type: impl Into<String>,
        size: usize,
        err: &FetchError,
    ) -> Self {
        let message = err.to_string();
        Self {
            url: url.into(),
            status: FetchStatus::Error,
            content_type: content_type.into(),
            content: error_page::error_block(&message),
            size,
            title: None,
            error: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Success
    }
}

/// A body turned into an embeddable HTML fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub title: Option<String>,
    pub html: String,
}

/// Size limits applied while rendering.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_body_chars: usize,
    pub max_render_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_body_chars: MAX_BODY_CHARS, max_render_chars: MAX_RENDER_CHARS }
    }
}
