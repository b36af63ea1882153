use axum::{http::StatusCode, response::{IntoResponse, Html}};
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Everything that can go wrong between receiving a URL and producing a
/// rendered fragment. Never surfaced as a fault; the browser service turns it
/// into an error `PageResult`.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url `{0}`")]
    InvalidUrl(String),
    #[error("refusing to fetch private or loopback host `{0}`")]
    Blocked(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("could not connect: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("could not process {kind} content: {reason}")]
    Processing { kind: &'static str, reason: String },
    #[error("unsupported content type `{0}`")]
    Unsupported(String),
}

impl FetchError {
    pub fn category(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl(_) | FetchError::Blocked(_) => "input",
            FetchError::Timeout(_) | FetchError::Connect(_) | FetchError::Request(_) => "network",
            FetchError::Status { .. } => "http",
            FetchError::Processing { .. } => "processing",
            FetchError::Unsupported(_) => "unsupported",
        }
    }
}

/// Raised inside reqwest's redirect policy and resolver when a hop lands on a
/// private address; recovered from the error chain as `FetchError::Blocked`.
#[derive(Error, Debug)]
#[error("refusing to connect to private or loopback host `{0}`")]
pub struct BlockedHost(pub String);

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            if let Some(blocked) = cause.downcast_ref::<BlockedHost>() {
                return FetchError::Blocked(blocked.0.clone());
            }
            source = cause.source();
        }

        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if let Some(status) = e.status() {
            let url = e.url().map(|u| u.to_string()).unwrap_or_default();
            FetchError::Status { status: status.as_u16(), url }
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Request-level failures of the web layer.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("missing `url` parameter and no TARGET_URL configured")]
    MissingUrl,
    #[error(transparent)]
    BadUrl(#[from] FetchError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::MissingUrl | AppError::BadUrl(_) => StatusCode::BAD_REQUEST,
        };
        let safe = html_escape::encode_text(&self.to_string()).into_owned();
        (status, Html(format!(r#"<!doctype html>
<html><head><meta charset="utf-8"><title>Error</title></head>
<body><h1>Oops!</h1><p>Cannot open that page.</p>
<pre style="white-space:pre-wrap">{safe}</pre></body></html>"#))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_cover_taxonomy() {
        assert_eq!(FetchError::Timeout("x".into()).category(), "network");
        assert_eq!(FetchError::Status { status: 404, url: "u".into() }.category(), "http");
        assert_eq!(
            FetchError::Processing { kind: "json", reason: "eof".into() }.category(),
            "processing"
        );
        assert_eq!(FetchError::Unsupported("image/png".into()).category(), "unsupported");
        assert_eq!(FetchError::Blocked("h".into()).category(), "input");
    }

    #[test]
    fn app_error_is_bad_request() {
        let resp = AppError::MissingUrl.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
