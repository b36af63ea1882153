use crate::clients::http::RawResponse;
use crate::domain::page::{Limits, Rendered};
use crate::error::FetchError;
use crate::services::sanitize::sanitize_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Json,
    PlainText,
    Unsupported,
}

impl ContentKind {
    pub fn from_content_type(content_type: &str) -> Self {
        let ct = content_type.to_ascii_lowercase();
        if ct.contains("text/html") {
            ContentKind::Html
        } else if ct.contains("application/json") {
            ContentKind::Json
        } else if ct.contains("text/plain") {
            ContentKind::PlainText
        } else {
            ContentKind::Unsupported
        }
    }
}

pub fn render(raw: &RawResponse, limits: &Limits) -> Result<Rendered, FetchError> {
    let body = truncate_chars(&raw.body, limits.max_body_chars);
    match ContentKind::from_content_type(&raw.content_type) {
        ContentKind::Html => Ok(sanitize_html(body, &raw.url, limits.max_render_chars)),
        ContentKind::Json => render_json(body),
        ContentKind::PlainText => Ok(render_text(body)),
        ContentKind::Unsupported => Err(FetchError::Unsupported(unsupported_label(raw))),
    }
}

pub fn pretty_json(body: &str) -> Result<String, FetchError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Processing { kind: "json", reason: e.to_string() })?;
    serde_json::to_string_pretty(&value)
        .map_err(|e| FetchError::Processing { kind: "json", reason: e.to_string() })
}

fn render_json(body: &str) -> Result<Rendered, FetchError> {
    let pretty = pretty_json(body)?;
    Ok(Rendered {
        title: None,
        html: format!(r#"<pre class="json">{}</pre>"#, html_escape::encode_text(&pretty)),
    })
}

fn render_text(body: &str) -> Rendered {
    Rendered {
        title: None,
        html: format!(
            r#"<pre class="text" style="white-space:pre-wrap">{}</pre>"#,
            html_escape::encode_text(body)
        ),
    }
}

fn unsupported_label(raw: &RawResponse) -> String {
    if raw.content_type.trim().is_empty() {
        "(none)".to_string()
    } else {
        raw.content_type.clone()
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
