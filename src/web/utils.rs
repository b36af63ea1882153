use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use url::Url;

use crate::services::browser::Loaded;

const SHELL_STYLE: &str = r#"body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;margin:0;background:#f1f5f9;color:#0f172a}
header{background:#1e40af;color:#fff;padding:12px 20px;display:flex;gap:16px;align-items:center}
header form{flex:1;display:flex;gap:8px}
header input{flex:1;padding:8px 12px;border-radius:6px;border:none;font-size:15px}
header button{padding:8px 16px;border:none;border-radius:6px;background:#f59e0b;color:#fff;font-weight:600}
main{max-width:1000px;margin:20px auto;background:#fff;border-radius:10px;padding:24px;box-shadow:0 4px 20px rgba(0,0,0,.08)}
.meta{font-size:13px;color:#475569;margin-bottom:16px;display:flex;gap:12px;flex-wrap:wrap}
.badge{padding:2px 8px;border-radius:4px;color:#fff}.ok{background:#10b981}.err{background:#ef4444}
.proxied-page img{max-width:100%}pre{background:#f8fafc;padding:12px;border-radius:6px;overflow:auto}"#;

/// Browser shell: address bar plus the loaded page, if any.
pub fn shell_page(url: Option<&str>, loaded: Option<&Loaded>) -> String {
    let value = attr(url.unwrap_or_default());
    let body = match loaded {
        Some(loaded) => loaded_section(loaded),
        None => r#"<p>Enter an address above. Pages are fetched on the server and shown without scripts.</p>
<p>Works best with plain HTML pages, documentation, blogs, JSON and text files.</p>"#
            .to_string(),
    };
    let title = loaded
        .and_then(|l| l.page.title.as_deref())
        .map(|t| format!("{} - Cloud Browser", text(t)))
        .unwrap_or_else(|| "Cloud Browser".to_string());

    format!(
        r#"<!doctype html>
<html><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title><style>{SHELL_STYLE}</style></head>
<body>
<header><strong>Cloud Browser</strong>
<form method="get" action="/"><input type="text" name="url" placeholder="example.com" value="{value}"><button type="submit">Go</button></form>
<a href="/auto-refresh" style="color:#fff">Auto-refresh</a></header>
<main>{body}</main>
</body></html>"#
    )
}

fn loaded_section(loaded: &Loaded) -> String {
    let page = &loaded.page;
    let badge = if page.is_success() {
        r#"<span class="badge ok">loaded</span>"#
    } else {
        r#"<span class="badge err">error</span>"#
    };
    let cached = if loaded.cached { "<span>from cache</span>" } else { "" };
    let content_type = if page.content_type.is_empty() { "unknown" } else { page.content_type.as_str() };
    format!(
        r#"<div class="meta">{badge}<a href="{href}" target="_blank" rel="noopener noreferrer">{shown}</a><span>{content_type}</span><span>{size} bytes</span>{cached}</div>
<div class="content">{content}</div>"#,
        href = attr(&page.url),
        shown = text(&page.url),
        content_type = text(content_type),
        size = page.size,
        content = page.content,
    )
}

/// Embeds `url` in an iframe and reloads the whole page every `refresh_secs`.
pub fn auto_refresh_page(url: &Url, refresh_secs: u64) -> String {
    let src = attr(url.as_str());
    let shown = text(url.as_str());
    format!(
        r#"<!doctype html>
<html><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1">
<meta http-equiv="refresh" content="{refresh_secs}">
<title>Auto-Refresh - Cloud Browser</title>
<style>body{{margin:0;display:flex;flex-direction:column;height:100vh;background:#1a1a1a;color:#fff;font-family:Arial,sans-serif}}
.bar{{background:#2563eb;padding:10px 15px;display:flex;justify-content:space-between}}
iframe{{flex:1;width:100%;border:none;background:#fff}}
.timer{{background:#10b981;padding:2px 8px;border-radius:4px;font-weight:bold}}</style></head>
<body>
<div class="bar"><span>Keeping {shown} active</span><span>Refresh in <span class="timer" id="timer"></span></span></div>
<iframe src="{src}" id="target" allowfullscreen></iframe>
<script>
let left = {refresh_secs};
function show() {{
  const m = Math.floor(left / 60).toString().padStart(2, '0');
  const s = (left % 60).toString().padStart(2, '0');
  document.getElementById('timer').textContent = m + ':' + s;
}}
show();
setInterval(() => {{ left = left > 0 ? left - 1 : {refresh_secs}; show(); }}, 1000);
setInterval(() => {{ fetch('/keep-alive').catch(() => {{}}); }}, 30000);
</script>
</body></html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::page::{PageResult, Rendered};
    use std::sync::Arc;

    fn loaded(title: Option<&str>, content: &str) -> Loaded {
        let rendered = Rendered { title: title.map(str::to_string), html: content.to_string() };
        Loaded {
            page: Arc::new(PageResult::success("https://a.com/", "text/html", rendered, 42)),
            cached: true,
        }
    }

    #[test]
    fn empty_shell_has_form() {
        let html = shell_page(None, None);
        assert!(html.contains(r#"name="url""#));
        assert!(html.contains("<title>Cloud Browser</title>"));
    }

    #[test]
    fn shell_embeds_loaded_content_and_escapes_input() {
        let l = loaded(Some("A <b> page"), "<p>body</p>");
        let html = shell_page(Some(r#""><script>"#), Some(&l));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("A &lt;b&gt; page - Cloud Browser"));
        assert!(html.contains("from cache"));
        assert!(html.contains("42 bytes"));
        assert!(!html.contains(r#""><script>"#));
    }

    #[test]
    fn auto_refresh_sets_meta_refresh_and_iframe() {
        let url = Url::parse("https://codesandbox.io/p/devbox/demo?x=1&y=2").unwrap();
        let html = auto_refresh_page(&url, 180);
        assert!(html.contains(r#"<meta http-equiv="refresh" content="180">"#));
        assert!(html.contains(r#"src="https://codesandbox.io/p/devbox/demo?x=1&amp;y=2""#));
        assert!(html.contains("let left = 180;"));
    }
}
