use scraper::{node::Node, ElementRef, Html, Selector};
use url::Url;

use crate::domain::page::Rendered;

const DROPPED_ELEMENTS: &[&str] = &["script", "style", "base", "meta", "link"];
const DROPPED_ATTRS: &[&str] = &["srcdoc", "formaction", "action"];
const REWRITTEN_ATTRS: &[&str] = &["href", "src"];
const SCRIPT_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:text/html"];
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub const TRUNCATION_MARKER: &str =
    r#"<p class="truncated"><em>[content truncated, open the original page for the rest]</em></p>"#;

pub fn sanitize_html(html: &str, base: &Url, max_chars: usize) -> Rendered {
    let document = Html::parse_document(html);
    let title = extract_title(&document);

    let mut writer = Writer::new(base, max_chars);
    match body_element(&document) {
        Some(body) => writer.children(body),
        None => writer.children(document.root_element()),
    }
    let body = writer.finish();

    let html = match &title {
        Some(t) => format!(
            r#"<div class="proxied-page"><h1 class="proxied-title">{}</h1>{body}</div>"#,
            html_escape::encode_text(t)
        ),
        None => format!(r#"<div class="proxied-page">{body}</div>"#),
    };
    Rendered { title, html }
}

pub fn absolutize(base: &Url, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || Url::parse(trimmed).is_ok() {
        return value.to_string();
    }
    base.join(trimmed)
        .map(String::from)
        .unwrap_or_else(|_| value.to_string())
}

// browsers skip whitespace and control chars inside a scheme
fn runs_script(value: &str) -> bool {
    let squashed: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .take(32)
        .collect::<String>()
        .to_ascii_lowercase();
    SCRIPT_SCHEMES.iter().any(|scheme| squashed.starts_with(scheme))
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let raw: String = document.select(&selector).next()?.text().collect();
    let title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

fn body_element(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("body").ok()?;
    document.select(&selector).next()
}

struct Writer<'a> {
    base: &'a Url,
    out: String,
    budget: usize,
    used: usize,
    truncated: bool,
}

impl<'a> Writer<'a> {
    fn new(base: &'a Url, budget: usize) -> Self {
        Self { base, out: String::new(), budget, used: 0, truncated: false }
    }

    fn finish(mut self) -> String {
        if self.truncated {
            self.out.push_str(TRUNCATION_MARKER);
        }
        self.out
    }

    fn children(&mut self, parent: ElementRef<'_>) {
        for child in parent.children() {
            if self.truncated {
                return;
            }
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(child) {
                        self.element(el);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, el: ElementRef<'_>) {
        let name = el.value().name();
        if DROPPED_ELEMENTS.contains(&name) {
            return;
        }
        if self.used >= self.budget {
            self.truncated = true;
            return;
        }

        let mut tag = format!("<{name}");
        for (attr, value) in el.value().attrs() {
            let lowered = attr.to_ascii_lowercase();
            if lowered.starts_with("on") || DROPPED_ATTRS.contains(&lowered.as_str()) {
                continue;
            }
            let value = if REWRITTEN_ATTRS.contains(&lowered.as_str()) {
                if runs_script(value) {
                    continue;
                }
                absolutize(self.base, value)
            } else {
                value.to_string()
            };
            tag.push(' ');
            tag.push_str(attr);
            tag.push_str("=\"");
            tag.push_str(&html_escape::encode_double_quoted_attribute(&value));
            tag.push('"');
        }
        tag.push('>');
        self.used += tag.chars().count();
        self.out.push_str(&tag);

        if VOID_ELEMENTS.contains(&name) {
            return;
        }
        self.children(el);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn text(&mut self, text: &str) {
        let remaining = self.budget.saturating_sub(self.used);
        let count = text.chars().count();
        if count <= remaining {
            self.out.push_str(&html_escape::encode_text(text));
            self.used += count;
        } else {
            let cut: String = text.chars().take(remaining).collect();
            self.out.push_str(&html_escape::encode_text(&cut));
            self.used = self.budget;
            self.truncated = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://a.com/x/").unwrap()
    }

    #[test]
    fn strips_script_and_style() {
        let html = r#"<html><head><style>body{color:red}</style><script>var a=1;</script></head>
            <body><p>Hello</p><SCRIPT type="text/javascript">alert("x")</SCRIPT>
            <div><style scoped>.x{}</style>World</div></body></html>"#;
        let out = sanitize_html(html, &base(), 20_000).html.to_lowercase();
        assert!(!out.contains("<script"));
        assert!(!out.contains("<style"));
        assert!(!out.contains("alert"));
        assert!(out.contains("<p>hello</p>"));
        assert!(out.contains("world"));
    }

    #[test]
    fn rewrites_relative_links_and_images() {
        let html = r#"<body><a href="y">y</a><img src="/img/logo.png"><a href="../up">up</a></body>"#;
        let out = sanitize_html(html, &base(), 20_000).html;
        assert!(out.contains(r#"href="https://a.com/x/y""#));
        assert!(out.contains(r#"src="https://a.com/img/logo.png""#));
        assert!(out.contains(r#"href="https://a.com/up""#));
    }

    #[test]
    fn leaves_absolute_and_special_schemes() {
        let b = base();
        assert_eq!(absolutize(&b, "https://other.org/p"), "https://other.org/p");
        assert_eq!(absolutize(&b, "mailto:me@a.com"), "mailto:me@a.com");
        assert_eq!(absolutize(&b, "tel:+123"), "tel:+123");
        assert_eq!(absolutize(&b, "data:image/png;base64,AAAA"), "data:image/png;base64,AAAA");
        assert_eq!(absolutize(&b, "#top"), "#top");
        assert_eq!(absolutize(&b, ""), "");
        assert_eq!(absolutize(&b, "//cdn.a.com/lib.js"), "https://cdn.a.com/lib.js");
    }

    #[test]
    fn extracts_and_escapes_title() {
        let html = "<html><head><title>  Tom &amp; <Jerry>  </title></head><body>x</body></html>";
        let rendered = sanitize_html(html, &base(), 20_000);
        assert_eq!(rendered.title.as_deref(), Some("Tom & <Jerry>"));
        assert!(rendered.html.contains("Tom &amp; &lt;Jerry&gt;"));
    }

    #[test]
    fn fragment_without_body_tag_is_kept() {
        let rendered = sanitize_html("<p>just a <b>fragment</b></p>", &base(), 20_000);
        assert!(rendered.title.is_none());
        assert!(rendered.html.contains("<p>just a <b>fragment</b></p>"));
    }

    #[test]
    fn malformed_markup_is_closed() {
        let out = sanitize_html("<body><div><p>open <i>italic</div>tail", &base(), 20_000).html;
        assert!(out.contains("<i>italic</i>"));
        assert!(out.ends_with("</div>"));
        assert!(out.contains("tail"));
    }

    #[test]
    fn drops_event_handlers_and_comments() {
        let out = sanitize_html(
            r#"<body><!-- hidden --><button onclick="steal()" class="b">Go</button></body>"#,
            &base(),
            20_000,
        )
        .html;
        assert!(!out.contains("onclick"));
        assert!(!out.contains("hidden"));
        assert!(out.contains(r#"<button class="b">Go</button>"#));
    }

    #[test]
    fn script_urls_and_page_takeover_markup_are_removed() {
        let html = r#"<head><base href="https://evil.example/"><link rel="stylesheet" href="x.css"></head>
            <body><a href="javascript:alert(document.cookie)">a</a>
            <a href=" JaVa&#9;Script:alert(2)">b</a>
            <img src="vbscript:msgbox(1)">
            <iframe src="data:text/html;base64,PHNjcmlwdD4=" srcdoc="<script>parent.alert(1)</script>"></iframe>
            <meta http-equiv="refresh" content="0;url=https://evil.example/">
            <form action="https://evil.example/steal"><button formaction="https://evil.example/b">go</button></form>
            <img src="data:image/png;base64,AAAA">
            </body>"#;
        let out = sanitize_html(html, &base(), 20_000).html.to_ascii_lowercase();
        for banned in ["javascript", "vbscript", "data:text/html", "srcdoc", "<base", "<meta", "<link", "evil.example", "formaction", "action="] {
            assert!(!out.contains(banned), "{banned} survived in {out}");
        }
        assert!(out.contains(">a</a>"));
        assert!(out.contains("<iframe></iframe>"));
        assert!(out.contains(r#"src="data:image/png;base64,aaaa""#));
        assert!(out.contains("<form><button>go</button></form>"));
    }

    #[test]
    fn long_body_is_truncated_with_marker() {
        let html = format!("<body><p>{}</p><p>after</p></body>", "a".repeat(30_000));
        let out = sanitize_html(&html, &base(), 20_000).html;
        assert!(out.contains(TRUNCATION_MARKER));
        assert!(!out.contains("after"));
        // the opening <p> counts against the budget
        assert!(out.contains(&"a".repeat(20_000 - 3)));
        assert!(!out.contains(&"a".repeat(20_000 - 2)));
        assert!(out.contains("</p>"));
    }

    #[test]
    fn short_body_has_no_marker() {
        let out = sanitize_html("<body><p>short</p></body>", &base(), 20_000).html;
        assert!(!out.contains("truncated"));
    }
}
