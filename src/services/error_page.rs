const WORKS: &[&str] = &[
    "Plain HTML pages and documentation sites",
    "Blogs, articles and wikis",
    "JSON APIs and plain-text files",
    "Sites that render without JavaScript",
];

const FAILS: &[&str] = &[
    "Single-page apps that build their content with JavaScript",
    "Sites behind a login or a bot check",
    "Images, video, PDFs and other binary content",
    "Hosts that are unreachable or slow to answer",
];

pub fn error_block(message: &str) -> String {
    let safe = html_escape::encode_text(message);
    let works = list_items(WORKS);
    let fails = list_items(FAILS);
    format!(
        r#"<div class="fetch-error">
<h2>Could not load this page</h2>
<pre style="white-space:pre-wrap">{safe}</pre>
<p>This browser fetches pages on the server and shows a simplified copy without scripts.</p>
<div class="fetch-error-hints">
<h3>Usually works</h3><ul>{works}</ul>
<h3>Usually fails</h3><ul>{fails}</ul>
</div>
</div>"#
    )
}

fn list_items(items: &[&str]) -> String {
    items.iter().map(|i| format!("<li>{i}</li>")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_escaped() {
        let html = error_block("<script>alert(1)</script> & more");
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; more"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn lists_expectations() {
        let html = error_block("boom");
        assert!(html.contains("Usually works"));
        assert!(html.contains("Single-page apps"));
    }
}
