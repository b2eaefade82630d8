// src/page.rs
//! Status page fetching and HTML-to-text conversion.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, header};

use crate::error::{Result, WatchError};

// Cached regexes for HTML processing
static RE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static RE_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static RE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(p|div|br|h[1-6]|li|ul|ol|tr|td|th|table|section)[^>]*>").expect("valid regex")
});
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static RE_MULTI_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static RE_MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

/// Supplies the current human-readable text of the watched page
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_text(&self) -> Result<String>;
}

/// Fetches a URL over HTTP and strips it down to text
pub struct HttpPageSource {
    http: Client,
    url: String,
    timeout: Duration,
}

impl HttpPageSource {
    pub fn new(http: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_text(&self) -> Result<String> {
        let response = self
            .http
            .get(&self.url)
            .header(header::CACHE_CONTROL, "no-cache")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| WatchError::Transport(format!("{}: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(WatchError::Transport(format!(
                "{}: HTTP {}",
                self.url,
                response.status().as_u16()
            )));
        }

        let is_html = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("html"))
            .unwrap_or(true);

        let body = response
            .text()
            .await
            .map_err(|e| WatchError::Transport(format!("{}: {}", self.url, e)))?;

        Ok(if is_html { html_to_text(&body) } else { body })
    }
}

/// Convert HTML to plain text, one block element per line
pub fn html_to_text(html: &str) -> String {
    // Remove script, style and comment content entirely
    let text = RE_SCRIPT.replace_all(html, "");
    let text = RE_STYLE.replace_all(&text, "");
    let text = RE_COMMENT.replace_all(&text, "");

    // Block and table-cell boundaries become line breaks
    let text = RE_BLOCK.replace_all(&text, "\n");
    let text = RE_TAG.replace_all(&text, "");

    // Decode HTML entities; non-breaking spaces become plain spaces so labels match
    let text = html_escape::decode_html_entities(&text).replace('\u{a0}', " ");

    let text = RE_MULTI_NEWLINE.replace_all(&text, "\n\n");
    let text = RE_MULTI_SPACE.replace_all(&text, " ");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    #[test]
    fn test_html_to_text() {
        let html = r#"
            <html>
            <head><script>alert('hi')</script><style>td { color: red }</style></head>
            <body>
                <h1>Token Status</h1>
                <!-- refreshed every minute -->
                <p>Hello <b>world</b>!</p>
                <div>Another &amp; line</div>
            </body>
            </html>
        "#;

        let text = html_to_text(html);
        assert!(text.contains("Token Status"));
        assert!(text.contains("Hello world!"));
        assert!(text.contains("Another & line"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("color"));
        assert!(!text.contains("refreshed"));
    }

    #[test]
    fn test_html_entities() {
        let html = "&lt;code&gt; &amp; &quot;test&quot; &amp;lt;";
        let text = html_to_text(html);
        assert_eq!(text, "<code> & \"test\" &lt;");
    }

    #[test]
    fn test_numeric_entities() {
        let html = "<table><tr><td>Room&#160;09</td><td>A&#8211;114</td></tr>\
                    <tr><td>Room&nbsp;10</td><td>B&#x2013;032</td></tr></table>";
        let text = html_to_text(html);
        assert!(!text.contains("&#"));
        assert_eq!(extract(&text, "Room 09"), Some("A\u{2013}114".to_string()));
        assert_eq!(extract(&text, "Room 10"), Some("B\u{2013}032".to_string()));
    }

    #[test]
    fn test_table_cells_extract() {
        let html = r#"
            <table>
              <tr><th>Room</th><th>Token</th></tr>
              <tr><td>Room 09</td><td>A-114</td></tr>
              <tr><td>Room 10</td><td>B-032</td></tr>
            </table>
        "#;
        let text = html_to_text(html);
        assert_eq!(extract(&text, "Room 09"), Some("A-114".to_string()));
        assert_eq!(extract(&text, "Room 10"), Some("B-032".to_string()));
    }
}
