use reqwest::{header::CONTENT_TYPE, Client, ClientBuilder, Response};
use scraper::{Html, Selector};

use crate::config::Config;
use crate::error::{AppError, Result};

/// Builds the client shared by all scrape requests so connections are reused.
pub fn build_client(config: &Config) -> Result<Client> {
    let mut builder = ClientBuilder::new().pool_max_idle_per_host(10);
    if let Some(timeout) = config.fetch_timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

/// GETs `url` and returns the body as text. Non-2xx statuses and non-textual
/// content types are errors.
pub async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?.error_for_status()?;
    ensure_markup(&response)?;
    let html = response.text().await?;
    Ok(html)
}

fn ensure_markup(response: &Response) -> Result<()> {
    let Some(value) = response.headers().get(CONTENT_TYPE) else {
        return Ok(());
    };

    let content_type = value
        .to_str()
        .map_err(|e| AppError::ParseError(format!("Unreadable content type: {}", e)))?;

    if is_markup(content_type) {
        Ok(())
    } else {
        Err(AppError::ParseError(format!("Unsupported content type: {}", content_type)))
    }
}

fn is_markup(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime.starts_with("text/") || mime.contains("html") || mime.contains("xml")
}

/// Text of every element matching `selector`, concatenated in document order.
pub fn extract_fragment_text(html: &str, selector: &Selector) -> Result<String> {
    let document = Html::parse_document(html);

    let mut matched = false;
    let mut text = String::new();
    for element in document.select(selector) {
        matched = true;
        text.extend(element.text());
    }

    if matched {
        Ok(text)
    } else {
        Err(AppError::SelectorError("no element matched the fragment selector".to_string()))
    }
}

/// Runs the fetch → parse → select pipeline for one URL.
pub async fn scrape_fragment(client: &Client, url: &str, selector: &Selector) -> Result<String> {
    tracing::info!(%url, "fetching document");
    let started = std::time::Instant::now();

    let html = fetch_html(client, url).await?;
    tracing::debug!(
        %url,
        bytes = html.len(),
        elapsed = ?started.elapsed(),
        "document fetched"
    );

    let contents = extract_fragment_text(&html, selector)?;
    tracing::debug!(%url, %contents, "fragment extracted");
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_selector, DEFAULT_FRAGMENT_SELECTOR};

    const ARTICLE: &str = r#"<!DOCTYPE html>
<html><body>
<div id="mw-content-text">
<div class="mw-parser-output"><table><tr><td>infobox</td></tr></table><p>one</p><p>two</p><p>three</p><p>The <b>fifth</b> child, with a <a href="/wiki/Link">link</a>.</p><p>six</p></div>
</div>
</body></html>"#;

    fn default_selector() -> Selector {
        parse_selector(DEFAULT_FRAGMENT_SELECTOR).unwrap()
    }

    #[test]
    fn extracts_fifth_child_paragraph_without_tags() {
        let text = extract_fragment_text(ARTICLE, &default_selector()).unwrap();
        assert_eq!(text, "The fifth child, with a link.");
    }

    #[test]
    fn selects_last_of_five_paragraphs() {
        let html = r#"<div id="mw-content-text"><div class="mw-parser-output"><p>1</p><p>2</p><p>3</p><p>4</p><p>5</p></div></div>"#;
        let text = extract_fragment_text(html, &default_selector()).unwrap();
        assert_eq!(text, "5");
    }

    #[test]
    fn missing_fragment_is_an_error() {
        let html = r#"<div id="mw-content-text"><div class="mw-parser-output"><p>only</p></div></div>"#;
        let err = extract_fragment_text(html, &default_selector()).unwrap_err();
        assert!(matches!(err, AppError::SelectorError(_)));
    }

    #[test]
    fn nested_parser_output_is_not_an_immediate_child() {
        let html = r#"<div id="mw-content-text"><section><div class="mw-parser-output"><p>1</p><p>2</p><p>3</p><p>4</p><p>5</p></div></section></div>"#;
        assert!(extract_fragment_text(html, &default_selector()).is_err());
    }

    #[test]
    fn empty_paragraph_still_counts_as_a_match() {
        let html = r#"<div id="mw-content-text"><div class="mw-parser-output"><p>1</p><p>2</p><p>3</p><p>4</p><p></p></div></div>"#;
        assert_eq!(extract_fragment_text(html, &default_selector()).unwrap(), "");
    }

    #[test]
    fn multiple_matches_are_concatenated() {
        let selector = parse_selector("li").unwrap();
        let text = extract_fragment_text("<ul><li>a</li><li>b</li></ul>", &selector).unwrap();
        assert_eq!(text, "ab");
    }

    #[test]
    fn markup_content_types() {
        assert!(is_markup("text/html; charset=UTF-8"));
        assert!(is_markup("application/xhtml+xml"));
        assert!(is_markup("text/plain"));
        assert!(!is_markup("application/json"));
        assert!(!is_markup("image/png"));
    }
}
