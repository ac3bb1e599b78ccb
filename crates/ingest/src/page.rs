use anyhow::{Context, Result};
use scraper::{Html, Selector};
use std::time::Duration;

/// Fetches pages over plain HTTP GET with a bounded timeout.
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context(format!("GET {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for {}", status, url);
        }

        response
            .text()
            .await
            .context("Failed to read response body")
    }
}

/// Text of every `<p>` element in document order, trimmed.
pub fn extract_paragraphs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("p") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_paragraphs() {
        let html = r#"
            <html><body>
              <h1>Title</h1>
              <p>  Barack Obama is married to <a href="/m">Michelle Obama</a>. </p>
              <div>not a paragraph</div>
              <p></p>
              <p>Second paragraph.</p>
            </body></html>
        "#;

        let paras = extract_paragraphs(html);
        assert_eq!(
            paras,
            vec![
                "Barack Obama is married to Michelle Obama.".to_string(),
                String::new(),
                "Second paragraph.".to_string(),
            ]
        );
    }

    #[test]
    fn test_no_paragraphs() {
        assert!(extract_paragraphs("<html><body><div>x</div></body></html>").is_empty());
        assert!(extract_paragraphs("").is_empty());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_fails() {
        let fetcher = PageFetcher::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on loopback is closed in test environments.
        let result = fetcher.fetch("http://127.0.0.1:9/").await;
        assert!(result.is_err());
    }
}
