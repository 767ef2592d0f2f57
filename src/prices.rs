//! Price gateway
//!
//! Outbound fund-price lookup behind a trait so handlers and tests never
//! depend on the network. [`MarketPageSource`] scrapes the published quote
//! page for a ticker; [`FixedPriceSource`] returns a constant and backs
//! the offline test endpoint.

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use serde::Serialize;

/// A fetched quote, stamped with the fetch time (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub ticker: String,
    /// Decimal string as published, thousands separators stripped
    pub price: String,
    /// Fetch time, `DD/MM/YYYY,HH:MM`
    pub time: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("price fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("no quote found on page for ticker {0}")]
    MissingQuote(String),
}

/// Source of fund price quotes.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn quote(&self, ticker: &str) -> Result<PriceQuote, PriceError>;
}

// ============================================================================
// Live source
// ============================================================================

/// Scrapes the market data tearsheet page for a ticker's latest price.
pub struct MarketPageSource {
    client: reqwest::Client,
    base_url: String,
    quote_pattern: Regex,
}

const DEFAULT_BASE_URL: &str = "https://markets.ft.com/data/funds/tearsheet/summary?s=";

impl MarketPageSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the scraper at a different page root. Used by tests to serve
    /// canned markup.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            // First value cell in the quote summary list holds the price.
            quote_pattern: Regex::new(r#"class="mod-ui-data-list__value"[^>]*>\s*([^<]+)<"#)
                .unwrap(),
        }
    }

    fn extract_price(&self, page: &str, ticker: &str) -> Result<String, PriceError> {
        let raw = self
            .quote_pattern
            .captures(page)
            .and_then(|captures| captures.get(1))
            .ok_or_else(|| PriceError::MissingQuote(ticker.to_owned()))?;
        Ok(raw.as_str().trim().replace(',', ""))
    }
}

impl Default for MarketPageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for MarketPageSource {
    async fn quote(&self, ticker: &str) -> Result<PriceQuote, PriceError> {
        let url = format!("{}{}", self.base_url, ticker);
        let page = self.client.get(&url).send().await?.text().await?;
        let price = self.extract_price(&page, ticker)?;

        Ok(PriceQuote {
            ticker: ticker.to_owned(),
            price,
            time: Utc::now().format("%d/%m/%Y,%H:%M").to_string(),
        })
    }
}

// ============================================================================
// Offline source
// ============================================================================

/// Constant-price source for exercising the pipeline without network.
pub struct FixedPriceSource {
    price: String,
}

impl FixedPriceSource {
    pub fn new() -> Self {
        Self {
            price: "999".to_owned(),
        }
    }
}

impl Default for FixedPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for FixedPriceSource {
    async fn quote(&self, ticker: &str) -> Result<PriceQuote, PriceError> {
        Ok(PriceQuote {
            ticker: ticker.to_owned(),
            price: self.price.clone(),
            time: Utc::now().format("%d/%m/%Y,%H:%M").to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <ul class="mod-ui-data-list">
            <li><span class="mod-ui-data-list__label">Price (GBP)</span>
                <span class="mod-ui-data-list__value"> 1,234.56 </span></li>
            <li><span class="mod-ui-data-list__label">Day change</span>
                <span class="mod-ui-data-list__value">0.42</span></li>
        </ul>
    "#;

    #[test]
    fn extracts_the_first_quote_value() {
        let source = MarketPageSource::new();
        assert_eq!(source.extract_price(PAGE, "TICK").unwrap(), "1234.56");
    }

    #[test]
    fn missing_quote_markup_is_an_error() {
        let source = MarketPageSource::new();
        let err = source.extract_price("<html></html>", "TICK").unwrap_err();
        assert!(matches!(err, PriceError::MissingQuote(t) if t == "TICK"));
    }

    #[tokio::test]
    async fn fixed_source_returns_the_sentinel_price() {
        let source = FixedPriceSource::new();
        let quote = source.quote("ANY").await.unwrap();
        assert_eq!(quote.price, "999");
        assert_eq!(quote.ticker, "ANY");
        // Timestamp shape: DD/MM/YYYY,HH:MM
        assert_eq!(quote.time.len(), 16);
        assert!(quote.time.contains(','));
    }
}
