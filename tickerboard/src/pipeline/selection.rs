use chrono::NaiveDate;

use tickerboard_core::{AggregationReport, SourceSpec, TickerboardError};
use tickerboard_http::extract_symbol;
use tickerboard_http::presets::{alpha_vantage, sentiment};

use crate::Aggregator;

/// Number of most recent daily closes kept for the selection chart.
pub const CHART_DAYS: usize = 7;

/// Endpoints and credentials for [`Aggregator::insight_for_selection`].
#[derive(Debug, Clone)]
pub struct SelectionSources {
    /// Sentiment classifier URL.
    pub sentiment_url: String,
    /// Alpha Vantage API key.
    pub api_key: String,
}

impl SelectionSources {
    /// Default sentiment endpoint with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            sentiment_url: sentiment::DEFAULT_URL.to_string(),
            api_key: api_key.into(),
        }
    }
}

/// What the page overlay shows for a text selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionInsight {
    /// Ticker found in the text, if any.
    pub symbol: Option<String>,
    /// Sentiment label, if the classifier answered.
    pub sentiment: Option<String>,
    /// Latest quoted price; `None` when the quote failed or no ticker was found.
    pub price: Option<f64>,
    /// Last [`CHART_DAYS`] daily closes, ascending.
    pub chart: Vec<(NaiveDate, f64)>,
    /// The underlying run, for failure details.
    pub report: AggregationReport,
}

impl Aggregator {
    /// Classify a text selection and, when it names a ticker, fetch its quote
    /// and recent closes in the same concurrent run.
    ///
    /// Any part may be missing: a failed quote leaves `price` empty while the
    /// sentiment still comes through, and vice versa.
    ///
    /// # Errors
    /// Returns `InvalidArg` for blank text.
    pub async fn insight_for_selection(
        &self,
        text: &str,
        sources: &SelectionSources,
    ) -> Result<SelectionInsight, TickerboardError> {
        if text.trim().is_empty() {
            return Err(TickerboardError::invalid_arg("selection text cannot be empty"));
        }
        let symbol = extract_symbol(text);

        let mut specs: Vec<SourceSpec> = vec![sentiment::analyze(&sources.sentiment_url, text)];
        if let Some(sym) = &symbol {
            specs.push(alpha_vantage::global_quote(sym, &sources.api_key));
            specs.push(alpha_vantage::daily(sym, &sources.api_key));
        }
        let subject = symbol.as_deref().unwrap_or("selection");
        let report = self.run(subject, &specs).await?;

        let sentiment = report
            .extra("sentiment")
            .and_then(sentiment::label)
            .map(str::to_string);
        let price = report.extra("quote").and_then(alpha_vantage::quote_price);
        let mut chart: Vec<(NaiveDate, f64)> = report.values("daily").rev().take(CHART_DAYS).collect();
        chart.reverse();

        Ok(SelectionInsight {
            symbol,
            sentiment,
            price,
            chart,
            report,
        })
    }
}
